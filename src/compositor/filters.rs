use crate::color::{clamp_channel, lerp, rgb_to_yuv, yuv_to_rgb, Color};
use crate::error::{RasterError, Result};
use crate::surface::PixelBuffer;

use super::Canvas;

/// Channel kept by [`Canvas::isolate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    /// Luma as grey
    Y,
    /// U chroma on a mid-grey luma
    U,
    /// V chroma on a mid-grey luma
    V,
}

#[inline]
fn with_rgb(c: Color, (r, g, b): (u8, u8, u8)) -> Color {
    Color::from_argb(c.alpha(), r, g, b)
}

#[inline]
fn map_luma(c: Color, f: impl Fn(f32) -> f32) -> Color {
    let (y, u, v) = rgb_to_yuv(c.red(), c.green(), c.blue());
    with_rgb(c, yuv_to_rgb(f(y), u, v))
}

fn check_factor(name: &str, factor: f32) -> Result<()> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(RasterError::InvalidArgument(format!(
            "{} factor must be finite and non-negative, got {}",
            name, factor
        )));
    }
    Ok(())
}

// ============================================================================
// Color-space filters
// ============================================================================

impl Canvas<'_> {
    /// Replace RGB with luma
    pub fn grayscale(&mut self) {
        self.map_pixels(|c| {
            let y = clamp_channel(c.luma());
            with_rgb(c, (y, y, y))
        });
    }

    /// Scale luma by `factor`, keeping chroma
    pub fn brightness(&mut self, factor: f32) -> Result<()> {
        check_factor("brightness", factor)?;
        self.map_pixels(|c| map_luma(c, |y| y * factor));
        Ok(())
    }

    /// Scale luma distance from the clip's average luma by `factor`
    pub fn contrast(&mut self, factor: f32) -> Result<()> {
        check_factor("contrast", factor)?;
        let (sum, count) = self.luma_fold((0.0f64, 0usize), |(s, n), y| (s + y as f64, n + 1));
        if count == 0 {
            return Ok(());
        }
        let avg = (sum / count as f64) as f32;
        self.map_pixels(|c| map_luma(c, |y| avg + (y - avg) * factor));
        Ok(())
    }

    /// Spread luma so the darkest pixel in the clip maps to 0 and the
    /// brightest to 255. Flat regions are left alone.
    pub fn stretch_contrast(&mut self) {
        let (lo, hi) = self.luma_fold((f32::MAX, f32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
        let range = hi - lo;
        if range <= f32::EPSILON {
            return;
        }
        self.map_pixels(|c| map_luma(c, |y| (y - lo) * 255.0 / range));
    }

    /// Keep a single channel
    pub fn isolate(&mut self, channel: Channel) {
        self.map_pixels(|c| {
            let rgb = match channel {
                Channel::Red => (c.red(), 0, 0),
                Channel::Green => (0, c.green(), 0),
                Channel::Blue => (0, 0, c.blue()),
                Channel::Y => {
                    let y = clamp_channel(c.luma());
                    (y, y, y)
                },
                Channel::U => {
                    let (_, u, _) = rgb_to_yuv(c.red(), c.green(), c.blue());
                    yuv_to_rgb(128.0, u, 0.0)
                },
                Channel::V => {
                    let (_, _, v) = rgb_to_yuv(c.red(), c.green(), c.blue());
                    yuv_to_rgb(128.0, 0.0, v)
                },
            };
            with_rgb(c, rgb)
        });
    }

    /// Map luma onto a ramp from `dark` (Y = 0) to `light` (Y = 255)
    pub fn tint(&mut self, dark: Color, light: Color) {
        self.map_pixels(|c| {
            let t = c.luma() / 255.0;
            let m = lerp(dark, light, t);
            with_rgb(c, (m.red(), m.green(), m.blue()))
        });
    }

    /// Snap each pixel's RGB to the nearest palette entry
    pub fn quantize(&mut self, palette: &[Color]) -> Result<()> {
        if palette.is_empty() {
            return Err(RasterError::InvalidArgument(
                "quantize needs a non-empty palette".to_string(),
            ));
        }
        self.map_pixels(|c| {
            let nearest = palette
                .iter()
                .copied()
                .min_by_key(|p| rgb_distance_sq(c, *p))
                .unwrap_or(c);
            with_rgb(c, (nearest.red(), nearest.green(), nearest.blue()))
        });
        Ok(())
    }

    /// Invert RGB
    pub fn invert(&mut self) {
        self.map_pixels(|c| Color(c.0 ^ 0x00FF_FFFF));
    }

    fn luma_fold<T>(&self, init: T, mut f: impl FnMut(T, f32) -> T) -> T {
        let clip = self.clip;
        let mut acc = init;
        if clip.is_empty() {
            return acc;
        }
        for y in clip.y_min..=clip.y_max {
            for x in clip.x_min..=clip.x_max {
                acc = f(acc, self.buffer.at(x, y).luma());
            }
        }
        acc
    }
}

#[inline]
fn rgb_distance_sq(a: Color, b: Color) -> u32 {
    let d = |x: u8, y: u8| {
        let v = x.abs_diff(y) as u32;
        v * v
    };
    d(a.red(), b.red()) + d(a.green(), b.green()) + d(a.blue(), b.blue())
}

// ============================================================================
// Palette analysis
// ============================================================================

/// A buffer reduced to palette slots, one slot index per pixel (row major)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palettized {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<Color>,
    pub indices: Vec<u32>,
}

impl Palettized {
    /// Slot index of a pixel
    pub fn index_at(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        self.indices
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Rebuild a buffer from the palette
    pub fn to_buffer(&self) -> Result<PixelBuffer> {
        let pixels = self
            .indices
            .iter()
            .map(|&i| self.palette.get(i as usize).map_or(0, |c| c.0))
            .collect();
        PixelBuffer::from_argb(self.width, self.height, pixels)
    }
}

impl PixelBuffer {
    /// Assign each pixel to the first palette slot whose color lies within
    /// `tolerance`, opening a new slot when none does
    pub fn palettize(&self, tolerance: u8) -> Palettized {
        let mut palette: Vec<Color> = Vec::new();
        let indices = self
            .as_argb()
            .iter()
            .map(|&p| {
                let c = Color(p);
                match palette.iter().position(|s| s.matches(c, tolerance)) {
                    Some(i) => i as u32,
                    None => {
                        palette.push(c);
                        (palette.len() - 1) as u32
                    },
                }
            })
            .collect();
        Palettized {
            width: self.width(),
            height: self.height(),
            palette,
            indices,
        }
    }

    /// Label 4-connected regions whose pixels lie within `tolerance` of the
    /// region's seed. Slots are numbered in scan order of their seeds and
    /// hold the seed color.
    pub fn palettize_regions(&self, tolerance: u8) -> Palettized {
        let (w, h) = (self.width() as i32, self.height() as i32);
        let mut indices = vec![u32::MAX; w as usize * h as usize];
        let mut palette = Vec::new();
        let mut stack = Vec::new();

        for sy in 0..h {
            for sx in 0..w {
                let start = self.index(sx, sy);
                if indices[start] != u32::MAX {
                    continue;
                }
                let label = palette.len() as u32;
                let seed = self.at(sx, sy);
                palette.push(seed);
                indices[start] = label;
                stack.push((sx, sy));

                while let Some((x, y)) = stack.pop() {
                    for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                        if nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }
                        let i = self.index(nx, ny);
                        if indices[i] == u32::MAX && self.at(nx, ny).matches(seed, tolerance) {
                            indices[i] = label;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }

        Palettized {
            width: self.width(),
            height: self.height(),
            palette,
            indices,
        }
    }
}
