use crate::color::Color;
use crate::error::{RasterError, Result};

use super::clip::Rect;

/// Flat ARGB pixel store.
///
/// Dimensions are fixed at construction: `pixels.len() == width * height`
/// always holds. Operations that change size (`resized`, `cropped`,
/// `scaled`) return a new buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Create a buffer with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidArgument(format!(
                "buffer dimensions must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            pixels: vec![color.0; width as usize * height as usize],
            width,
            height,
        })
    }

    /// Wrap raw ARGB data
    pub fn from_argb(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidArgument(format!(
                "buffer dimensions must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        if pixels.len() != width as usize * height as usize {
            return Err(RasterError::InvalidArgument(format!(
                "pixel array holds {} entries, {}x{} needs {}",
                pixels.len(),
                width,
                height,
                width as usize * height as usize
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Full-buffer rectangle
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Strict half-open bounds test: `[0, width) x [0, height)`
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    pub(crate) fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Fail with `OutOfBounds` unless `(x, y)` is inside the buffer
    #[inline]
    pub fn check_bounds(&self, x: i32, y: i32) -> Result<()> {
        if self.in_bounds(x, y) {
            Ok(())
        } else {
            Err(RasterError::OutOfBounds { x, y })
        }
    }

    /// Fail with `DimensionMismatch` unless `other` has our size
    pub fn check_same_size(&self, other: &PixelBuffer) -> Result<()> {
        if self.dimensions() == other.dimensions() {
            Ok(())
        } else {
            Err(RasterError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            })
        }
    }

    /// Read a pixel (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Color> {
        self.check_bounds(x, y)?;
        Ok(Color(self.pixels[self.index(x, y)]))
    }

    /// Read a pixel, returning None out of bounds
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            Some(Color(self.pixels[self.index(x, y)]))
        } else {
            None
        }
    }

    /// Write a pixel (bounds checked), no clip and no blending
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        self.check_bounds(x, y)?;
        let idx = self.index(x, y);
        self.pixels[idx] = color.0;
        Ok(())
    }

    /// Read with the caller having already verified bounds
    #[inline]
    pub(crate) fn at(&self, x: i32, y: i32) -> Color {
        Color(self.pixels[self.index(x, y)])
    }

    /// Write with the caller having already verified bounds
    #[inline]
    pub(crate) fn put(&mut self, x: i32, y: i32, color: Color) {
        let idx = self.index(x, y);
        self.pixels[idx] = color.0;
    }

    /// Clear every pixel to a color
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.0);
    }

    /// Copy contents from another buffer of the same size
    pub fn copy_from(&mut self, src: &PixelBuffer) -> Result<()> {
        self.check_same_size(src)?;
        self.pixels.copy_from_slice(&src.pixels);
        Ok(())
    }

    /// Copy the `rect` region of `src` into this buffer at `(dst_x, dst_y)`,
    /// clamping against both buffers. Raw overwrite, no clip.
    pub(crate) fn copy_rect(&mut self, src: &PixelBuffer, rect: Rect, dst_x: i32, dst_y: i32) {
        let rect = rect.intersect(&src.bounds());
        if rect.is_empty() {
            return;
        }
        let target = Rect::from_corners(
            dst_x,
            dst_y,
            dst_x + rect.x_max - rect.x_min,
            dst_y + rect.y_max - rect.y_min,
        )
        .intersect(&self.bounds());
        if target.is_empty() {
            return;
        }
        let ox = rect.x_min - dst_x;
        let oy = rect.y_min - dst_y;
        let len = target.width() as usize;
        for y in target.y_min..=target.y_max {
            let d = self.index(target.x_min, y);
            let s = src.index(target.x_min + ox, y + oy);
            self.pixels[d..d + len].copy_from_slice(&src.pixels[s..s + len]);
        }
    }

    /// Raw ARGB pixels, row major
    pub fn as_argb(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable raw pixels for callers doing their own per-pixel work
    pub fn as_argb_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// One row of pixels
    pub fn row(&self, y: u32) -> Option<&[u32]> {
        if y >= self.height {
            return None;
        }
        let start = (y * self.width) as usize;
        Some(&self.pixels[start..start + self.width as usize])
    }

    /// Bytes in native-endian u32 order, matching SDL's ARGB8888 streaming format
    pub fn to_argb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_ne_bytes()).collect()
    }

    /// New buffer of a different size holding the overlapping top-left content;
    /// new area is transparent.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self> {
        let mut out = Self::new(width, height)?;
        out.copy_rect(self, self.bounds(), 0, 0);
        Ok(out)
    }

    /// New buffer holding the part of `rect` that lies inside this buffer
    pub fn cropped(&self, rect: Rect) -> Result<Self> {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() {
            return Err(RasterError::InvalidArgument(
                "crop rectangle does not overlap the buffer".to_string(),
            ));
        }
        let mut out = Self::new(rect.width(), rect.height())?;
        out.copy_rect(self, rect, 0, 0);
        Ok(out)
    }

    /// Nearest-neighbor rescale into a new buffer
    pub fn scaled(&self, width: u32, height: u32) -> Result<Self> {
        let mut out = Self::new(width, height)?;
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height as u64) as i32;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width as u64) as i32;
                out.put(x as i32, y as i32, self.at(sx, sy));
            }
        }
        Ok(out)
    }
}
