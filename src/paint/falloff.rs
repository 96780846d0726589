use crate::color::Color;
use crate::error::{RasterError, Result};
use crate::geometry::distance_to_line;

use super::PaintStrategy;

/// Fixed RGB whose alpha falls off linearly from `peak_alpha` at the fill
/// center to zero at `multiplier * max(width, height)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialAlpha {
    pub color: Color,
    pub peak_alpha: u8,
    pub multiplier: f32,
    cx: f32,
    cy: f32,
    radius: f32,
}

impl RadialAlpha {
    pub fn new(color: Color, peak_alpha: u8, multiplier: f32) -> Self {
        Self {
            color,
            peak_alpha,
            multiplier,
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
        }
    }

    /// Alpha at `distance` pixels from the center
    #[inline]
    fn alpha_at(&self, distance: f32) -> u8 {
        if self.radius <= 0.0 {
            return 0;
        }
        let t = (1.0 - distance / self.radius).max(0.0);
        (self.peak_alpha as f32 * t).round() as u8
    }
}

impl PaintStrategy for RadialAlpha {
    fn initialize(&mut self, width: u32, height: u32) {
        self.cx = (width as f32 - 1.0) / 2.0;
        self.cy = (height as f32 - 1.0) / 2.0;
        self.radius = self.multiplier * width.max(height) as f32;
    }

    fn color_at(&self, x: i32, y: i32) -> Color {
        let dx = x as f32 - self.cx;
        let dy = y as f32 - self.cy;
        let alpha = self.alpha_at((dx * dx + dy * dy).sqrt());
        self.color.with_alpha(alpha)
    }
}

/// Alpha (and optionally brightness) falling off with perpendicular
/// distance from an infinite line through two points given in fill-box
/// coordinates. Reaches zero at `range` pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAlpha {
    pub color: Color,
    pub peak_alpha: u8,
    pub range: f32,
    /// Darken RGB along with alpha (a "light" falloff)
    pub darken: bool,
    from: (f32, f32),
    to: (f32, f32),
}

impl LineAlpha {
    pub fn new(from: (f32, f32), to: (f32, f32), color: Color, peak_alpha: u8, range: f32) -> Result<Self> {
        if distance_to_line(0.0, 0.0, from.0, from.1, to.0, to.1).is_none() {
            return Err(RasterError::DegenerateGeometry(
                "line falloff needs two distinct points",
            ));
        }
        if range.is_nan() || range <= 0.0 {
            return Err(RasterError::InvalidArgument(format!(
                "falloff range must be positive, got {}",
                range
            )));
        }
        Ok(Self {
            color,
            peak_alpha,
            range,
            darken: false,
            from,
            to,
        })
    }

    /// Same falloff, with RGB darkening toward black as distance grows
    pub fn light(from: (f32, f32), to: (f32, f32), color: Color, peak_alpha: u8, range: f32) -> Result<Self> {
        let mut paint = Self::new(from, to, color, peak_alpha, range)?;
        paint.darken = true;
        Ok(paint)
    }

    #[inline]
    fn strength(&self, x: i32, y: i32) -> f32 {
        let d = distance_to_line(
            x as f32,
            y as f32,
            self.from.0,
            self.from.1,
            self.to.0,
            self.to.1,
        )
        .unwrap_or(0.0);
        (1.0 - d / self.range).max(0.0)
    }
}

impl PaintStrategy for LineAlpha {
    // Everything is defined in fill-box coordinates already
    fn initialize(&mut self, _width: u32, _height: u32) {}

    fn color_at(&self, x: i32, y: i32) -> Color {
        let t = self.strength(x, y);
        let alpha = (self.peak_alpha as f32 * t).round() as u8;
        if self.darken {
            let shade = |c: u8| (c as f32 * t).round() as u8;
            Color::from_argb(
                alpha,
                shade(self.color.red()),
                shade(self.color.green()),
                shade(self.color.blue()),
            )
        } else {
            self.color.with_alpha(alpha)
        }
    }
}
