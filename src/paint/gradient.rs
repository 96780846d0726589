use crate::color::{lerp, Color};
use crate::error::{RasterError, Result};

use super::{axis_fraction, PaintStrategy};

// ============================================================================
// Four-corner gradient
// ============================================================================

/// Bilinear blend of four corner colors across the fill box
#[derive(Debug, Clone, PartialEq)]
pub struct FourCorner {
    pub top_left: Color,
    pub top_right: Color,
    pub bottom_left: Color,
    pub bottom_right: Color,
    width: u32,
    height: u32,
}

impl FourCorner {
    pub fn new(top_left: Color, top_right: Color, bottom_left: Color, bottom_right: Color) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            width: 1,
            height: 1,
        }
    }
}

impl PaintStrategy for FourCorner {
    fn initialize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn color_at(&self, x: i32, y: i32) -> Color {
        let tx = axis_fraction(x, self.width);
        let ty = axis_fraction(y, self.height);
        let top = lerp(self.top_left, self.top_right, tx);
        let bottom = lerp(self.bottom_left, self.bottom_right, tx);
        lerp(top, bottom, ty)
    }
}

// ============================================================================
// Linear multi-stop gradient
// ============================================================================

/// Axis a linear gradient runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// (percent in [0, 100], color)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub percent: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(percent: f32, color: Color) -> Self {
        Self { percent, color }
    }
}

/// Ordered color stops interpolated along one axis of the fill box.
///
/// The stop list always holds entries at 0 and 100; missing endpoints are
/// filled in with the nearest supplied color.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    direction: Direction,
    stops: Vec<GradientStop>,
    extent: u32,
}

impl LinearGradient {
    pub fn new(direction: Direction, stops: &[GradientStop]) -> Result<Self> {
        if stops.is_empty() {
            return Err(RasterError::InvalidArgument(
                "gradient needs at least one stop".to_string(),
            ));
        }
        if let Some(bad) = stops
            .iter()
            .find(|s| !(0.0..=100.0).contains(&s.percent))
        {
            return Err(RasterError::InvalidArgument(format!(
                "gradient stop at {}% outside [0, 100]",
                bad.percent
            )));
        }

        let mut sorted = stops.to_vec();
        sorted.sort_by(|a, b| a.percent.total_cmp(&b.percent));
        if sorted[0].percent > 0.0 {
            let first = sorted[0].color;
            sorted.insert(0, GradientStop::new(0.0, first));
        }
        if let Some(last) = sorted.last().copied() {
            if last.percent < 100.0 {
                sorted.push(GradientStop::new(100.0, last.color));
            }
        }

        Ok(Self {
            direction,
            stops: sorted,
            extent: 1,
        })
    }

    /// Two-stop gradient from `start` to `end`
    pub fn two_color(direction: Direction, start: Color, end: Color) -> Self {
        Self {
            direction,
            stops: vec![GradientStop::new(0.0, start), GradientStop::new(100.0, end)],
            extent: 1,
        }
    }

    pub fn horizontal(stops: &[GradientStop]) -> Result<Self> {
        Self::new(Direction::Horizontal, stops)
    }

    pub fn vertical(stops: &[GradientStop]) -> Result<Self> {
        Self::new(Direction::Vertical, stops)
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Color at a position given in percent; clamps outside [0, 100]
    pub fn color_at_percent(&self, percent: f32) -> Color {
        let p = percent.clamp(0.0, 100.0);
        let upper = self
            .stops
            .iter()
            .position(|s| s.percent >= p)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return self.stops[0].color;
        }
        let lo = self.stops[upper - 1];
        let hi = self.stops[upper];
        let span = hi.percent - lo.percent;
        if span <= f32::EPSILON {
            return hi.color;
        }
        lerp(lo.color, hi.color, (p - lo.percent) / span)
    }
}

impl PaintStrategy for LinearGradient {
    fn initialize(&mut self, width: u32, height: u32) {
        self.extent = match self.direction {
            Direction::Horizontal => width,
            Direction::Vertical => height,
        };
    }

    fn color_at(&self, x: i32, y: i32) -> Color {
        let pos = match self.direction {
            Direction::Horizontal => x,
            Direction::Vertical => y,
        };
        self.color_at_percent(axis_fraction(pos, self.extent) * 100.0)
    }
}
