//! Per-pixel color strategies used in place of a flat color during fills.
//!
//! A fill calls [`PaintStrategy::initialize`] exactly once with the size of
//! its bounding box, then [`PaintStrategy::color_at`] for each covered pixel
//! with coordinates relative to the box origin. Implementations recompute
//! every derived constant in `initialize`, so nothing leaks from one fill
//! into the next.

mod falloff;
mod gradient;

pub use falloff::{LineAlpha, RadialAlpha};
pub use gradient::{Direction, FourCorner, GradientStop, LinearGradient};

use crate::color::Color;

/// Color function driven by a fill
pub trait PaintStrategy {
    /// Prepare for a fill whose bounding box is `width` x `height`
    fn initialize(&mut self, width: u32, height: u32);

    /// Color at `(x, y)` relative to the bounding box origin
    fn color_at(&self, x: i32, y: i32) -> Color;
}

/// Flat color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solid(pub Color);

impl PaintStrategy for Solid {
    fn initialize(&mut self, _width: u32, _height: u32) {}

    #[inline]
    fn color_at(&self, _x: i32, _y: i32) -> Color {
        self.0
    }
}

/// Closed set of built-in paints
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Solid),
    FourCorner(FourCorner),
    Linear(LinearGradient),
    RadialAlpha(RadialAlpha),
    LineAlpha(LineAlpha),
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Paint::Solid(Solid(color))
    }
}

impl PaintStrategy for Paint {
    fn initialize(&mut self, width: u32, height: u32) {
        match self {
            Paint::Solid(p) => p.initialize(width, height),
            Paint::FourCorner(p) => p.initialize(width, height),
            Paint::Linear(p) => p.initialize(width, height),
            Paint::RadialAlpha(p) => p.initialize(width, height),
            Paint::LineAlpha(p) => p.initialize(width, height),
        }
    }

    #[inline]
    fn color_at(&self, x: i32, y: i32) -> Color {
        match self {
            Paint::Solid(p) => p.color_at(x, y),
            Paint::FourCorner(p) => p.color_at(x, y),
            Paint::Linear(p) => p.color_at(x, y),
            Paint::RadialAlpha(p) => p.color_at(x, y),
            Paint::LineAlpha(p) => p.color_at(x, y),
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::solid(color)
    }
}

impl From<FourCorner> for Paint {
    fn from(p: FourCorner) -> Self {
        Paint::FourCorner(p)
    }
}

impl From<LinearGradient> for Paint {
    fn from(p: LinearGradient) -> Self {
        Paint::Linear(p)
    }
}

impl From<RadialAlpha> for Paint {
    fn from(p: RadialAlpha) -> Self {
        Paint::RadialAlpha(p)
    }
}

impl From<LineAlpha> for Paint {
    fn from(p: LineAlpha) -> Self {
        Paint::LineAlpha(p)
    }
}

/// Fraction of the way across an axis of `extent` pixels, 0.0 at the first
/// pixel and 1.0 at the last.
#[inline]
pub(crate) fn axis_fraction(pos: i32, extent: u32) -> f32 {
    if extent <= 1 {
        0.0
    } else {
        (pos as f32 / (extent - 1) as f32).clamp(0.0, 1.0)
    }
}
