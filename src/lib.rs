//! rasterlab: a software 2D raster engine.
//!
//! A [`Surface`] owns an ARGB [`PixelBuffer`], a clip stack, a draw-mode
//! gate and a stack of [`Sprite`] overlays. Drawing happens through the
//! [`Canvas`] handed out by [`Surface::canvas`] while the surface is in
//! draw mode:
//!
//! ```
//! use rasterlab::{BlendMode, Color, Rect, Surface};
//!
//! let mut surface = Surface::new(64, 64)?;
//! surface.with_draw_mode(|s| {
//!     let mut canvas = s.canvas()?;
//!     canvas.fill_rect(Rect::new(8, 8, 48, 48), Color::BLUE, BlendMode::Overwrite);
//!     canvas.line_blend(0, 0, 63, 63, Color::from_argb(128, 255, 255, 255));
//!     Ok(())
//! })?;
//! assert_eq!(surface.get_pixel(10, 20)?, Color::BLUE);
//! # Ok::<(), rasterlab::RasterError>(())
//! ```

pub mod codec;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod paint;
pub mod surface;
pub mod text;

#[cfg(feature = "display")]
pub mod display;

pub use color::Color;
pub use compositor::{Algebra, BlendMode, Canvas, Channel, Kernel, Source};
pub use config::EngineConfig;
pub use error::{RasterError, Result};
pub use mask::MaskPlane;
pub use paint::{Paint, PaintStrategy};
pub use surface::{DrawMode, Observer, PixelBuffer, Rect, Sprite, Surface};
