//! Scan conversion and compositing primitives.
//!
//! Everything here runs on a [`Canvas`]: a mutable view of a
//! [`PixelBuffer`] paired with the clip that was active when the view was
//! taken. Every primitive restricts its work to that clip; a target that
//! misses the clip entirely is a silent no-op.

mod algebra;
mod blit;
mod convolve;
mod filters;
mod flood;
mod shapes;

pub use algebra::Algebra;
pub(crate) use blit::composite_over;
pub use blit::Source;
pub use convolve::Kernel;
pub use filters::{Channel, Palettized};

use crate::color::{blend, blend_over, Color};
use crate::error::Result;
use crate::surface::{PixelBuffer, Rect};

/// How source colors combine with what is already in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Replace destination pixels
    Overwrite,
    /// Source-over using each source pixel's own alpha
    Alpha,
    /// Source-over with one fixed alpha for every pixel, source alpha ignored
    GlobalAlpha(u8),
}

impl BlendMode {
    /// Combine a single source pixel with a destination pixel
    #[inline]
    pub fn apply(self, dst: Color, src: Color) -> Color {
        match self {
            BlendMode::Overwrite => src,
            BlendMode::Alpha => blend_over(dst, src),
            BlendMode::GlobalAlpha(a) => blend(dst, src, a),
        }
    }
}

/// Clipped drawing view over a pixel buffer
pub struct Canvas<'a> {
    buffer: &'a mut PixelBuffer,
    clip: Rect,
}

impl<'a> Canvas<'a> {
    /// View of `buffer` limited to `clip` (itself limited to the buffer)
    pub fn new(buffer: &'a mut PixelBuffer, clip: Rect) -> Self {
        let clip = clip.intersect(&buffer.bounds());
        Self { buffer, clip }
    }

    /// View over the whole buffer
    pub fn unclipped(buffer: &'a mut PixelBuffer) -> Self {
        let clip = buffer.bounds();
        Self { buffer, clip }
    }

    #[inline]
    pub fn clip(&self) -> Rect {
        self.clip
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Read-only access to the underlying pixels
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &*self.buffer
    }

    /// Read a pixel (strict bounds check, clip does not apply to reads)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Color> {
        self.buffer.get_pixel(x, y)
    }

    /// Overwrite one pixel. Out-of-bounds coordinates are an error; in-bounds
    /// coordinates outside the clip are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        self.buffer.check_bounds(x, y)?;
        if self.clip.contains(x, y) {
            self.buffer.put(x, y, color);
        }
        Ok(())
    }

    /// Alpha-blend one pixel using the color's own alpha
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        self.buffer.check_bounds(x, y)?;
        if self.clip.contains(x, y) {
            let dst = self.buffer.at(x, y);
            self.buffer.put(x, y, blend_over(dst, color));
        }
        Ok(())
    }

    /// Fill the whole clip with a color
    pub fn clear(&mut self, color: Color) {
        let clip = self.clip;
        self.fill_rect(clip, color, BlendMode::Overwrite);
    }

    /// Write one pixel already known to be inside the clip
    #[inline]
    pub(crate) fn plot(&mut self, x: i32, y: i32, color: Color, mode: BlendMode) {
        match mode {
            BlendMode::Overwrite => self.buffer.put(x, y, color),
            _ => {
                let dst = self.buffer.at(x, y);
                self.buffer.put(x, y, mode.apply(dst, color));
            },
        }
    }

    /// Apply `f` to every pixel in `rect` limited to the clip
    pub(crate) fn map_region(&mut self, rect: Rect, mut f: impl FnMut(i32, i32, Color) -> Color) {
        let area = self.clip.intersect(&rect);
        if area.is_empty() {
            return;
        }
        for y in area.y_min..=area.y_max {
            for x in area.x_min..=area.x_max {
                let c = self.buffer.at(x, y);
                self.buffer.put(x, y, f(x, y, c));
            }
        }
    }

    /// Apply `f` to every clipped pixel
    pub(crate) fn map_pixels(&mut self, mut f: impl FnMut(Color) -> Color) {
        let clip = self.clip;
        self.map_region(clip, |_, _, c| f(c));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_modes() {
        let dst = Color::from_rgb(0, 0, 0);
        let src = Color::from_argb(128, 255, 255, 255);
        assert_eq!(BlendMode::Overwrite.apply(dst, src), src);
        assert_eq!(BlendMode::Alpha.apply(dst, src).red(), 127);
        assert_eq!(BlendMode::GlobalAlpha(0).apply(dst, src), dst);
        assert_eq!(BlendMode::GlobalAlpha(255).apply(dst, src), Color::WHITE);
    }

    #[test]
    fn test_set_pixel_respects_clip() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        let mut canvas = Canvas::new(&mut buf, Rect::new(0, 0, 2, 2));
        canvas.set_pixel(1, 1, Color::RED).unwrap();
        canvas.set_pixel(3, 3, Color::RED).unwrap();
        assert!(canvas.set_pixel(4, 0, Color::RED).is_err());
        assert_eq!(buf.get_pixel(1, 1).unwrap(), Color::RED);
        assert_eq!(buf.get_pixel(3, 3).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_clear_only_touches_clip() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        Canvas::new(&mut buf, Rect::new(1, 1, 2, 2)).clear(Color::BLUE);
        assert_eq!(buf.get_pixel(0, 0).unwrap(), Color::TRANSPARENT);
        assert_eq!(buf.get_pixel(1, 2).unwrap(), Color::BLUE);
        assert_eq!(buf.get_pixel(3, 3).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_blend_pixel_half_alpha() {
        let mut buf = PixelBuffer::filled(1, 1, Color::from_rgb(0, 0, 200)).unwrap();
        Canvas::unclipped(&mut buf)
            .blend_pixel(0, 0, Color::from_argb(128, 200, 0, 0))
            .unwrap();
        let c = buf.get_pixel(0, 0).unwrap();
        assert_eq!((c.red(), c.blue(), c.alpha()), (100, 100, 255));
    }
}
