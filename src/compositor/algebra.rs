use crate::color::Color;
use crate::error::Result;
use crate::mask::MaskPlane;
use crate::surface::PixelBuffer;

use super::Canvas;

/// Per-channel image arithmetic. The canvas is the left operand `d`, the
/// other buffer the right operand `s`. Results clamp to [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algebra {
    Min,
    Max,
    Add,
    Subtract,
    /// `d * s / 255`
    Multiply,
    /// `d * 255 / s`, with `s = 0` treated as 1
    Divide,
    Average,
}

impl Algebra {
    #[inline]
    fn channel(self, d: u8, s: u8) -> u8 {
        let (d, s) = (d as u32, s as u32);
        let v = match self {
            Algebra::Min => d.min(s),
            Algebra::Max => d.max(s),
            Algebra::Add => d + s,
            Algebra::Subtract => d.saturating_sub(s),
            Algebra::Multiply => d * s / 255,
            Algebra::Divide => d * 255 / s.max(1),
            Algebra::Average => (d + s) / 2,
        };
        v.min(255) as u8
    }

    /// Combine two colors; alpha comes from `d`
    #[inline]
    pub fn apply(self, d: Color, s: Color) -> Color {
        Color::from_argb(
            d.alpha(),
            self.channel(d.red(), s.red()),
            self.channel(d.green(), s.green()),
            self.channel(d.blue(), s.blue()),
        )
    }
}

impl Canvas<'_> {
    /// Combine `other` into this canvas pixel by pixel within the clip.
    /// Both buffers must have the same dimensions.
    pub fn combine(&mut self, other: &PixelBuffer, op: Algebra) -> Result<()> {
        self.buffer.check_same_size(other)?;
        let clip = self.clip;
        self.map_region(clip, |x, y, d| op.apply(d, other.at(x, y)));
        Ok(())
    }
}

impl PixelBuffer {
    /// Mask with a bit set wherever the two buffers differ by more than
    /// `tolerance` on any channel
    pub fn difference_mask(&self, other: &PixelBuffer, tolerance: u8) -> Result<MaskPlane> {
        self.check_same_size(other)?;
        let mut mask = MaskPlane::new(self.width(), self.height())?;
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                if !self.at(x, y).matches(other.at(x, y), tolerance) {
                    mask.set(x, y, true)?;
                }
            }
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RasterError;
    use crate::surface::Rect;

    fn px(r: u8, g: u8, b: u8) -> PixelBuffer {
        PixelBuffer::filled(2, 2, Color::from_argb(200, r, g, b)).unwrap()
    }

    fn combined(op: Algebra, left: (u8, u8, u8), right: (u8, u8, u8)) -> Color {
        let mut d = px(left.0, left.1, left.2);
        let s = px(right.0, right.1, right.2);
        Canvas::unclipped(&mut d).combine(&s, op).unwrap();
        d.get_pixel(0, 0).unwrap()
    }

    #[test]
    fn test_algebra_ops() {
        let l = (100, 200, 0);
        let r = (50, 100, 255);
        assert_eq!(combined(Algebra::Min, l, r), Color::from_argb(200, 50, 100, 0));
        assert_eq!(combined(Algebra::Max, l, r), Color::from_argb(200, 100, 200, 255));
        assert_eq!(combined(Algebra::Add, l, r), Color::from_argb(200, 150, 255, 255));
        assert_eq!(combined(Algebra::Subtract, l, r), Color::from_argb(200, 50, 100, 0));
        assert_eq!(combined(Algebra::Multiply, l, r), Color::from_argb(200, 19, 78, 0));
        assert_eq!(combined(Algebra::Average, l, r), Color::from_argb(200, 75, 150, 127));
    }

    #[test]
    fn test_divide_by_zero_channel() {
        let c = combined(Algebra::Divide, (10, 100, 0), (0, 200, 0));
        assert_eq!(c.red(), 255);
        assert_eq!(c.green(), 127);
        assert_eq!(c.blue(), 0);
    }

    #[test]
    fn test_combine_requires_same_size() {
        let mut d = PixelBuffer::new(2, 2).unwrap();
        let s = PixelBuffer::new(3, 2).unwrap();
        let err = Canvas::unclipped(&mut d).combine(&s, Algebra::Add).unwrap_err();
        assert!(matches!(err, RasterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_combine_limited_to_clip() {
        let mut d = px(10, 10, 10);
        let s = px(20, 20, 20);
        Canvas::new(&mut d, Rect::new(0, 0, 1, 1)).combine(&s, Algebra::Add).unwrap();
        assert_eq!(d.get_pixel(0, 0).unwrap().red(), 30);
        assert_eq!(d.get_pixel(1, 1).unwrap().red(), 10);
    }

    #[test]
    fn test_difference_mask() {
        let a = PixelBuffer::filled(3, 1, Color::from_rgb(100, 100, 100)).unwrap();
        let mut b = a.clone();
        b.set_pixel(1, 0, Color::from_rgb(104, 100, 100)).unwrap();
        b.set_pixel(2, 0, Color::from_rgb(120, 100, 100)).unwrap();
        let mask = a.difference_mask(&b, 5).unwrap();
        assert!(!mask.get(0, 0).unwrap());
        assert!(!mask.get(1, 0).unwrap());
        assert!(mask.get(2, 0).unwrap());
    }
}
