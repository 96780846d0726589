use crate::color::{blend, blend_over, Color};
use crate::mask::MaskPlane;
use crate::paint::PaintStrategy;
use crate::surface::{PixelBuffer, Rect};

use super::{BlendMode, Canvas};

/// What a stencil writes into a pixel
#[derive(Debug, Clone, Copy)]
pub enum Source<'s> {
    /// Flat color
    Color(Color),
    /// Pixel of a buffer aligned with the mask origin; pixels past its
    /// edge keep the destination
    Buffer(&'s PixelBuffer),
    /// Leave the destination untouched
    Keep,
}

impl Source<'_> {
    #[inline]
    fn sample(&self, mx: i32, my: i32) -> Option<Color> {
        match self {
            Source::Color(c) => Some(*c),
            Source::Buffer(buf) => buf.pixel(mx, my),
            Source::Keep => None,
        }
    }
}

impl Canvas<'_> {
    /// Composite the whole of `src` with its top-left corner at `(x, y)`
    pub fn blit(&mut self, src: &PixelBuffer, x: i32, y: i32, mode: BlendMode) {
        self.blit_region(src, src.bounds(), x, y, mode);
    }

    /// Composite the `region` part of `src` with its top-left corner at
    /// `(x, y)`. The region is clamped to the source, and the target to the
    /// clip.
    pub fn blit_region(&mut self, src: &PixelBuffer, region: Rect, x: i32, y: i32, mode: BlendMode) {
        let region = region.intersect(&src.bounds());
        if region.is_empty() {
            return;
        }
        let target = Rect::new(x, y, region.width(), region.height()).intersect(&self.clip);
        if target.is_empty() {
            return;
        }
        let ox = region.x_min - x;
        let oy = region.y_min - y;

        if mode == BlendMode::Overwrite {
            let from = target.translated(ox, oy);
            self.buffer.copy_rect(src, from, target.x_min, target.y_min);
            return;
        }
        for ty in target.y_min..=target.y_max {
            for tx in target.x_min..=target.x_max {
                let s = src.at(tx + ox, ty + oy);
                let d = self.buffer.at(tx, ty);
                self.buffer.put(tx, ty, mode.apply(d, s));
            }
        }
    }

    /// Mask-driven composite: for each mask pixel placed at `(x, y)`,
    /// write `on` where the bit is set and `off` where it is clear.
    pub fn stencil(&mut self, mask: &MaskPlane, x: i32, y: i32, on: Source<'_>, off: Source<'_>) {
        let area = Rect::new(x, y, mask.width(), mask.height()).intersect(&self.clip);
        if area.is_empty() {
            return;
        }
        for ty in area.y_min..=area.y_max {
            for tx in area.x_min..=area.x_max {
                let (mx, my) = (tx - x, ty - y);
                let source = if mask.is_on(mx, my) { &on } else { &off };
                if let Some(c) = source.sample(mx, my) {
                    self.buffer.put(tx, ty, c);
                }
            }
        }
    }

    /// Paint every on bit of `mask` placed at `(x, y)`, alpha-blended.
    /// The paint sees the mask as its fill box.
    pub fn fill_mask_paint(&mut self, mask: &MaskPlane, x: i32, y: i32, paint: &mut dyn PaintStrategy) {
        let bounds = Rect::new(x, y, mask.width(), mask.height());
        self.fill_shape_paint(bounds, |px, py| mask.is_on(px - x, py - y), paint);
    }

    /// Use the alpha channel of `coverage` as per-pixel opacity for `color`,
    /// scaled by the color's own alpha.
    pub fn blend_coverage(&mut self, coverage: &PixelBuffer, x: i32, y: i32, color: Color) {
        let area = Rect::new(x, y, coverage.width(), coverage.height()).intersect(&self.clip);
        if area.is_empty() {
            return;
        }
        let peak = color.alpha() as u32;
        for ty in area.y_min..=area.y_max {
            for tx in area.x_min..=area.x_max {
                let cov = coverage.at(tx - x, ty - y).alpha() as u32;
                let a = (cov * peak + 127) / 255;
                let d = self.buffer.at(tx, ty);
                self.buffer.put(tx, ty, blend(d, color, a as u8));
            }
        }
    }
}

/// Source-over of `src` onto `dst` at the same coordinates, ignoring clips.
/// Used by the sprite overlay to composite foregrounds.
pub(crate) fn composite_over(dst: &mut PixelBuffer, src: &PixelBuffer, x: i32, y: i32) {
    let area = Rect::new(x, y, src.width(), src.height()).intersect(&dst.bounds());
    if area.is_empty() {
        return;
    }
    for ty in area.y_min..=area.y_max {
        for tx in area.x_min..=area.x_max {
            let s = src.at(tx - x, ty - y);
            let d = dst.at(tx, ty);
            dst.put(tx, ty, blend_over(d, s));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Solid;

    fn checker(w: u32, h: u32) -> PixelBuffer {
        let mut b = PixelBuffer::new(w, h).unwrap();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let c = if (x + y) % 2 == 0 { Color::WHITE } else { Color::BLACK };
                b.set_pixel(x, y, c).unwrap();
            }
        }
        b
    }

    #[test]
    fn test_blit_overwrite_clamped_to_destination() {
        let src = checker(4, 4);
        let mut dst = PixelBuffer::new(5, 5).unwrap();
        Canvas::unclipped(&mut dst).blit(&src, 3, -1, BlendMode::Overwrite);
        // src (0, 1) lands on (3, 0)
        assert_eq!(dst.get_pixel(3, 0).unwrap(), Color::BLACK);
        assert_eq!(dst.get_pixel(4, 0).unwrap(), Color::WHITE);
        assert_eq!(dst.get_pixel(4, 2).unwrap(), Color::WHITE);
        assert_eq!(dst.get_pixel(2, 0).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_blit_respects_clip() {
        let src = PixelBuffer::filled(4, 4, Color::RED).unwrap();
        let mut dst = PixelBuffer::new(4, 4).unwrap();
        Canvas::new(&mut dst, Rect::new(1, 1, 2, 2)).blit(&src, 0, 0, BlendMode::Alpha);
        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::TRANSPARENT);
        assert_eq!(dst.get_pixel(1, 1).unwrap(), Color::RED);
        assert_eq!(dst.get_pixel(2, 2).unwrap(), Color::RED);
        assert_eq!(dst.get_pixel(3, 3).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_blit_region_offsets_source() {
        let src = checker(4, 4);
        let mut dst = PixelBuffer::new(2, 2).unwrap();
        Canvas::unclipped(&mut dst).blit_region(&src, Rect::new(1, 0, 2, 2), 0, 0, BlendMode::Overwrite);
        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::BLACK);
        assert_eq!(dst.get_pixel(1, 0).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_global_alpha_ignores_source_alpha() {
        let src = PixelBuffer::filled(1, 1, Color::from_argb(10, 255, 255, 255)).unwrap();
        let mut dst = PixelBuffer::filled(1, 1, Color::BLACK).unwrap();
        Canvas::unclipped(&mut dst).blit(&src, 0, 0, BlendMode::GlobalAlpha(128));
        assert_eq!(dst.get_pixel(0, 0).unwrap().red(), 127);
    }

    #[test]
    fn test_stencil_on_off_keep() {
        let mut mask = MaskPlane::new(3, 1).unwrap();
        mask.set(0, 0, true).unwrap();
        mask.set(2, 0, true).unwrap();
        let mut dst = PixelBuffer::filled(3, 1, Color::BLUE).unwrap();
        Canvas::unclipped(&mut dst).stencil(&mask, 0, 0, Source::Color(Color::RED), Source::Keep);
        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::RED);
        assert_eq!(dst.get_pixel(1, 0).unwrap(), Color::BLUE);
        assert_eq!(dst.get_pixel(2, 0).unwrap(), Color::RED);
    }

    #[test]
    fn test_stencil_from_buffer() {
        let mask = MaskPlane::new(2, 2).unwrap();
        let img = checker(2, 2);
        let mut dst = PixelBuffer::new(3, 3).unwrap();
        Canvas::unclipped(&mut dst).stencil(&mask, 1, 1, Source::Keep, Source::Buffer(&img));
        assert_eq!(dst.get_pixel(1, 1).unwrap(), Color::WHITE);
        assert_eq!(dst.get_pixel(2, 1).unwrap(), Color::BLACK);
        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_fill_mask_paint() {
        let mut mask = MaskPlane::new(2, 2).unwrap();
        mask.set(1, 1, true).unwrap();
        let mut dst = PixelBuffer::new(4, 4).unwrap();
        Canvas::unclipped(&mut dst).fill_mask_paint(&mask, 2, 2, &mut Solid(Color::GREEN));
        assert_eq!(dst.get_pixel(3, 3).unwrap(), Color::GREEN);
        assert_eq!(dst.get_pixel(2, 2).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_blend_coverage_scales_alpha() {
        let mut cov = PixelBuffer::new(2, 1).unwrap();
        cov.set_pixel(0, 0, Color::WHITE).unwrap();
        cov.set_pixel(1, 0, Color::from_argb(128, 0, 0, 0)).unwrap();
        let mut dst = PixelBuffer::filled(2, 1, Color::BLACK).unwrap();
        Canvas::unclipped(&mut dst).blend_coverage(&cov, 0, 0, Color::WHITE);
        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::WHITE);
        assert_eq!(dst.get_pixel(1, 0).unwrap().red(), 127);
    }

    #[test]
    fn test_composite_over_ignores_out_of_range() {
        let src = PixelBuffer::filled(2, 2, Color::RED).unwrap();
        let mut dst = PixelBuffer::new(3, 3).unwrap();
        composite_over(&mut dst, &src, 2, 2);
        assert_eq!(dst.get_pixel(2, 2).unwrap(), Color::RED);
        assert_eq!(dst.get_pixel(1, 1).unwrap(), Color::TRANSPARENT);
    }
}
