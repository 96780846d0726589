use crate::color::{blend_over, Color};
use crate::error::{RasterError, Result};
use crate::geometry::{point_in_ellipse, point_in_polygon, polygon_bounds};
use crate::paint::PaintStrategy;
use crate::surface::Rect;

use super::{BlendMode, Canvas};

// ============================================================================
// Line rasterization
// ============================================================================

/// Step interval `[lo, hi]` for which `start + step * k` stays in `[min, max]`
#[inline]
fn step_interval(start: i64, step: i64, min: i64, max: i64) -> (i64, i64) {
    if step >= 0 {
        (min - start, max - start)
    } else {
        (start - max, start - min)
    }
}

#[inline]
fn ceil_div(a: i64, b: i64) -> i64 {
    -((-a).div_euclid(b))
}

/// Walk a line whose major axis is `a` (so `da >= db`).
///
/// The minor offset after `k` steps is `floor((2*k*db + da) / (2*da))`,
/// which is exactly what the Bresenham accumulator produces. Because it has
/// a closed form, the walk can start at the first step inside the clip
/// instead of testing every pixel before it.
fn walk_major(
    (a0, b0): (i64, i64),
    (sa, sb): (i64, i64),
    (da, db): (i64, i64),
    a_range: (i64, i64),
    b_range: (i64, i64),
    mut plot: impl FnMut(i64, i64),
) {
    let (ka, kb) = step_interval(a0, sa, a_range.0, a_range.1);
    let (qa, qb) = step_interval(b0, sb, b_range.0, b_range.1);

    let mut k_lo = ka.max(0);
    let mut k_hi = kb.min(da);
    if db == 0 {
        if qa > 0 || qb < 0 {
            return;
        }
    } else {
        // q_k >= qa  <=>  2k*db + da >= 2*da*qa
        k_lo = k_lo.max(ceil_div(2 * da * qa - da, 2 * db));
        // q_k <= qb  <=>  2k*db + da <= 2*da*(qb + 1) - 1
        k_hi = k_hi.min((2 * da * (qb + 1) - da - 1).div_euclid(2 * db));
    }
    if k_lo > k_hi {
        return;
    }

    let two_da = 2 * da;
    let num = 2 * k_lo * db + da;
    let mut q = num.div_euclid(two_da);
    let mut err = num - q * two_da;
    for k in k_lo..=k_hi {
        plot(a0 + sa * k, b0 + sb * q);
        err += 2 * db;
        if err >= two_da {
            err -= two_da;
            q += 1;
        }
    }
}

/// Visit every pixel of the Bresenham line from `(x0, y0)` to `(x1, y1)`
/// that lies inside `clip`, in order from the first endpoint.
pub(crate) fn trace_line(clip: Rect, x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    if clip.is_empty() {
        return;
    }
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x1 >= x0 { 1 } else { -1 };
    let sy = if y1 >= y0 { 1 } else { -1 };
    let xr = (clip.x_min as i64, clip.x_max as i64);
    let yr = (clip.y_min as i64, clip.y_max as i64);

    if dx >= dy {
        walk_major((x0, y0), (sx, sy), (dx, dy), xr, yr, |x, y| {
            plot(x as i32, y as i32);
        });
    } else {
        walk_major((y0, x0), (sy, sx), (dy, dx), yr, xr, |y, x| {
            plot(x as i32, y as i32);
        });
    }
}

impl Canvas<'_> {
    /// Horizontal span from `x0` to `x1` inclusive
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Color, mode: BlendMode) {
        let clip = self.clip;
        if y < clip.y_min || y > clip.y_max {
            return;
        }
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let start = x0.max(clip.x_min);
        let end = x1.min(clip.x_max);
        if start > end {
            return;
        }
        if mode == BlendMode::Overwrite {
            let i = self.buffer.index(start, y);
            let len = (end - start + 1) as usize;
            self.buffer.as_argb_mut()[i..i + len].fill(color.0);
            return;
        }
        for x in start..=end {
            self.plot(x, y, color, mode);
        }
    }

    /// Vertical span from `y0` to `y1` inclusive
    pub fn vline(&mut self, x: i32, y0: i32, y1: i32, color: Color, mode: BlendMode) {
        let clip = self.clip;
        if x < clip.x_min || x > clip.x_max {
            return;
        }
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        let start = y0.max(clip.y_min);
        let end = y1.min(clip.y_max);
        for y in start..=end {
            self.plot(x, y, color, mode);
        }
    }

    /// Line between two points (endpoints included), overwriting pixels
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.draw_line(x0, y0, x1, y1, color, BlendMode::Overwrite);
    }

    /// Line blended with the color's own alpha
    pub fn line_blend(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.draw_line(x0, y0, x1, y1, color, BlendMode::Alpha);
    }

    /// Line with an explicit blend mode
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color, mode: BlendMode) {
        if y0 == y1 {
            self.hline(x0, x1, y0, color, mode);
            return;
        }
        if x0 == x1 {
            self.vline(x0, y0, y1, color, mode);
            return;
        }
        let clip = self.clip;
        trace_line(clip, x0, y0, x1, y1, |x, y| self.plot(x, y, color, mode));
    }

    // ========================================================================
    // Outlines
    // ========================================================================

    /// One-pixel rectangle outline; corners are touched once
    pub fn draw_rect(&mut self, rect: Rect, color: Color, mode: BlendMode) {
        if rect.is_empty() {
            return;
        }
        self.hline(rect.x_min, rect.x_max, rect.y_min, color, mode);
        if rect.y_max > rect.y_min {
            self.hline(rect.x_min, rect.x_max, rect.y_max, color, mode);
        }
        if rect.y_max - rect.y_min >= 2 {
            self.vline(rect.x_min, rect.y_min + 1, rect.y_max - 1, color, mode);
            if rect.x_max > rect.x_min {
                self.vline(rect.x_max, rect.y_min + 1, rect.y_max - 1, color, mode);
            }
        }
    }

    /// Circle outline (midpoint algorithm)
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color, mode: BlendMode) {
        if radius < 0 {
            return;
        }
        let clip = self.clip;
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;
        let mut points = Vec::with_capacity(8);

        while x >= y {
            points.clear();
            for (px, py) in [
                (cx + x, cy + y),
                (cx + y, cy + x),
                (cx - y, cy + x),
                (cx - x, cy + y),
                (cx - x, cy - y),
                (cx - y, cy - x),
                (cx + y, cy - x),
                (cx + x, cy - y),
            ] {
                // octant points coincide on the axes and diagonals
                if !points.contains(&(px, py)) {
                    points.push((px, py));
                }
            }
            for &(px, py) in &points {
                if clip.contains(px, py) {
                    self.plot(px, py, color, mode);
                }
            }

            y += 1;
            err += 1 + 2 * y;
            if 2 * (err - x) + 1 > 0 {
                x -= 1;
                err += 1 - 2 * x;
            }
        }
    }

    /// Closed polygon outline
    pub fn draw_polygon(&mut self, vertices: &[(i32, i32)], color: Color, mode: BlendMode) -> Result<()> {
        if vertices.len() < 2 {
            return Err(RasterError::DegenerateGeometry(
                "polygon outline needs at least two vertices",
            ));
        }
        let n = vertices.len();
        for i in 0..n {
            let (x0, y0) = vertices[i];
            let (x1, y1) = vertices[(i + 1) % n];
            self.draw_line(x0, y0, x1, y1, color, mode);
        }
        Ok(())
    }

    // ========================================================================
    // Filled shapes
    // ========================================================================

    /// Shared fill skeleton: scan `bounds` limited to the clip and write
    /// every pixel for which `contains` holds.
    pub fn fill_shape(
        &mut self,
        bounds: Rect,
        contains: impl Fn(i32, i32) -> bool,
        color: Color,
        mode: BlendMode,
    ) {
        let area = self.clip.intersect(&bounds);
        if area.is_empty() {
            return;
        }
        for y in area.y_min..=area.y_max {
            for x in area.x_min..=area.x_max {
                if contains(x, y) {
                    self.plot(x, y, color, mode);
                }
            }
        }
    }

    /// Same skeleton, colors drawn from a paint and alpha-blended.
    ///
    /// The paint is initialized once with the size of `bounds`, and queried
    /// with coordinates relative to its top-left corner.
    pub fn fill_shape_paint(
        &mut self,
        bounds: Rect,
        contains: impl Fn(i32, i32) -> bool,
        paint: &mut dyn PaintStrategy,
    ) {
        if bounds.is_empty() {
            return;
        }
        paint.initialize(bounds.width(), bounds.height());
        let area = self.clip.intersect(&bounds);
        if area.is_empty() {
            return;
        }
        for y in area.y_min..=area.y_max {
            for x in area.x_min..=area.x_max {
                if contains(x, y) {
                    let src = paint.color_at(x - bounds.x_min, y - bounds.y_min);
                    let dst = self.buffer.at(x, y);
                    self.buffer.put(x, y, blend_over(dst, src));
                }
            }
        }
    }

    /// Filled rectangle
    pub fn fill_rect(&mut self, rect: Rect, color: Color, mode: BlendMode) {
        let area = self.clip.intersect(&rect);
        if area.is_empty() {
            return;
        }
        for y in area.y_min..=area.y_max {
            self.hline(area.x_min, area.x_max, y, color, mode);
        }
    }

    pub fn fill_rect_paint(&mut self, rect: Rect, paint: &mut dyn PaintStrategy) {
        self.fill_shape_paint(rect, |_, _| true, paint);
    }

    /// Ellipse inscribed in `rect`
    pub fn fill_ellipse(&mut self, rect: Rect, color: Color, mode: BlendMode) {
        let (x0, y0, w, h) = (rect.x_min, rect.y_min, rect.width(), rect.height());
        self.fill_shape(rect, |x, y| point_in_ellipse(x, y, x0, y0, w, h), color, mode);
    }

    pub fn fill_ellipse_paint(&mut self, rect: Rect, paint: &mut dyn PaintStrategy) {
        let (x0, y0, w, h) = (rect.x_min, rect.y_min, rect.width(), rect.height());
        self.fill_shape_paint(rect, |x, y| point_in_ellipse(x, y, x0, y0, w, h), paint);
    }

    /// Disc of pixels with `dx^2 + dy^2 <= radius^2`
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color, mode: BlendMode) {
        if radius < 0 {
            return;
        }
        let bounds = Rect::from_corners(
            cx.saturating_sub(radius),
            cy.saturating_sub(radius),
            cx.saturating_add(radius),
            cy.saturating_add(radius),
        );
        let r_sq = radius as i64 * radius as i64;
        self.fill_shape(
            bounds,
            |x, y| {
                let dx = x as i64 - cx as i64;
                let dy = y as i64 - cy as i64;
                dx * dx + dy * dy <= r_sq
            },
            color,
            mode,
        );
    }

    /// Even-odd polygon fill sampled at pixel centers
    pub fn fill_polygon(&mut self, vertices: &[(f32, f32)], color: Color, mode: BlendMode) -> Result<()> {
        let bounds = polygon_fill_bounds(vertices)?;
        self.fill_shape(
            bounds,
            |x, y| point_in_polygon(x as f32 + 0.5, y as f32 + 0.5, vertices),
            color,
            mode,
        );
        Ok(())
    }

    pub fn fill_polygon_paint(&mut self, vertices: &[(f32, f32)], paint: &mut dyn PaintStrategy) -> Result<()> {
        let bounds = polygon_fill_bounds(vertices)?;
        self.fill_shape_paint(
            bounds,
            |x, y| point_in_polygon(x as f32 + 0.5, y as f32 + 0.5, vertices),
            paint,
        );
        Ok(())
    }
}

fn polygon_fill_bounds(vertices: &[(f32, f32)]) -> Result<Rect> {
    if vertices.len() < 3 {
        return Err(RasterError::DegenerateGeometry(
            "polygon fill needs at least three vertices",
        ));
    }
    match polygon_bounds(vertices) {
        Some((x0, y0, x1, y1)) => Ok(Rect::from_corners(x0, y0, x1, y1)),
        None => Err(RasterError::DegenerateGeometry("polygon has no vertices")),
    }
}
