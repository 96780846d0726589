//! Analytic membership tests and small vector helpers used by the shape
//! fills and the line-distance paints.

/// Check if a point is inside a polygon using ray casting (even-odd rule)
pub fn point_in_polygon(px: f32, py: f32, vertices: &[(f32, f32)]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];

        // Horizontal edges never cross a horizontal ray
        let dy = yj - yi;
        if dy.abs() > f32::EPSILON && ((yi > py) != (yj > py)) {
            let x_intersect = (xj - xi) * (py - yi) / dy + xi;
            if px < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Integer bounding box of a vertex list: (min_x, min_y, max_x, max_y).
/// Returns None for an empty list.
pub fn polygon_bounds(vertices: &[(f32, f32)]) -> Option<(i32, i32, i32, i32)> {
    if vertices.is_empty() {
        return None;
    }
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for &(x, y) in vertices {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Some((
        min_x.floor() as i32,
        min_y.floor() as i32,
        max_x.ceil() as i32,
        max_y.ceil() as i32,
    ))
}

/// Pixel-center membership for the ellipse inscribed in the inclusive box
/// `[x0, x0 + w - 1] x [y0, y0 + h - 1]`.
#[inline]
pub fn point_in_ellipse(px: i32, py: i32, x0: i32, y0: i32, w: u32, h: u32) -> bool {
    let rx = w as f32 / 2.0;
    let ry = h as f32 / 2.0;
    let cx = x0 as f32 + rx;
    let cy = y0 as f32 + ry;
    let dx = (px as f32 + 0.5 - cx) / rx;
    let dy = (py as f32 + 0.5 - cy) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Calculate the length of a 2D vector
#[inline]
pub fn length(x: f32, y: f32) -> f32 {
    (x * x + y * y).sqrt()
}

/// Perpendicular distance from `(px, py)` to the infinite line through
/// `(x1, y1)` and `(x2, y2)`. Returns None when the two points coincide.
#[inline]
pub fn distance_to_line(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Option<f32> {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len = length(dx, dy);
    if len < f32::EPSILON {
        return None;
    }
    Some(((px - x1) * dy - (py - y1) * dx).abs() / len)
}
