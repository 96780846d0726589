use serde::{Deserialize, Serialize};

/// Inclusive axis-aligned pixel rectangle. Empty when `x_min > x_max` or
/// `y_min > y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

const fn last_pixel(start: i32, len: u32) -> i32 {
    let end = start as i64 + len as i64 - 1;
    if end > i32::MAX as i64 {
        i32::MAX
    } else {
        end as i32
    }
}

impl Rect {
    /// Rectangle from origin and size. A zero size yields an empty rect.
    /// Far edges past `i32::MAX` are clamped to it.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x_min: x,
            y_min: y,
            x_max: last_pixel(x, width),
            y_max: last_pixel(y, height),
        }
    }

    /// Rectangle from inclusive corners (not normalized)
    pub const fn from_corners(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Canonical empty rectangle
    pub const fn empty() -> Self {
        Self::from_corners(0, 0, -1, -1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    #[inline]
    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.x_max as i64 - self.x_min as i64 + 1).min(u32::MAX as i64) as u32
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.y_max as i64 - self.y_min as i64 + 1).min(u32::MAX as i64) as u32
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Overlap of two rectangles (may be empty)
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        }
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Same size, moved by (dx, dy)
    #[inline]
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }
}

/// Stack of saved clip rectangles over a fixed surface bound.
///
/// The base entry is the full surface and is never popped; the current
/// clip is always a subset of it.
#[derive(Debug, Clone)]
pub struct ClipStack {
    bounds: Rect,
    current: Rect,
    saved: Vec<Rect>,
}

impl ClipStack {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            current: bounds,
            saved: Vec::new(),
        }
    }

    /// Active clip
    #[inline]
    pub fn current(&self) -> Rect {
        self.current
    }

    /// Surface bounds (the base clip)
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Number of saved entries above the base
    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Save the current clip and replace it with `rect` limited to the surface
    pub fn push(&mut self, rect: Rect) {
        self.saved.push(self.current);
        self.current = rect.intersect(&self.bounds);
        log::trace!("clip push {:?} -> {:?}", rect, self.current);
    }

    /// Save the current clip and narrow it to its overlap with `rect`
    pub fn push_intersect(&mut self, rect: Rect) {
        self.saved.push(self.current);
        self.current = self.current.intersect(&rect);
        log::trace!("clip push_intersect {:?} -> {:?}", rect, self.current);
    }

    /// Restore the previously saved clip. Returns false (and keeps the
    /// base clip) when nothing was pushed.
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(rect) => {
                self.current = rect;
                true
            },
            None => {
                log::warn!("clip pop with empty stack; base clip kept");
                false
            },
        }
    }

    /// `rect` limited to the active clip
    #[inline]
    pub fn restrict(&self, rect: &Rect) -> Rect {
        self.current.intersect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_sizes() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!((r.x_max, r.y_max), (5, 7));
        assert_eq!((r.width(), r.height()), (4, 5));
        assert!(Rect::new(0, 0, 0, 3).is_empty());
        assert_eq!(Rect::empty().width(), 0);
    }

    #[test]
    fn test_rect_huge_size_clamps() {
        let r = Rect::new(-5, 10, u32::MAX, 1 << 31);
        assert_eq!((r.x_max, r.y_max), (i32::MAX, i32::MAX));
        assert!(!r.is_empty());
        assert_eq!(r.width(), u32::MAX);
        assert!(r.contains(0, 10));
        let full = Rect::from_corners(i32::MIN, 0, i32::MAX, 0);
        assert_eq!(full.width(), u32::MAX);
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -5, 10, 10);
        assert_eq!(a.intersect(&b), Rect::from_corners(5, 0, 9, 4));
        assert!(!a.intersects(&Rect::new(20, 20, 2, 2)));
    }

    #[test]
    fn test_push_limits_to_bounds() {
        let mut clips = ClipStack::new(Rect::new(0, 0, 8, 8));
        clips.push(Rect::new(-4, 4, 100, 2));
        assert_eq!(clips.current(), Rect::from_corners(0, 4, 7, 5));
    }

    #[test]
    fn test_push_intersect_narrows() {
        let mut clips = ClipStack::new(Rect::new(0, 0, 8, 8));
        clips.push(Rect::new(0, 0, 4, 8));
        clips.push_intersect(Rect::new(2, 2, 8, 2));
        assert_eq!(clips.current(), Rect::from_corners(2, 2, 3, 3));
        // plain push ignores the current clip
        clips.push(Rect::new(6, 6, 8, 8));
        assert_eq!(clips.current(), Rect::from_corners(6, 6, 7, 7));
    }

    #[test]
    fn test_push_pop_restores_at_any_depth() {
        let mut clips = ClipStack::new(Rect::new(0, 0, 16, 16));
        let mut history = vec![clips.current()];
        for i in 0..6 {
            if i % 2 == 0 {
                clips.push(Rect::new(i, i, 10, 3));
            } else {
                clips.push_intersect(Rect::new(0, i, 5, 5));
            }
            history.push(clips.current());
        }
        history.pop();
        while let Some(expected) = history.pop() {
            assert!(clips.pop());
            assert_eq!(clips.current(), expected);
        }
        assert_eq!(clips.depth(), 0);
    }

    #[test_log::test]
    fn test_base_clip_never_popped() {
        let bounds = Rect::new(0, 0, 4, 4);
        let mut clips = ClipStack::new(bounds);
        assert!(!clips.pop());
        assert_eq!(clips.current(), bounds);
    }

    #[test]
    fn test_empty_clip_is_allowed() {
        let mut clips = ClipStack::new(Rect::new(0, 0, 4, 4));
        clips.push(Rect::new(10, 10, 2, 2));
        assert!(clips.current().is_empty());
        assert!(clips.restrict(&Rect::new(0, 0, 4, 4)).is_empty());
    }
}
