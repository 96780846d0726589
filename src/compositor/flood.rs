use crate::color::Color;
use crate::error::Result;
use crate::mask::MaskPlane;

use super::Canvas;

impl Canvas<'_> {
    /// Recolor the 4-connected region around `(x, y)` whose pixels lie
    /// within `tolerance` of the seed color. Growth never leaves the clip.
    ///
    /// Returns the number of pixels written. A seed outside the clip
    /// writes nothing.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: Color, tolerance: u8) -> Result<usize> {
        self.buffer.check_bounds(x, y)?;
        let clip = self.clip;
        if !clip.contains(x, y) {
            return Ok(0);
        }

        let seed = self.buffer.at(x, y);
        let mut visited = MaskPlane::new(self.buffer.width(), self.buffer.height())?;
        let mut stack = vec![(x, y)];
        visited.set(x, y, true)?;
        let mut written = 0usize;

        while let Some((cx, cy)) = stack.pop() {
            self.buffer.put(cx, cy, color);
            written += 1;
            for (nx, ny) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
                if !clip.contains(nx, ny) || visited.is_on(nx, ny) {
                    continue;
                }
                if self.buffer.at(nx, ny).matches(seed, tolerance) {
                    visited.set(nx, ny, true)?;
                    stack.push((nx, ny));
                }
            }
        }

        log::trace!("flood fill from ({}, {}) wrote {} pixels", x, y, written);
        Ok(written)
    }
}
