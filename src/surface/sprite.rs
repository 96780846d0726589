use crate::compositor::composite_over;
use crate::error::Result;

use super::{PixelBuffer, Rect};

/// Positioned overlay with its own pixels.
///
/// While visible, `background` holds the parent pixels the sprite covers,
/// so hiding restores them exactly. Sprites are owned by one surface at a
/// time and only ever destroyed through `Surface::remove_sprite`.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) foreground: PixelBuffer,
    background: PixelBuffer,
    pub(crate) visible: bool,
    pub(crate) index: usize,
}

impl Sprite {
    pub(crate) fn new(index: usize, x: i32, y: i32, width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            x,
            y,
            foreground: PixelBuffer::new(width, height)?,
            background: PixelBuffer::new(width, height)?,
            visible: false,
            index,
        })
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.foreground.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.foreground.height()
    }

    /// Area covered on the parent
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width(), self.height())
    }

    /// Whether the sprite is composited onto its parent right now
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Position in the parent's list; higher draws on top
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn foreground(&self) -> &PixelBuffer {
        &self.foreground
    }

    /// Capture the covered parent pixels, then composite the foreground
    pub(crate) fn show(&mut self, parent: &mut PixelBuffer) {
        if self.visible {
            return;
        }
        let covered = self.bounds().intersect(&parent.bounds());
        if !covered.is_empty() {
            self.background
                .copy_rect(parent, covered, covered.x_min - self.x, covered.y_min - self.y);
        }
        composite_over(parent, &self.foreground, self.x, self.y);
        self.visible = true;
    }

    /// Put the captured pixels back
    pub(crate) fn hide(&mut self, parent: &mut PixelBuffer) {
        if !self.visible {
            return;
        }
        let covered = self.bounds().intersect(&parent.bounds());
        if !covered.is_empty() {
            parent.copy_rect(
                &self.background,
                covered.translated(-self.x, -self.y),
                covered.x_min,
                covered.y_min,
            );
        }
        self.visible = false;
    }
}
