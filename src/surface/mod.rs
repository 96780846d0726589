//! The drawable surface: pixels, clip stack, draw-mode gate, sprites and
//! observers in one place.
//!
//! Pixel mutation goes through [`Surface::canvas`], which only succeeds
//! while the surface is in draw mode. Entering draw mode lifts every sprite
//! off the pixels so primitives see the bare surface; leaving it puts the
//! visible ones back and tells observers to redraw.

mod clip;
mod draw_mode;
mod observer;
mod pixel_buffer;
mod sprite;

pub use clip::{ClipStack, Rect};
pub use draw_mode::{Deferred, DrawMode, DrawModeController};
pub use observer::{Observer, ObserverRegistry};
pub use pixel_buffer::PixelBuffer;
pub use sprite::Sprite;

use crate::color::Color;
use crate::compositor::Canvas;
use crate::config::EngineConfig;
use crate::error::{RasterError, Result};

pub struct Surface {
    buffer: PixelBuffer,
    clips: ClipStack,
    draw_mode: DrawModeController,
    sprites: Vec<Sprite>,
    observers: ObserverRegistry,
    config: EngineConfig,
}

impl Surface {
    /// Surface with the default configuration
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_config(width, height, EngineConfig::default())
    }

    /// Surface filled with the configured background
    pub fn with_config(width: u32, height: u32, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let buffer = PixelBuffer::filled(width, height, config.background)?;
        Ok(Self::assemble(buffer, config))
    }

    /// Wrap existing pixels
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self::assemble(buffer, EngineConfig::default())
    }

    fn assemble(buffer: PixelBuffer, config: EngineConfig) -> Self {
        log::debug!("surface {}x{} created", buffer.width(), buffer.height());
        Self {
            clips: ClipStack::new(buffer.bounds()),
            buffer,
            draw_mode: DrawModeController::new(),
            sprites: Vec::new(),
            observers: ObserverRegistry::new(),
            config,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Current pixels, sprites included when not in draw mode
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Tell every observer the pixels changed
    pub fn update(&self) {
        self.observers.update();
    }

    // ========================================================================
    // Pixel access
    // ========================================================================

    /// Read a pixel; allowed in any mode
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Color> {
        self.buffer.get_pixel(x, y)
    }

    /// Write a pixel (draw mode only, clip applies)
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        self.canvas()?.set_pixel(x, y, color)
    }

    /// Drawing view limited to the current clip. Fails with `WrongMode`
    /// outside draw mode.
    pub fn canvas(&mut self) -> Result<Canvas<'_>> {
        self.draw_mode.ensure_active("drawing requires draw mode")?;
        let clip = self.clips.current();
        Ok(Canvas::new(&mut self.buffer, clip))
    }

    /// Flood fill using the configured tolerance
    pub fn flood_fill(&mut self, x: i32, y: i32, color: Color) -> Result<usize> {
        let tolerance = self.config.tolerance;
        self.canvas()?.flood_fill(x, y, color, tolerance)
    }

    /// Blur the clip with the configured kernel
    pub fn blur(&mut self) -> Result<()> {
        let kernel = self.config.blur_kernel;
        self.canvas()?.blur(kernel);
        Ok(())
    }

    // ========================================================================
    // Clip stack
    // ========================================================================

    pub fn clip(&self) -> Rect {
        self.clips.current()
    }

    pub fn clip_depth(&self) -> usize {
        self.clips.depth()
    }

    /// Save the clip and replace it with `rect` limited to the surface
    pub fn push_clip(&mut self, rect: Rect) {
        self.clips.push(rect);
    }

    /// Save the clip and narrow it to its overlap with `rect`
    pub fn push_clip_intersect(&mut self, rect: Rect) {
        self.clips.push_intersect(rect);
    }

    /// Restore the last saved clip; false if only the base clip is left
    pub fn pop_clip(&mut self) -> bool {
        self.clips.pop()
    }

    // ========================================================================
    // Draw mode
    // ========================================================================

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode.mode()
    }

    pub fn is_locked(&self) -> bool {
        self.draw_mode.is_locked()
    }

    /// Callbacks still waiting for a transition into `target`
    pub fn pending_callbacks(&self, target: DrawMode) -> usize {
        self.draw_mode.pending(target)
    }

    /// Switch to Active: lift every sprite (top first), then run the
    /// queued enter callbacks. No-op when already Active.
    pub fn enter_draw_mode(&mut self) -> Result<()> {
        if self.draw_mode.is_active() {
            return Ok(());
        }
        self.draw_mode.ensure_unlocked("cannot enter draw mode while locked")?;
        self.draw_mode.set_active(true);

        let visibility: Vec<bool> = self.sprites.iter().map(Sprite::is_visible).collect();
        self.draw_mode.with_visibility(|v| *v = visibility);
        for sprite in self.sprites.iter_mut().rev() {
            sprite.hide(&mut self.buffer);
        }
        log::debug!("entered draw mode ({} sprites lifted)", self.sprites.len());

        self.drain(DrawMode::Active)
    }

    /// Switch to Idle: put sprites back as recorded (bottom first), run the
    /// queued exit callbacks, then notify observers. No-op when already Idle.
    pub fn exit_draw_mode(&mut self) -> Result<()> {
        if !self.draw_mode.is_active() {
            return Ok(());
        }
        self.draw_mode.ensure_unlocked("cannot exit draw mode while locked")?;

        let visibility = self.draw_mode.with_visibility(std::mem::take);
        for (i, sprite) in self.sprites.iter_mut().enumerate() {
            if visibility.get(i).copied().unwrap_or(false) {
                sprite.show(&mut self.buffer);
            }
        }

        let drained = self.drain(DrawMode::Idle);
        self.draw_mode.set_active(false);
        log::debug!("left draw mode");
        self.observers.update();
        drained
    }

    /// Run `f` in draw mode, restoring the previous mode afterwards.
    /// The body runs locked: transitions and nested scopes fail.
    pub fn with_draw_mode<R>(&mut self, f: impl FnOnce(&mut Surface) -> Result<R>) -> Result<R> {
        self.scoped(DrawMode::Active, f)
    }

    /// Run `f` out of draw mode, restoring the previous mode afterwards
    pub fn without_draw_mode<R>(&mut self, f: impl FnOnce(&mut Surface) -> Result<R>) -> Result<R> {
        self.scoped(DrawMode::Idle, f)
    }

    fn scoped<R>(&mut self, mode: DrawMode, f: impl FnOnce(&mut Surface) -> Result<R>) -> Result<R> {
        self.draw_mode.ensure_unlocked("scoped draw-mode helpers cannot nest")?;
        let prior = self.draw_mode.mode();
        if let Err(err) = self.switch_to(mode) {
            if let Err(undo) = self.switch_to(prior) {
                log::warn!("could not restore {:?} after failed switch: {}", prior, undo);
            }
            return Err(err);
        }

        self.draw_mode.set_locked(true);
        let out = f(self);
        self.draw_mode.set_locked(false);

        let restored = self.switch_to(prior);
        let value = out?;
        restored?;
        Ok(value)
    }

    fn switch_to(&mut self, mode: DrawMode) -> Result<()> {
        match mode {
            DrawMode::Active => self.enter_draw_mode(),
            DrawMode::Idle => self.exit_draw_mode(),
        }
    }

    /// Run `cb` now if the surface is Active and unlocked, otherwise on
    /// the next entry into draw mode
    pub fn defer_until_active(&mut self, cb: impl FnOnce(&mut Surface) -> Result<()> + Send + 'static) -> Result<()> {
        self.defer(DrawMode::Active, Box::new(cb))
    }

    /// Run `cb` now if the surface is Idle and unlocked, otherwise on the
    /// next exit from draw mode
    pub fn defer_until_idle(&mut self, cb: impl FnOnce(&mut Surface) -> Result<()> + Send + 'static) -> Result<()> {
        self.defer(DrawMode::Idle, Box::new(cb))
    }

    fn defer(&mut self, target: DrawMode, cb: Deferred) -> Result<()> {
        if self.draw_mode.mode() == target && !self.draw_mode.is_locked() {
            self.draw_mode.set_locked(true);
            let out = cb(self);
            self.draw_mode.set_locked(false);
            return out;
        }
        self.draw_mode.queue(target, cb);
        Ok(())
    }

    /// Run queued callbacks for `target` in order under the lock. The first
    /// error stops the drain; callbacks behind it stay queued.
    fn drain(&mut self, target: DrawMode) -> Result<()> {
        self.draw_mode.set_locked(true);
        while let Some(cb) = self.draw_mode.next(target) {
            if let Err(err) = cb(self) {
                self.draw_mode.set_locked(false);
                log::warn!(
                    "{:?} callback failed, {} left queued: {}",
                    target,
                    self.draw_mode.pending(target),
                    err
                );
                return Err(err);
            }
        }
        self.draw_mode.set_locked(false);
        Ok(())
    }

    // ========================================================================
    // Sprites
    // ========================================================================

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn sprite(&self, index: usize) -> Result<&Sprite> {
        self.sprites.get(index).ok_or(RasterError::NoSuchSprite(index))
    }

    fn check_sprite(&self, index: usize) -> Result<()> {
        if index >= self.sprites.len() {
            return Err(RasterError::NoSuchSprite(index));
        }
        Ok(())
    }

    /// Add a hidden, transparent sprite on top of the others. Returns its index.
    pub fn create_sprite(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<usize> {
        let index = self.sprites.len();
        self.sprites.push(Sprite::new(index, x, y, width, height)?);
        if self.draw_mode.is_active() {
            self.draw_mode.with_visibility(|v| v.push(false));
        }
        log::debug!("sprite {} created at ({}, {}) {}x{}", index, x, y, width, height);
        Ok(index)
    }

    /// Detach a sprite, hiding it first. Sprites above move down one index.
    pub fn remove_sprite(&mut self, index: usize) -> Result<Sprite> {
        self.check_sprite(index)?;
        if self.draw_mode.is_active() {
            self.draw_mode.with_visibility(|v| {
                if index < v.len() {
                    v.remove(index);
                }
            });
        } else {
            self.restack(index, |sprite, parent| sprite.hide(parent));
        }
        let mut sprite = self.sprites.remove(index);
        self.reindex();
        sprite.index = 0;
        log::debug!("sprite {} removed", index);
        Ok(sprite)
    }

    /// Show or hide a sprite. In draw mode the request is recorded and
    /// applied on exit.
    pub fn set_sprite_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        self.check_sprite(index)?;
        if self.draw_mode.is_active() {
            self.draw_mode.with_visibility(|v| {
                if let Some(slot) = v.get_mut(index) {
                    *slot = visible;
                }
            });
            return Ok(());
        }
        self.restack(index, |sprite, parent| {
            if visible {
                sprite.show(parent);
            } else {
                sprite.hide(parent);
            }
        });
        Ok(())
    }

    /// Move a sprite, re-compositing it at the new spot if visible
    pub fn move_sprite(&mut self, index: usize, x: i32, y: i32) -> Result<()> {
        self.check_sprite(index)?;
        if self.draw_mode.is_active() {
            let sprite = &mut self.sprites[index];
            sprite.x = x;
            sprite.y = y;
            return Ok(());
        }
        self.restack(index, |sprite, parent| {
            let was_visible = sprite.is_visible();
            sprite.hide(parent);
            sprite.x = x;
            sprite.y = y;
            if was_visible {
                sprite.show(parent);
            }
        });
        Ok(())
    }

    /// Move a sprite to the top of the stack
    pub fn raise_sprite(&mut self, index: usize) -> Result<()> {
        self.check_sprite(index)?;
        if index + 1 == self.sprites.len() {
            return Ok(());
        }
        if self.draw_mode.is_active() {
            let sprite = self.sprites.remove(index);
            self.sprites.push(sprite);
            self.draw_mode.with_visibility(|v| {
                if index < v.len() {
                    let flag = v.remove(index);
                    v.push(flag);
                }
            });
            self.reindex();
            return Ok(());
        }

        // Lift everything from `index` up, then re-show in the new order
        let mut was_visible: Vec<bool> = Vec::with_capacity(self.sprites.len() - index);
        for sprite in self.sprites[index..].iter_mut().rev() {
            was_visible.push(sprite.is_visible());
            sprite.hide(&mut self.buffer);
        }
        was_visible.reverse();
        let raised = self.sprites.remove(index);
        self.sprites.push(raised);
        let flag = was_visible.remove(0);
        was_visible.push(flag);
        self.reindex();

        for (sprite, visible) in self.sprites[index..].iter_mut().zip(was_visible) {
            if visible {
                sprite.show(&mut self.buffer);
            }
        }
        log::trace!("sprite {} raised to {}", index, self.sprites.len() - 1);
        Ok(())
    }

    /// Drawing view over a sprite's own pixels. Call [`refresh_sprite`]
    /// afterwards to push changes to a visible sprite onto the surface.
    ///
    /// [`refresh_sprite`]: Surface::refresh_sprite
    pub fn sprite_canvas(&mut self, index: usize) -> Result<Canvas<'_>> {
        let sprite = self
            .sprites
            .get_mut(index)
            .ok_or(RasterError::NoSuchSprite(index))?;
        Ok(Canvas::unclipped(&mut sprite.foreground))
    }

    /// Re-composite a visible sprite after its foreground changed
    pub fn refresh_sprite(&mut self, index: usize) -> Result<()> {
        self.check_sprite(index)?;
        if self.draw_mode.is_active() || !self.sprites[index].is_visible() {
            return Ok(());
        }
        self.restack(index, |sprite, parent| {
            sprite.hide(parent);
            sprite.show(parent);
        });
        Ok(())
    }

    /// Move a sprite to another surface without copying its pixels.
    ///
    /// Both surfaces leave draw mode for the move and return to their
    /// previous modes afterwards. The sprite keeps its visibility and
    /// lands on top of the target's stack. Returns its new index.
    pub fn transfer_sprite(&mut self, index: usize, target: &mut Surface) -> Result<usize> {
        self.check_sprite(index)?;
        self.draw_mode.ensure_unlocked("cannot transfer a sprite while locked")?;
        target
            .draw_mode
            .ensure_unlocked("cannot transfer a sprite onto a locked surface")?;

        let source_mode = self.draw_mode.mode();
        let target_mode = target.draw_mode.mode();
        self.exit_draw_mode()?;
        target.exit_draw_mode()?;

        let visible = self.sprites[index].is_visible();
        let mut sprite = self.remove_sprite(index)?;
        let new_index = target.sprites.len();
        sprite.index = new_index;
        target.sprites.push(sprite);
        if visible {
            target.set_sprite_visible(new_index, true)?;
        }
        log::debug!("sprite {} transferred, now {} on target", index, new_index);

        if source_mode == DrawMode::Active {
            self.enter_draw_mode()?;
        }
        if target_mode == DrawMode::Active {
            target.enter_draw_mode()?;
        }
        Ok(new_index)
    }

    /// Apply `f` to sprite `index` with every visible sprite above it
    /// lifted, so their captured backgrounds stay correct
    fn restack(&mut self, index: usize, f: impl FnOnce(&mut Sprite, &mut PixelBuffer)) {
        let mut lifted = Vec::new();
        for i in (index + 1..self.sprites.len()).rev() {
            if self.sprites[i].is_visible() {
                self.sprites[i].hide(&mut self.buffer);
                lifted.push(i);
            }
        }
        f(&mut self.sprites[index], &mut self.buffer);
        for &i in lifted.iter().rev() {
            self.sprites[i].show(&mut self.buffer);
        }
    }

    fn reindex(&mut self) {
        for (i, sprite) in self.sprites.iter_mut().enumerate() {
            sprite.index = i;
        }
    }
}
