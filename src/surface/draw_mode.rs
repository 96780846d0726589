//! Draw-mode gate: Idle / Active plus an orthogonal lock.
//!
//! The controller only keeps the state and the two callback queues; the
//! transitions that touch sprites and observers live on [`Surface`].
//!
//! [`Surface`]: super::Surface

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::{RasterError, Result};

use super::Surface;

/// Callback run on a draw-mode transition
pub type Deferred = Box<dyn FnOnce(&mut Surface) -> Result<()> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Idle,
    Active,
}

pub struct DrawModeController {
    active: bool,
    locked: bool,
    on_enter: VecDeque<Deferred>,
    on_exit: VecDeque<Deferred>,
    /// Sprite visibility as it was on entry, and as requested while Active
    visibility: Mutex<Vec<bool>>,
}

impl DrawModeController {
    pub fn new() -> Self {
        Self {
            active: false,
            locked: false,
            on_enter: VecDeque::new(),
            on_exit: VecDeque::new(),
            visibility: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn mode(&self) -> DrawMode {
        if self.active {
            DrawMode::Active
        } else {
            DrawMode::Idle
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Fail with `WrongMode` while a callback or scoped body is running
    pub fn ensure_unlocked(&self, what: &'static str) -> Result<()> {
        if self.locked {
            return Err(RasterError::WrongMode(what));
        }
        Ok(())
    }

    /// Fail with `WrongMode` unless Active
    pub fn ensure_active(&self, what: &'static str) -> Result<()> {
        if !self.active {
            return Err(RasterError::WrongMode(what));
        }
        Ok(())
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn queue(&mut self, target: DrawMode, cb: Deferred) {
        match target {
            DrawMode::Active => self.on_enter.push_back(cb),
            DrawMode::Idle => self.on_exit.push_back(cb),
        }
        log::trace!(
            "queued callback for {:?} ({} enter, {} exit pending)",
            target,
            self.on_enter.len(),
            self.on_exit.len()
        );
    }

    pub(crate) fn next(&mut self, target: DrawMode) -> Option<Deferred> {
        match target {
            DrawMode::Active => self.on_enter.pop_front(),
            DrawMode::Idle => self.on_exit.pop_front(),
        }
    }

    /// Callbacks waiting for the given transition
    pub fn pending(&self, target: DrawMode) -> usize {
        match target {
            DrawMode::Active => self.on_enter.len(),
            DrawMode::Idle => self.on_exit.len(),
        }
    }

    /// Run `f` on the visibility side array under its lock
    pub(crate) fn with_visibility<R>(&self, f: impl FnOnce(&mut Vec<bool>) -> R) -> R {
        let mut guard = self
            .visibility
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Default for DrawModeController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle_unlocked() {
        let c = DrawModeController::new();
        assert_eq!(c.mode(), DrawMode::Idle);
        assert!(c.ensure_unlocked("x").is_ok());
        assert!(c.ensure_active("draw").unwrap_err().is_wrong_mode());
    }

    #[test]
    fn test_queues_are_fifo_and_separate() {
        let mut c = DrawModeController::new();
        c.queue(DrawMode::Active, Box::new(|_| Ok(())));
        c.queue(DrawMode::Idle, Box::new(|_| Err(RasterError::WrongMode("second"))));
        c.queue(DrawMode::Active, Box::new(|_| Err(RasterError::WrongMode("third"))));
        assert_eq!(c.pending(DrawMode::Active), 2);
        assert_eq!(c.pending(DrawMode::Idle), 1);
        assert!(c.next(DrawMode::Active).is_some());
        assert_eq!(c.pending(DrawMode::Active), 1);
        assert!(c.next(DrawMode::Idle).is_some());
        assert!(c.next(DrawMode::Idle).is_none());
    }

    #[test]
    fn test_lock_rejects_transitions() {
        let mut c = DrawModeController::new();
        c.set_locked(true);
        assert!(matches!(c.ensure_unlocked("enter"), Err(RasterError::WrongMode("enter"))));
    }

    #[test]
    fn test_visibility_side_array() {
        let c = DrawModeController::new();
        c.with_visibility(|v| v.extend([true, false]));
        assert_eq!(c.with_visibility(|v| v.clone()), vec![true, false]);
    }
}
