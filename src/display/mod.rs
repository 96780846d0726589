//! SDL2 window that shows a surface.
//!
//! The engine never talks to SDL itself. A [`RedrawFlag`] registered as a
//! surface observer records that new pixels are ready, and the main loop
//! pushes the buffer through [`Display::present`] when it sees the flag.

use std::sync::atomic::{AtomicBool, Ordering};

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::surface::{Observer, PixelBuffer};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    MouseMove { x: i32, y: i32 },
    MouseDown { x: i32, y: i32, button: MouseButtonKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonKind {
    Left,
    Right,
    Middle,
}

impl Display {
    /// Open a centered window with an accelerated canvas. The texture
    /// creator is returned separately so render targets can borrow it.
    pub fn open(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;
        log::info!("display opened at {}x{} (vsync {})", width, height, vsync);

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Upload `buffer` and flip. The buffer must match the target size.
    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) -> Result<(), String> {
        if buffer.dimensions() != (target.width, target.height) {
            return Err(format!(
                "buffer is {}x{}, render target is {}x{}",
                buffer.width(),
                buffer.height(),
                target.width,
                target.height
            ));
        }
        target
            .texture
            .update(None, &buffer.to_argb_bytes(), (buffer.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    /// Drain pending SDL events, keeping the ones the demo reacts to
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump.poll_iter().filter_map(translate_event).collect()
    }
}

fn translate_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::KeyDown { keycode, .. } => keycode.map(InputEvent::KeyDown),
        Event::MouseMotion { x, y, .. } => Some(InputEvent::MouseMove { x, y }),
        Event::MouseButtonDown { x, y, mouse_btn, .. } => {
            map_mouse_button(mouse_btn).map(|button| InputEvent::MouseDown { x, y, button })
        },
        _ => None,
    }
}

impl<'a> RenderTarget<'a> {
    /// Streaming ARGB8888 texture of the given size
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}

fn map_mouse_button(btn: MouseButton) -> Option<MouseButtonKind> {
    match btn {
        MouseButton::Left => Some(MouseButtonKind::Left),
        MouseButton::Right => Some(MouseButtonKind::Right),
        MouseButton::Middle => Some(MouseButtonKind::Middle),
        _ => None,
    }
}

// ============================================================================
// Redraw flag
// ============================================================================

/// Observer that latches a "needs redraw" bit for the render loop.
/// Starts raised so the first frame is always shown.
#[derive(Debug)]
pub struct RedrawFlag {
    dirty: AtomicBool,
}

impl Default for RedrawFlag {
    fn default() -> Self {
        Self {
            dirty: AtomicBool::new(true),
        }
    }
}

impl RedrawFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl Observer for RedrawFlag {
    fn update(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use std::sync::Arc;

    #[test]
    fn test_redraw_flag_latches_exit() {
        let mut surface = Surface::new(4, 4).unwrap();
        let flag = Arc::new(RedrawFlag::new());
        surface.observers().register(flag.clone());
        assert!(flag.take());
        assert!(!flag.take());

        surface.with_draw_mode(|_| Ok(())).unwrap();
        assert!(flag.take());
        assert!(!flag.take());
    }
}
