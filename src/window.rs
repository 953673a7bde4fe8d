//! SDL2 window and input for the interactive viewer.
//!
//! Only presents a finished ARGB8888 frame and translates SDL events into
//! [`WindowEvent`]s; all scene state stays in [`crate::engine::Engine`].

use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Mod};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::shape::ShapeId;

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Quit,
    Resize(u32, u32),
    /// Number keys 1-8 pick catalog shapes 0-7.
    SelectShape(ShapeId),
    ToggleAnimation,
    ToggleMoving,
    ToggleTwoSided,
    SaveFrame,
}

impl WindowEvent {
    fn from_key(keycode: Keycode, keymod: Mod) -> Option<Self> {
        let ctrl = keymod.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD);
        let event = match keycode {
            Keycode::Escape => WindowEvent::Quit,
            Keycode::S if ctrl => WindowEvent::SaveFrame,
            Keycode::A => WindowEvent::ToggleAnimation,
            Keycode::M => WindowEvent::ToggleMoving,
            Keycode::T => WindowEvent::ToggleTwoSided,
            Keycode::Num1 => WindowEvent::SelectShape(ShapeId::Teardrop),
            Keycode::Num2 => WindowEvent::SelectShape(ShapeId::Torch),
            Keycode::Num3 => WindowEvent::SelectShape(ShapeId::Tripod),
            Keycode::Num4 => WindowEvent::SelectShape(ShapeId::Rainbow),
            Keycode::Num5 => WindowEvent::SelectShape(ShapeId::Cavity),
            Keycode::Num6 => WindowEvent::SelectShape(ShapeId::Camel),
            Keycode::Num7 => WindowEvent::SelectShape(ShapeId::Quad),
            Keycode::Num8 => WindowEvent::SelectShape(ShapeId::Char),
            _ => return None,
        };
        Some(event)
    }
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Sleeps off the rest of the frame budget; returns milliseconds since
    /// the previous call.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let target = FRAME_TARGET_TIME as u64;
        let mut now = window.timer().ticks64();
        let elapsed = now - self.previous_frame_time;
        if elapsed < target {
            std::thread::sleep(std::time::Duration::from_millis(target - elapsed));
            now = window.timer().ticks64();
        }
        let delta = now - self.previous_frame_time;
        self.previous_frame_time = now;
        delta
    }
}

type TextureCreator = sdl2::render::TextureCreator<sdl2::video::WindowContext>;

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Declared before the creator so it is dropped first.
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<TextureCreator>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let texture = Self::streaming_texture(&texture_creator, width, height)?;
        let event_pump = sdl_context.event_pump()?;
        log::info!("opened {width}x{height} window \"{title}\"");

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    fn streaming_texture(
        creator: &TextureCreator,
        width: u32,
        height: u32,
    ) -> Result<sdl2::render::Texture<'static>, String> {
        // SAFETY: the creator is boxed inside the same Window and outlives
        // the texture, which is dropped before it.
        let creator: &'static TextureCreator = unsafe { &*(creator as *const _) };
        creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())
    }

    /// Drains the SDL queue. Several resizes in one batch collapse into the
    /// last one.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        let mut resize = None;
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(WindowEvent::Quit),
                Event::KeyDown {
                    keycode: Some(keycode),
                    keymod,
                    repeat: false,
                    ..
                } => events.extend(WindowEvent::from_key(keycode, keymod)),
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } if w > 0 && h > 0 => resize = Some(WindowEvent::Resize(w as u32, h as u32)),
                _ => {}
            }
        }
        events.extend(resize);
        events
    }

    /// Uploads an ARGB8888 frame of the window's size and shows it.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;
        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.texture = Self::streaming_texture(&self.texture_creator, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.canvas.window_mut().set_title(title) {
            log::warn!("cannot set window title: {e}");
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
