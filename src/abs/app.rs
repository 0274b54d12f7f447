//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use sdl2::video::{FullscreenType, SwapInterval};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a new [`App`] instance with the specified title, width, and height.
    /// The width and height options are ignored if `fullscreen` is set to `true`.
    pub fn new(
        title: &str,
        width: u32,
        height: u32,
        fullscreen: bool,
        vsync: bool,
    ) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video_subsystem = sdl.video()?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);
        let display_mode = video_subsystem.current_display_mode(0)?;
        let (width, height) = if fullscreen {
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (width, height)
        };
        let mut window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .allow_highdpi()
            .build()
            .map_err(|e| e.to_string())?;
        if fullscreen {
            window.set_fullscreen(FullscreenType::Desktop)?;
        }
        let gl_context = window.gl_create_context()?;
        window.gl_make_current(&gl_context)?;
        if vsync && let Err(e) = video_subsystem.gl_set_swap_interval(SwapInterval::VSync) {
            log::warn!("Could not enable vsync: {e}");
        }
        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump()?;
        let gl = Arc::new(gl);

        log::info!("Created {width}x{height} window with an OpenGL 3.3 core context");

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl,
            event_pump,
        })
    }

    /// Returns the size of the drawable area in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    /// Switches between desktop fullscreen and windowed mode.
    pub fn toggle_fullscreen(&mut self) -> Result<(), String> {
        let next = match self.window.fullscreen_state() {
            FullscreenType::Off => FullscreenType::Desktop,
            _ => FullscreenType::Off,
        };
        self.window.set_fullscreen(next)
    }
}
