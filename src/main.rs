use glam::Vec2;
use sdl2::{event::Event, event::WindowEvent, mouse::MouseButton};

use crate::{
    abs::App,
    assets::AssetLoader,
    config::Config,
    lessons::LessonManager,
    other::{KeyboardState, MouseState, UpdateContext},
    render::Renderer,
};

mod abs;
mod assets;
mod config;
mod debug;
mod lessons;
mod logging;
mod other;
mod render;
mod scene;
mod timing;

fn main() {
    let (config, config_warning) = Config::load();
    logging::init(config.log_level(), config.log.file.as_deref());
    if let Some(warning) = config_warning {
        log::warn!("{warning}");
    }

    if let Err(e) = run(&config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), String> {
    let mut app = App::new(
        "scenelab",
        config.window.width,
        config.window.height,
        config.window.fullscreen,
        config.window.vsync,
    )?;

    let (width, height) = app.drawable_size();
    let mut renderer = Renderer::new(&app.gl, width, height)?;
    let loader = AssetLoader::new(&app.gl, config.asset_dir.clone());
    let mut manager = LessonManager::new(loader, &config.start_lesson, (width, height))?;

    let mut keyboard_state = KeyboardState::default();
    let mut mouse_state = MouseState::default();
    let mut last_frame_time = std::time::Instant::now();
    let mut title = String::new();

    'running: loop {
        let now = std::time::Instant::now();
        let delta_time = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        mouse_state.delta = Vec2::ZERO;
        mouse_state.scroll_delta = Vec2::ZERO;
        keyboard_state.pressed.clear();
        keyboard_state.released.clear();
        mouse_state.pressed.clear();
        mouse_state.released.clear();

        let mut resized = false;
        let mut toggle_fullscreen = false;
        for event in app.event_pump.poll_iter() {
            manager.handle_event(&event);
            match event {
                Event::Quit { .. } => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => resized = true,
                Event::MouseMotion {
                    x, y, xrel, yrel, ..
                } => {
                    mouse_state.position = Vec2::new(x as f32, y as f32);
                    mouse_state.delta += Vec2::new(xrel as f32, yrel as f32);
                }
                Event::MouseWheel { x, y, .. } => {
                    mouse_state.scroll_delta += Vec2::new(x as f32, y as f32);
                }
                Event::MouseButtonDown {
                    mouse_btn, clicks, ..
                } => {
                    mouse_state.down.insert(mouse_btn);
                    mouse_state.pressed.insert(mouse_btn);
                    if mouse_btn == MouseButton::Left && clicks == 2 {
                        toggle_fullscreen = true;
                    }
                }
                Event::MouseButtonUp { mouse_btn, .. } => {
                    mouse_state.down.remove(&mouse_btn);
                    mouse_state.released.insert(mouse_btn);
                }
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    keyboard_state.down.insert(keycode);
                    keyboard_state.pressed.insert(keycode);
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    keyboard_state.down.remove(&keycode);
                    keyboard_state.released.insert(keycode);
                }
                _ => {}
            }
        }

        if toggle_fullscreen {
            match app.toggle_fullscreen() {
                Ok(()) => resized = true,
                Err(e) => log::warn!("Could not toggle fullscreen: {e}"),
            }
        }
        if resized {
            let (width, height) = app.drawable_size();
            renderer.set_viewport(width, height);
            manager.resize(width, height);
        }

        let (window_width, window_height) = app.window.size();
        let update_ctx = UpdateContext::new(
            &keyboard_state,
            &mouse_state,
            delta_time,
            Vec2::new(window_width as f32, window_height as f32),
        );
        if !manager.update(&update_ctx) {
            break 'running;
        }

        if let Err(e) = manager.render(&mut renderer) {
            log::error!("Render failed: {e}");
        }

        let next_title = manager.title();
        if next_title != title {
            if let Err(e) = app.window.set_title(&next_title) {
                log::warn!("Could not set window title: {e}");
            }
            title = next_title;
        }

        app.window.gl_swap_window();
    }

    log::info!("Shutting down");
    Ok(())
}
