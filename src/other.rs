use std::collections::HashSet;

use glam::Vec2;
use sdl2::{keyboard::Keycode, mouse::MouseButton};

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

impl KeyboardState {
    /// Whether either shift key is held.
    pub fn shift(&self) -> bool {
        self.down.contains(&Keycode::LShift) || self.down.contains(&Keycode::RShift)
    }
}

/// The current state of the mouse.
#[derive(Default)]
pub struct MouseState {
    pub position: Vec2,
    pub delta: Vec2,
    pub down: HashSet<MouseButton>,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
    pub scroll_delta: Vec2,
}

/// Context provided to lessons during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    pub delta_time: f32,
    /// Window size in logical pixels, the space mouse coordinates are reported in.
    pub viewport: Vec2,
}

impl<'a> UpdateContext<'a> {
    /// Creates a new `UpdateContext` from the given keyboard and mouse states and delta time.
    pub fn new(
        keyboard: &'a KeyboardState,
        mouse: &'a MouseState,
        delta_time: f32,
        viewport: Vec2,
    ) -> Self {
        Self {
            keyboard,
            mouse,
            delta_time,
            viewport,
        }
    }

    /// The cursor position normalised to `[-0.5, 0.5]`, with positive y pointing up.
    pub fn cursor(&self) -> Vec2 {
        normalized_cursor(self.mouse.position, self.viewport)
    }
}

/// Maps a pixel position inside a viewport to `[-0.5, 0.5]` on both axes.
///
/// Screen space grows downwards while world space grows upwards, so y is inverted. A degenerate
/// viewport yields the centre.
pub fn normalized_cursor(position: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        position.x / viewport.x - 0.5,
        -(position.y / viewport.y - 0.5),
    )
}
