//! The `Lesson` trait, the manager holding the active lesson, and the lesson registry.
//!
//! Every lesson builds its own scene and camera from scratch and owns all of its GPU resources,
//! so switching lessons simply drops the old one.

use glam::Vec3;
use sdl2::keyboard::Keycode;

use crate::{
    assets::AssetLoader,
    debug::Panel,
    other::{KeyboardState, UpdateContext},
    render::Renderer,
    scene::PerspectiveCamera,
};

pub mod animation;
pub mod cameras;
pub mod debug;
pub mod geometries;
pub mod haunted_house;
pub mod materials;
pub mod particles;
pub mod shadows;
pub mod textures;
pub mod transforms;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonSwitch {
    None,
    /// Replace the active lesson with the lesson at this index in [`LESSONS`].
    Goto(usize),
    Quit,
}

/// Global shortcuts: `Escape` quits and the number keys pick a lesson.
pub fn navigation(keyboard: &KeyboardState) -> LessonSwitch {
    if keyboard.pressed.contains(&Keycode::Escape) {
        return LessonSwitch::Quit;
    }
    match keyboard.pressed.iter().find_map(|&key| index_for_key(key)) {
        Some(index) => LessonSwitch::Goto(index),
        None => LessonSwitch::None,
    }
}

/// The common interface of all lessons.
pub trait Lesson {
    fn name(&self) -> &'static str;

    /// Handles a raw window event.
    fn handle_event(&mut self, _event: &sdl2::event::Event) {}

    /// Advances the lesson by one frame.
    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch;

    /// Draws the lesson.
    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String>;

    /// The camera the lesson renders through, so the shell can keep its aspect ratio in sync.
    fn camera_mut(&mut self) -> &mut PerspectiveCamera;

    fn resize(&mut self, width: u32, height: u32) {
        self.camera_mut().resize(width, height);
    }

    fn panel(&self) -> Option<&Panel> {
        None
    }
}

/// Builds a lesson for a viewport of the given size.
pub type Constructor = fn(&AssetLoader, (u32, u32)) -> Result<Box<dyn Lesson>, String>;

/// All lessons in keyboard order: keys `1` to `9` pick the first nine, `0` the tenth.
pub const LESSONS: [(&str, Constructor); 10] = [
    ("transforms", transforms::Transforms::boxed),
    ("animation", animation::Animation::boxed),
    ("cameras", cameras::Cameras::boxed),
    ("geometries", geometries::Geometries::boxed),
    ("debug", debug::DebugLesson::boxed),
    ("textures", textures::Textures::boxed),
    ("materials", materials::Materials::boxed),
    ("shadows", shadows::Shadows::boxed),
    ("haunted_house", haunted_house::HauntedHouse::boxed),
    ("particles", particles::Particles::boxed),
];

pub fn index_of(name: &str) -> Option<usize> {
    LESSONS.iter().position(|(lesson, _)| *lesson == name)
}

/// Lesson index selected by a number key.
pub fn index_for_key(key: Keycode) -> Option<usize> {
    match key {
        Keycode::Num1 => Some(0),
        Keycode::Num2 => Some(1),
        Keycode::Num3 => Some(2),
        Keycode::Num4 => Some(3),
        Keycode::Num5 => Some(4),
        Keycode::Num6 => Some(5),
        Keycode::Num7 => Some(6),
        Keycode::Num8 => Some(7),
        Keycode::Num9 => Some(8),
        Keycode::Num0 => Some(9),
        _ => None,
    }
}

/// Camera shared by all lessons: 75° vertical field of view, clipping at 0.1 and 100.
pub fn lesson_camera(viewport: (u32, u32), position: Vec3) -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0)
        .at(position)
        .looking_at(Vec3::ZERO);
    camera.resize(viewport.0, viewport.1);
    camera
}

/// Converts a `0xRRGGBB` colour to linear floats.
pub fn hex(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

/// Holds the active lesson and swaps it on request.
pub struct LessonManager {
    lesson: Box<dyn Lesson>,
    index: usize,
    loader: AssetLoader,
    viewport: (u32, u32),
}

impl LessonManager {
    /// Starts with the lesson called `start`, or the first lesson if there is none by that name.
    pub fn new(loader: AssetLoader, start: &str, viewport: (u32, u32)) -> Result<Self, String> {
        let index = index_of(start).unwrap_or_else(|| {
            log::warn!("Unknown lesson {start:?}, starting with {:?}", LESSONS[0].0);
            0
        });
        let lesson = (LESSONS[index].1)(&loader, viewport)?;
        log::info!("Started lesson {}", lesson.name());
        Ok(Self {
            lesson,
            index,
            loader,
            viewport,
        })
    }

    /// Builds the lesson at `index` and makes it active. On failure the current lesson stays.
    pub fn switch_to(&mut self, index: usize) {
        let Some((name, constructor)) = LESSONS.get(index) else {
            return;
        };
        match constructor(&self.loader, self.viewport) {
            Ok(lesson) => {
                log::info!("Switched to lesson {name}");
                self.lesson = lesson;
                self.index = index;
            }
            Err(e) => log::error!("Could not start lesson {name}: {e}"),
        }
    }

    pub fn handle_event(&mut self, event: &sdl2::event::Event) {
        self.lesson.handle_event(event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.lesson.resize(width, height);
    }

    /// Updates the active lesson. Returns `false` once the application should quit.
    pub fn update(&mut self, ctx: &UpdateContext) -> bool {
        let switch = match navigation(ctx.keyboard) {
            LessonSwitch::None => self.lesson.update(ctx),
            global => global,
        };
        match switch {
            LessonSwitch::None => {}
            LessonSwitch::Goto(index) if index == self.index => {}
            LessonSwitch::Goto(index) => self.switch_to(index),
            LessonSwitch::Quit => return false,
        }
        true
    }

    pub fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        self.lesson.render(renderer)
    }

    /// Window title naming the lesson and, when a panel is shown, its focused control.
    pub fn title(&self) -> String {
        let mut title = format!("scenelab - {}", self.lesson.name());
        if let Some(line) = self.lesson.panel().and_then(Panel::focused_line) {
            title.push_str(" | ");
            title.push_str(&line);
        }
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_lesson_has_a_key() {
        let keys = [
            Keycode::Num1,
            Keycode::Num2,
            Keycode::Num3,
            Keycode::Num4,
            Keycode::Num5,
            Keycode::Num6,
            Keycode::Num7,
            Keycode::Num8,
            Keycode::Num9,
            Keycode::Num0,
        ];
        let indices: Vec<_> = keys.into_iter().filter_map(index_for_key).collect();
        assert_eq!(indices, (0..LESSONS.len()).collect::<Vec<_>>());
        assert_eq!(index_for_key(Keycode::A), None);
    }

    #[test]
    fn test_navigation_keys() {
        let mut keyboard = KeyboardState::default();
        assert_eq!(navigation(&keyboard), LessonSwitch::None);
        keyboard.pressed.insert(Keycode::Num0);
        assert_eq!(navigation(&keyboard), LessonSwitch::Goto(9));
        keyboard.pressed.insert(Keycode::Escape);
        assert_eq!(navigation(&keyboard), LessonSwitch::Quit);
    }

    #[test]
    fn test_lesson_names_are_unique() {
        for (i, (name, _)) in LESSONS.iter().enumerate() {
            assert_eq!(index_of(name), Some(i));
        }
        assert_eq!(index_of("transforms"), Some(0));
        assert_eq!(index_of("particles"), Some(9));
        assert_eq!(index_of("nope"), None);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(hex(0xff0000), Vec3::X);
        assert_eq!(hex(0x00ff00), Vec3::Y);
        let fog = hex(0x262837);
        assert!((fog.x - 38.0 / 255.0).abs() < 1e-6);
        assert!((fog.z - 55.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_camera_looks_at_origin() {
        let camera = lesson_camera((800, 600), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.fov, 75.0);
    }
}
