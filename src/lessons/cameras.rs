//! Cameras driven by the cursor, or by orbit controls after pressing `C`.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use sdl2::keyboard::Keycode;

use crate::{
    assets::AssetLoader,
    lessons::{Lesson, LessonSwitch, hex, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{Geometry, Material, NodeKind, OrbitControls, PerspectiveCamera, Scene},
};

pub struct Cameras {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    orbiting: bool,
}

/// Camera position for a normalised cursor: one full turn around the cube across the window
/// width, and up to 2.5 units of height across its height.
pub fn cursor_camera_position(cursor: Vec2) -> Vec3 {
    Vec3::new(
        (cursor.x * TAU).sin() * 3.0,
        cursor.y * 5.0,
        (cursor.x * TAU).cos() * 3.0,
    )
}

impl Cameras {
    pub fn new(viewport: (u32, u32)) -> Self {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0, 1, 1, 1));
        let material = scene.add_material(Material::basic(hex(0xff0000)));
        scene.add_mesh(None, "cube", geometry, material);
        scene.add(None, "axes", NodeKind::AxesHelper { size: 3.0 });

        Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(0.0, 0.0, 3.0)),
            controls: OrbitControls::new(Vec3::ZERO).with_damping(),
            orbiting: false,
        }
    }

    pub fn boxed(_: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(viewport)))
    }
}

impl Lesson for Cameras {
    fn name(&self) -> &'static str {
        "cameras"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        if ctx.keyboard.pressed.contains(&Keycode::C) {
            self.orbiting = !self.orbiting;
            log::info!(
                "Camera follows the {}",
                if self.orbiting { "orbit controls" } else { "cursor" }
            );
        }
        if self.orbiting {
            self.controls.handle_input(&self.camera, ctx);
            self.controls.update(&mut self.camera);
        } else {
            self.camera.position = cursor_camera_position(ctx.cursor());
            self.camera.target = Vec3::ZERO;
        }
        LessonSwitch::None
    }

    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        renderer.render(&mut self.scene, &self.camera)
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centred_cursor_looks_from_the_front() {
        let position = cursor_camera_position(Vec2::ZERO);
        assert!((position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_cursor_edges_go_behind_the_cube() {
        for x in [-0.5, 0.5] {
            let position = cursor_camera_position(Vec2::new(x, 0.5));
            assert!((position.z + 3.0).abs() < 1e-5);
            assert_eq!(position.y, 2.5);
        }
    }

    #[test]
    fn test_camera_stays_on_circle() {
        for i in 0..10 {
            let position = cursor_camera_position(Vec2::new(i as f32 / 10.0 - 0.5, 0.0));
            assert!((position.length() - 3.0).abs() < 1e-5);
        }
    }
}
