//! Object transforms: position, scale, Euler rotation order and groups.

use std::f32::consts::FRAC_PI_4;

use glam::{EulerRot, Vec3};

use crate::{
    assets::AssetLoader,
    lessons::{Lesson, LessonSwitch, hex, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{Geometry, Material, NodeKind, PerspectiveCamera, Scene},
};

pub struct Transforms {
    scene: Scene,
    camera: PerspectiveCamera,
}

impl Transforms {
    pub fn new(viewport: (u32, u32)) -> Self {
        let mut scene = Scene::new();
        let cube = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0, 1, 1, 1));

        let red = scene.add_material(Material::basic(hex(0xff0000)));
        let mesh = scene.add_mesh(None, "cube", cube, red);
        let transform = scene.transform_mut(mesh);
        transform.position = Vec3::new(0.7, -0.6, 1.0);
        transform.scale = Vec3::new(2.0, 0.5, 0.5);
        // Yaw first, then pitch.
        transform.set_euler(EulerRot::YXZ, FRAC_PI_4, FRAC_PI_4, 0.0);

        let group = scene.add_group(None, "group");
        scene.transform_mut(group).rotate_y(1.0);
        for (name, color, x) in [
            ("cyan cube", 0x00ffff, 0.0),
            ("blue cube", 0x0000ff, -2.0),
            ("green cube", 0x008000, 2.0),
        ] {
            let material = scene.add_material(Material::basic(hex(color)));
            let id = scene.add_mesh(Some(group), name, cube, material);
            scene.transform_mut(id).position.x = x;
        }

        scene.add(None, "axes", NodeKind::AxesHelper { size: 3.0 });

        Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(0.0, 0.0, 3.0)),
        }
    }

    pub fn boxed(_: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(viewport)))
    }
}

impl Lesson for Transforms {
    fn name(&self) -> &'static str {
        "transforms"
    }

    fn update(&mut self, _ctx: &UpdateContext) -> LessonSwitch {
        LessonSwitch::None
    }

    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        renderer.render(&mut self.scene, &self.camera)
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }
}
