//! Custom buffer geometry: a soup of random triangles.

use glam::Vec3;
use rand::Rng;

use crate::{
    assets::AssetLoader,
    lessons::{Lesson, LessonSwitch, hex, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{Geometry, Material, NodeKind, OrbitControls, PerspectiveCamera, Scene},
};

const TRIANGLE_COUNT: usize = 50;

/// `count` triangles with every coordinate uniform in `[-0.5, 0.5)`.
pub fn random_triangles<R: Rng>(rng: &mut R, count: usize) -> Vec<f32> {
    (0..count * 9).map(|_| rng.random::<f32>() - 0.5).collect()
}

pub struct Geometries {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
}

impl Geometries {
    pub fn new<R: Rng>(rng: &mut R, viewport: (u32, u32)) -> Self {
        let mut scene = Scene::new();
        let geometry =
            scene.add_geometry(Geometry::triangles(&random_triangles(rng, TRIANGLE_COUNT)));
        log::debug!(
            "Generated {} random triangles",
            scene.geometry(geometry).triangle_count()
        );
        let material =
            scene.add_material(Material::basic(hex(0xff0000)).with_wireframe(true));
        scene.add_mesh(None, "triangles", geometry, material);
        scene.add(None, "axes", NodeKind::AxesHelper { size: 3.0 });

        Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(0.0, 0.0, 3.0)),
            controls: OrbitControls::new(Vec3::ZERO).with_damping(),
        }
    }

    pub fn boxed(_: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(&mut rand::rng(), viewport)))
    }
}

impl Lesson for Geometries {
    fn name(&self) -> &'static str {
        "geometries"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        self.controls.handle_input(&self.camera, ctx);
        self.controls.update(&mut self.camera);
        LessonSwitch::None
    }

    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        renderer.render(&mut self.scene, &self.camera)
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }
}
