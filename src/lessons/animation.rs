//! Time-based animation: a tweened, spinning cube and a camera circling it.

use glam::Vec3;

use crate::{
    assets::AssetLoader,
    lessons::{Lesson, LessonSwitch, hex, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{Geometry, Material, NodeId, NodeKind, PerspectiveCamera, Scene},
    timing::{Clock, Timeline},
};

pub struct Animation {
    scene: Scene,
    camera: PerspectiveCamera,
    cube: NodeId,
    cube_x: Timeline,
    clock: Clock,
}

/// Camera position at `time`: a unit circle in the XY plane, three units back.
pub fn orbit_position(time: f32) -> Vec3 {
    Vec3::new(time.cos(), time.sin(), 3.0)
}

impl Animation {
    pub fn new(viewport: (u32, u32)) -> Self {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0, 1, 1, 1));
        let material = scene.add_material(Material::basic(hex(0xff0000)));
        let cube = scene.add_mesh(None, "cube", geometry, material);
        scene.add(None, "axes", NodeKind::AxesHelper { size: 3.0 });

        Self {
            scene,
            camera: lesson_camera(viewport, orbit_position(0.0)),
            cube,
            cube_x: Timeline::new()
                .then_to(0.0, 2.0, 1.0, 1.0)
                .then_to(0.0, 0.0, 2.0, 1.0),
            clock: Clock::new(),
        }
    }

    pub fn boxed(_: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(viewport)))
    }

    /// Poses the scene at `time`. The spin advances by `delta` so it keeps the same speed at any
    /// frame rate.
    fn animate(&mut self, time: f32, delta: f32) {
        let cube = self.scene.transform_mut(self.cube);
        cube.position.x = self.cube_x.sample(0.0, time);
        cube.rotate_y(delta);
        self.camera.position = orbit_position(time);
        self.camera.target = self.scene.world_position(self.cube);
    }
}

impl Lesson for Animation {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        self.clock.tick(ctx.delta_time);
        self.animate(self.clock.elapsed(), self.clock.delta());
        LessonSwitch::None
    }

    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        renderer.render(&mut self.scene, &self.camera)
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }
}
