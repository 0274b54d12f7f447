//! Debug panel: live tweaks of a cube's position, visibility, wireframe and colour.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::{
    assets::AssetLoader,
    debug::{Button, ControlId, Hue, Panel, Slider, Toggle},
    lessons::{Lesson, LessonSwitch, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{
        Geometry, Material, MaterialId, NodeId, NodeKind, OrbitControls, PerspectiveCamera, Scene,
    },
    timing::{Clock, Tween},
};

struct Controls {
    elevation: ControlId<Slider>,
    x: ControlId<Slider>,
    visible: ControlId<Toggle>,
    wireframe: ControlId<Toggle>,
    color: ControlId<Hue>,
    spin: ControlId<Button>,
}

pub struct DebugLesson {
    scene: Scene,
    camera: PerspectiveCamera,
    orbit: OrbitControls,
    panel: Panel,
    controls: Controls,
    cube: NodeId,
    material: MaterialId,
    spin: Option<Tween>,
    /// Y rotation the cube rests at between spins.
    yaw: f32,
    clock: Clock,
}

impl DebugLesson {
    pub fn new(viewport: (u32, u32)) -> Self {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0, 2, 2, 2));
        let material = scene.add_material(Material::basic(Vec3::X));
        let cube = scene.add_mesh(None, "cube", geometry, material);
        scene.add(None, "axes", NodeKind::AxesHelper { size: 3.0 });

        let mut panel = Panel::new();
        let controls = Controls {
            elevation: panel.slider("elevation", 0.0, -3.0, 3.0, 0.01),
            x: panel.slider("x", 0.0, -3.0, 3.0, 0.01),
            visible: panel.toggle("visible", true),
            wireframe: panel.toggle("wireframe", false),
            color: panel.hue("color", 0.0),
            spin: panel.button("spin"),
        };

        Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(0.0, 0.0, 3.0)),
            orbit: OrbitControls::new(Vec3::ZERO).with_damping(),
            panel,
            controls,
            cube,
            material,
            spin: None,
            yaw: 0.0,
            clock: Clock::new(),
        }
    }

    pub fn boxed(_: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(viewport)))
    }

    /// Copies panel values onto the scene.
    fn apply_panel(&mut self, time: f32) {
        if self.panel.take_press(self.controls.spin) {
            let from = self.current_yaw(time);
            self.spin = Some(Tween::new(from, from + TAU, time, 0.0, 1.0));
        }
        let yaw = self.current_yaw(time);
        if let Some(spin) = self.spin
            && spin.finished(time)
        {
            self.yaw = spin.to;
            self.spin = None;
        }

        let node = self.scene.node_mut(self.cube);
        node.visible = self.panel.enabled(self.controls.visible);
        node.transform.position.y = self.panel.value(self.controls.elevation);
        node.transform.position.x = self.panel.value(self.controls.x);
        node.transform.rotation = Quat::from_rotation_y(yaw);

        let material = self.scene.material_mut(self.material);
        material.wireframe = self.panel.enabled(self.controls.wireframe);
        material.color = self.panel.color(self.controls.color);
    }

    fn current_yaw(&self, time: f32) -> f32 {
        self.spin.map_or(self.yaw, |spin| spin.sample(time))
    }
}

impl Lesson for DebugLesson {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        self.panel.handle_keys(ctx.keyboard);
        self.clock.tick(ctx.delta_time);
        self.apply_panel(self.clock.elapsed());
        self.orbit.handle_input(&self.camera, ctx);
        self.orbit.update(&mut self.camera);
        LessonSwitch::None
    }

    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        renderer.render(&mut self.scene, &self.camera)
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    fn panel(&self) -> Option<&Panel> {
        Some(&self.panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_moves_and_hides_cube() {
        let mut lesson = DebugLesson::new((800, 600));
        lesson.panel.set_value(lesson.controls.elevation, 1.234);
        lesson.panel.focus_next();
        lesson.panel.focus_next();
        lesson.panel.activate_focused();
        lesson.apply_panel(0.0);

        let node = lesson.scene.node(lesson.cube);
        assert!((node.transform.position.y - 1.23).abs() < 1e-5);
        assert!(!node.visible);
    }

    #[test]
    fn test_spin_turns_one_full_revolution() {
        let mut lesson = DebugLesson::new((800, 600));
        for _ in 0..5 {
            lesson.panel.focus_next();
        }
        lesson.panel.activate_focused();
        lesson.apply_panel(10.0);
        assert!(lesson.spin.is_some());

        lesson.apply_panel(10.5);
        let midway = lesson.current_yaw(10.5);
        assert!(midway > 0.0 && midway < TAU);

        lesson.apply_panel(11.5);
        assert!(lesson.spin.is_none());
        assert_eq!(lesson.yaw, TAU);
    }

    #[test]
    fn test_wireframe_and_colour_follow_panel() {
        let mut lesson = DebugLesson::new((800, 600));
        for _ in 0..3 {
            lesson.panel.focus_next();
        }
        lesson.panel.activate_focused();
        lesson.panel.focus_next();
        lesson.panel.step_focused(24);
        lesson.apply_panel(0.0);

        let material = lesson.scene.material(lesson.material);
        assert!(material.wireframe);
        assert_eq!(material.color, Vec3::Y);
    }
}
