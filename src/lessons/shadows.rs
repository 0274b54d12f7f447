//! A sphere casting a filtered shadow map onto a plane.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::{
    assets::AssetLoader,
    debug::{Choice, ControlId, Panel, Slider, Toggle},
    lessons::{Lesson, LessonSwitch, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{
        DirectionalShadow, Geometry, Light, Material, MaterialId, NodeId, NodeKind,
        OrbitControls, PerspectiveCamera, Scene, ShadowMapType,
    },
};

struct Controls {
    ambient: ControlId<Slider>,
    directional: ControlId<Slider>,
    x: ControlId<Slider>,
    y: ControlId<Slider>,
    z: ControlId<Slider>,
    metalness: ControlId<Slider>,
    roughness: ControlId<Slider>,
    helper: ControlId<Toggle>,
    shadow_type: ControlId<Choice>,
}

struct Handles {
    ambient: NodeId,
    sun: NodeId,
    helper: NodeId,
    material: MaterialId,
}

pub struct Shadows {
    scene: Scene,
    camera: PerspectiveCamera,
    orbit: OrbitControls,
    panel: Panel,
    controls: Controls,
    handles: Handles,
}

fn build_scene() -> (Scene, Handles) {
    let mut scene = Scene::new();
    let ambient = scene.add_light(None, "ambient", Light::ambient(Vec3::ONE, 0.5));
    let sun = scene.add_light(
        None,
        "directional",
        Light::directional(Vec3::ONE, 0.5).with_shadow(DirectionalShadow {
            map_size: 1024,
            left: -2.0,
            right: 2.0,
            top: 2.0,
            bottom: -2.0,
            near: 1.0,
            far: 6.0,
            radius: 10.0,
            ..DirectionalShadow::default()
        }),
    );
    scene.transform_mut(sun).position = Vec3::new(2.0, 2.0, -1.0);
    let helper = scene.add(None, "shadow camera", NodeKind::ShadowCameraHelper { light: sun });
    scene.node_mut(helper).visible = false;

    let mut material = Material::standard(Vec3::ONE);
    material.roughness = 0.7;
    let material = scene.add_material(material);

    let sphere = scene.add_geometry(Geometry::sphere(0.5, 32, 32));
    let sphere = scene.add_mesh(None, "sphere", sphere, material);
    scene.set_shadows(sphere, true, false);

    let plane = scene.add_geometry(Geometry::plane(5.0, 5.0, 1, 1));
    let plane = scene.add_mesh(None, "plane", plane, material);
    let transform = scene.transform_mut(plane);
    transform.rotate_x(-FRAC_PI_2);
    transform.position.y = -0.5;
    scene.set_shadows(plane, false, true);

    (
        scene,
        Handles {
            ambient,
            sun,
            helper,
            material,
        },
    )
}

/// Builds the panel with every slider starting at the scene's current value.
fn build_panel(scene: &Scene, handles: &Handles) -> (Panel, Controls) {
    let intensity = |id| scene.light(id).map_or(0.0, Light::intensity);
    let sun = scene.node(handles.sun).transform.position;
    let material = scene.material(handles.material);

    let mut panel = Panel::new();
    let controls = Controls {
        ambient: panel.slider("ambient intensity", intensity(handles.ambient), 0.0, 1.0, 0.001),
        directional: panel.slider("directional intensity", intensity(handles.sun), 0.0, 1.0, 0.001),
        x: panel.slider("light x", sun.x, -5.0, 5.0, 0.001),
        y: panel.slider("light y", sun.y, -5.0, 5.0, 0.001),
        z: panel.slider("light z", sun.z, -5.0, 5.0, 0.001),
        metalness: panel.slider("metalness", material.metalness, 0.0, 1.0, 0.001),
        roughness: panel.slider("roughness", material.roughness, 0.0, 1.0, 0.001),
        helper: panel.toggle("shadow camera helper", false),
        shadow_type: panel.choice(
            "shadow type",
            &ShadowMapType::ALL.map(ShadowMapType::name),
            1,
        ),
    };
    (panel, controls)
}

fn apply_panel(scene: &mut Scene, panel: &Panel, controls: &Controls, handles: &Handles) {
    if let Some(light) = scene.light_mut(handles.ambient) {
        light.set_intensity(panel.value(controls.ambient));
    }
    if let Some(light) = scene.light_mut(handles.sun) {
        light.set_intensity(panel.value(controls.directional));
    }
    scene.transform_mut(handles.sun).position = Vec3::new(
        panel.value(controls.x),
        panel.value(controls.y),
        panel.value(controls.z),
    );
    scene.node_mut(handles.helper).visible = panel.enabled(controls.helper);

    let material = scene.material_mut(handles.material);
    material.metalness = panel.value(controls.metalness);
    material.roughness = panel.value(controls.roughness);
}

impl Shadows {
    pub fn new(viewport: (u32, u32)) -> Self {
        let (scene, handles) = build_scene();
        let (panel, controls) = build_panel(&scene, &handles);
        Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(1.0, 1.0, 2.0)),
            orbit: OrbitControls::new(Vec3::ZERO).with_damping(),
            panel,
            controls,
            handles,
        }
    }

    pub fn boxed(_: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(viewport)))
    }
}

impl Lesson for Shadows {
    fn name(&self) -> &'static str {
        "shadows"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        self.panel.handle_keys(ctx.keyboard);
        apply_panel(&mut self.scene, &self.panel, &self.controls, &self.handles);
        self.orbit.handle_input(&self.camera, ctx);
        self.orbit.update(&mut self.camera);
        LessonSwitch::None
    }

    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        renderer.shadow_type = ShadowMapType::ALL[self.panel.selected(self.controls.shadow_type)];
        renderer.render(&mut self.scene, &self.camera)
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    fn panel(&self) -> Option<&Panel> {
        Some(&self.panel)
    }
}
