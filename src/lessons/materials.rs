//! One material shared by a sphere, a plane and a torus, switchable between shading models.

use glam::{EulerRot, Vec3};

use crate::{
    abs::{CubeTexture, Texture, TextureOptions},
    assets::{AssetLoader, Fallback},
    debug::{Choice, ControlId, Panel, Slider, Toggle},
    lessons::{Lesson, LessonSwitch, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{
        Geometry, Light, Maps, Material, MaterialId, NodeId, NodeKind, OrbitControls,
        PerspectiveCamera, Scene, Shading,
    },
    timing::Clock,
};

struct Controls {
    metalness: ControlId<Slider>,
    roughness: ControlId<Slider>,
    ao_intensity: ControlId<Slider>,
    displacement_scale: ControlId<Slider>,
    shading: ControlId<Choice>,
    rotate: ControlId<Toggle>,
}

pub struct Materials {
    scene: Scene,
    camera: PerspectiveCamera,
    orbit: OrbitControls,
    panel: Panel,
    controls: Controls,
    material: MaterialId,
    meshes: [NodeId; 3],
    clock: Clock,
    _textures: (Texture, Texture, CubeTexture),
}

/// Builds the three meshes around one material using `maps`.
fn build_scene(maps: Maps) -> (Scene, MaterialId, [NodeId; 3]) {
    let mut scene = Scene::new();
    let mut material = Material::standard(Vec3::ONE).with_maps(maps);
    material.metalness = 0.7;
    material.roughness = 0.2;
    let material = scene.add_material(material);

    let sphere = scene.add_geometry(Geometry::sphere(0.5, 64, 64));
    let plane = scene.add_geometry(Geometry::plane(1.0, 1.0, 100, 100));
    let torus = scene.add_geometry(Geometry::torus(0.3, 0.2, 16, 32));
    let meshes = [
        scene.add_mesh(None, "sphere", sphere, material),
        scene.add_mesh(None, "plane", plane, material),
        scene.add_mesh(None, "torus", torus, material),
    ];
    scene.transform_mut(meshes[0]).position.x = -1.5;
    scene.transform_mut(meshes[2]).position.x = 1.5;

    scene.add_light(None, "ambient", Light::ambient(Vec3::ONE, 0.5));
    let point = scene.add_light(None, "point", Light::point(Vec3::ONE, 0.5, 0.0));
    scene.transform_mut(point).position = Vec3::new(2.0, 3.0, 4.0);
    scene.add(None, "axes", NodeKind::AxesHelper { size: 3.0 });

    (scene, material, meshes)
}

fn build_panel() -> (Panel, Controls) {
    let mut panel = Panel::new();
    let shading_names = Shading::ALL.map(Shading::name);
    let standard = Shading::ALL
        .iter()
        .position(|&shading| shading == Shading::Standard)
        .unwrap_or_default();
    let controls = Controls {
        metalness: panel.slider("metalness", 0.7, 0.0, 1.0, 0.0001),
        roughness: panel.slider("roughness", 0.2, 0.0, 1.0, 0.0001),
        ao_intensity: panel.slider("ao intensity", 1.0, 0.0, 2.0, 0.0001),
        displacement_scale: panel.slider("displacement scale", 1.0, 0.0, 1.0, 0.0001),
        shading: panel.choice("shading", &shading_names, standard),
        rotate: panel.toggle("rotate", true),
    };
    (panel, controls)
}

impl Materials {
    pub fn new(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Self, String> {
        let matcap = loader.texture(
            "textures/matcaps/1.png",
            TextureOptions::default(),
            Fallback::Noise {
                tint: [200, 190, 180],
                low: 0.4,
                high: 1.0,
                frequency: 0.02,
                seed: 1,
            },
        )?;
        let gradient = loader.texture(
            "textures/gradients/3.jpg",
            TextureOptions::nearest(),
            Fallback::Checker {
                a: [80, 80, 80, 255],
                b: [255, 255, 255, 255],
                cells: 2,
            },
        )?;
        let environment = loader.cube_texture("textures/environmentMaps/0", "jpg")?;

        let (scene, material, meshes) = build_scene(Maps {
            matcap: Some(matcap.handle()),
            gradient: Some(gradient.handle()),
            environment: Some(environment.handle()),
            ..Maps::default()
        });
        let (panel, controls) = build_panel();

        Ok(Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(0.0, 0.0, 3.0)),
            orbit: OrbitControls::new(Vec3::ZERO).with_damping(),
            panel,
            controls,
            material,
            meshes,
            clock: Clock::new(),
            _textures: (matcap, gradient, environment),
        })
    }

    pub fn boxed(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(loader, viewport)?))
    }
}

/// Copies panel values onto the shared material and spins the meshes while rotation is on.
fn apply_panel(
    scene: &mut Scene,
    panel: &Panel,
    controls: &Controls,
    material: MaterialId,
    meshes: &[NodeId],
    time: f32,
) {
    let material = scene.material_mut(material);
    material.metalness = panel.value(controls.metalness);
    material.roughness = panel.value(controls.roughness);
    material.ao_intensity = panel.value(controls.ao_intensity);
    material.displacement_scale = panel.value(controls.displacement_scale);
    material.shading = Shading::ALL[panel.selected(controls.shading)];

    if panel.enabled(controls.rotate) {
        for &mesh in meshes {
            scene
                .transform_mut(mesh)
                .set_euler(EulerRot::XYZ, 0.15 * time, 0.1 * time, 0.0);
        }
    }
}

impl Lesson for Materials {
    fn name(&self) -> &'static str {
        "materials"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        self.panel.handle_keys(ctx.keyboard);
        self.clock.tick(ctx.delta_time);
        apply_panel(
            &mut self.scene,
            &self.panel,
            &self.controls,
            self.material,
            &self.meshes,
            self.clock.elapsed(),
        );
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
    use glam::Quat;

    use super::*;

    #[test]
    fn test_meshes_share_one_material() {
        let (scene, material, meshes) = build_scene(Maps::default());
        for mesh in meshes {
            let NodeKind::Mesh { material: used, .. } = scene.node(mesh).kind else {
                panic!("{} is not a mesh", scene.node(mesh).name);
            };
            assert_eq!(used, material);
        }
        assert_eq!(scene.node(meshes[0]).transform.position.x, -1.5);
        assert_eq!(scene.node(meshes[2]).transform.position.x, 1.5);
        let material = scene.material(material);
        assert_eq!(material.shading, Shading::Standard);
        assert_eq!((material.metalness, material.roughness), (0.7, 0.2));
    }

    #[test]
    fn test_panel_switches_shading_model() {
        let (mut scene, material, meshes) = build_scene(Maps::default());
        let (mut panel, controls) = build_panel();
        for _ in 0..4 {
            panel.focus_next();
        }
        panel.step_focused(1);
        apply_panel(&mut scene, &panel, &controls, material, &meshes, 0.0);
        assert_eq!(scene.material(material).shading, Shading::Basic);
        panel.step_focused(-2);
        apply_panel(&mut scene, &panel, &controls, material, &meshes, 0.0);
        assert_eq!(scene.material(material).shading, Shading::Toon);
    }

    #[test]
    fn test_rotation_follows_time_until_disabled() {
        let (mut scene, material, meshes) = build_scene(Maps::default());
        let (mut panel, controls) = build_panel();
        apply_panel(&mut scene, &panel, &controls, material, &meshes, 10.0);
        let expected = Quat::from_euler(EulerRot::XYZ, 1.5, 1.0, 0.0);
        assert!(scene.node(meshes[1]).transform.rotation.abs_diff_eq(expected, 1e-5));

        for _ in 0..5 {
            panel.focus_next();
        }
        panel.activate_focused();
        apply_panel(&mut scene, &panel, &controls, material, &meshes, 20.0);
        assert!(scene.node(meshes[1]).transform.rotation.abs_diff_eq(expected, 1e-5));
    }
}
