//! A door texture on a cube, rotated around the middle of its UV square.

use std::f32::consts::FRAC_PI_4;

use glam::{Vec2, Vec3};

use crate::{
    abs::{Texture, TextureHandle, TextureOptions},
    assets::{AssetLoader, Fallback},
    lessons::{Lesson, LessonSwitch, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{
        Geometry, Maps, Material, MaterialId, OrbitControls, PerspectiveCamera, Scene, UvTransform,
    },
};

pub struct Textures {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    _color_map: Texture,
}

/// Builds the textured cube. Without a colour map the cube is plain white.
fn build_scene(color_map: Option<TextureHandle>) -> (Scene, MaterialId) {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0, 2, 2, 2));
    let mut material = Material::basic(Vec3::ONE).with_maps(Maps {
        color: color_map,
        ..Maps::default()
    });
    material.uv_transform = UvTransform {
        rotation: FRAC_PI_4,
        center: Vec2::splat(0.5),
        ..UvTransform::default()
    };
    let material = scene.add_material(material);
    scene.add_mesh(None, "cube", geometry, material);
    (scene, material)
}

impl Textures {
    pub fn new(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Self, String> {
        let color_map = loader.texture(
            "textures/door/color.jpg",
            TextureOptions::nearest(),
            Fallback::Checker {
                a: [150, 90, 50, 255],
                b: [90, 50, 30, 255],
                cells: 8,
            },
        )?;
        let (scene, _) = build_scene(Some(color_map.handle()));
        Ok(Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(0.0, 0.0, 3.0)),
            controls: OrbitControls::new(Vec3::ZERO).with_damping(),
            _color_map: color_map,
        })
    }

    pub fn boxed(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(loader, viewport)?))
    }
}

impl Lesson for Textures {
    fn name(&self) -> &'static str {
        "textures"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_rotation_pivots_on_centre() {
        let (scene, material) = build_scene(None);
        let matrix = scene.material(material).uv_transform.matrix();
        let centre = matrix.transform_point2(Vec2::splat(0.5));
        assert!((centre - Vec2::splat(0.5)).length() < 1e-5);
        let corner = matrix.transform_point2(Vec2::ZERO);
        assert!(((corner - Vec2::splat(0.5)).length() - 0.5f32.sqrt()).abs() < 1e-5);
        assert!((corner - Vec2::ZERO).length() > 0.1);
    }

    #[test]
    fn test_cube_has_two_segments_per_side() {
        let (scene, _) = build_scene(None);
        let mut triangles = 0;
        scene.visit_visible(|_, node, _| {
            if let crate::scene::NodeKind::Mesh { geometry, .. } = node.kind {
                triangles += scene.geometry(geometry).triangle_count();
            }
        });
        assert_eq!(triangles, 6 * 2 * 2 * 2);
    }
}
