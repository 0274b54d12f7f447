//! A cloud of coloured sprites rippling along a sine wave.

use glam::Vec3;
use rand::Rng;

use crate::{
    abs::{Texture, TextureHandle, TextureOptions},
    assets::{AssetLoader, Fallback},
    lessons::{Lesson, LessonSwitch, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{
        Blending, NodeId, OrbitControls, ParticleField, PerspectiveCamera, PointsMaterial, Scene,
    },
    timing::Clock,
};

const PARTICLE_COUNT: usize = 100;
const SPREAD: f32 = 10.0;

pub struct Particles {
    scene: Scene,
    camera: PerspectiveCamera,
    orbit: OrbitControls,
    points: NodeId,
    clock: Clock,
    _sprite: Texture,
}

/// Interleaved positions scattered in a cube of edge [`SPREAD`] and random colours, `count`
/// particles each.
fn random_buffers<R: Rng>(rng: &mut R, count: usize) -> (Vec<f32>, Vec<f32>) {
    let positions = (0..count * 3)
        .map(|_| (rng.random::<f32>() - 0.5) * SPREAD)
        .collect();
    let colors = (0..count * 3).map(|_| rng.random::<f32>()).collect();
    (positions, colors)
}

fn build_scene<R: Rng>(
    rng: &mut R,
    sprite: Option<TextureHandle>,
) -> Result<(Scene, NodeId), String> {
    let mut scene = Scene::new();
    let material = PointsMaterial {
        size: 0.1,
        size_attenuation: true,
        alpha_map: sprite,
        transparent: true,
        depth_write: false,
        blending: Blending::Additive,
        vertex_colors: true,
        ..PointsMaterial::default()
    };
    let (positions, colors) = random_buffers(rng, PARTICLE_COUNT);
    let field = ParticleField::new(positions, colors)?;
    let points = scene.add_points(None, "particles", field, material);
    Ok((scene, points))
}

/// Moves every particle onto the wave for `time`.
fn animate(scene: &mut Scene, points: NodeId, time: f32) {
    if let Some(points) = scene.points_mut(points) {
        points.field.animate_wave(time);
    }
}

impl Particles {
    pub fn new(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Self, String> {
        let sprite = loader.texture(
            "textures/particles/2.png",
            TextureOptions::default(),
            Fallback::Sprite,
        )?;
        let (scene, points) = build_scene(&mut rand::rng(), Some(sprite.handle()))?;
        Ok(Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(0.0, 0.0, 3.0)),
            orbit: OrbitControls::new(Vec3::ZERO).with_damping(),
            points,
            clock: Clock::new(),
            _sprite: sprite,
        })
    }

    pub fn boxed(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(loader, viewport)?))
    }
}

impl Lesson for Particles {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        self.clock.tick(ctx.delta_time);
        animate(&mut self.scene, self.points, self.clock.elapsed());
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
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_field_fills_ten_unit_cube() {
        let (mut scene, points) = build_scene(&mut StdRng::seed_from_u64(9), None).unwrap();
        let points = scene.points_mut(points).unwrap();
        assert_eq!(points.field.len(), PARTICLE_COUNT);
        for vertex in points.field.vertices() {
            assert!(vertex.position.cmpge(Vec3::splat(-5.0)).all());
            assert!(vertex.position.cmplt(Vec3::splat(5.0)).all());
            assert!(vertex.color.cmpge(Vec3::ZERO).all() && vertex.color.cmplt(Vec3::ONE).all());
        }
        assert_eq!(points.material.blending, Blending::Additive);
        assert!(!points.material.depth_write);
    }

    #[test]
    fn test_every_frame_puts_particles_on_the_wave() {
        let (mut scene, points) = build_scene(&mut StdRng::seed_from_u64(9), None).unwrap();
        let before = scene.points_mut(points).unwrap().field.vertices();
        for time in [0.0, 0.016, 1.5, 100.0] {
            animate(&mut scene, points, time);
            let field = &scene.points_mut(points).unwrap().field;
            assert!(field.is_dirty());
            for (particle, start) in field.vertices().iter().zip(&before) {
                assert_eq!(particle.position.x, start.position.x);
                assert_eq!(particle.position.y, (time + particle.position.x).sin());
                assert_eq!(particle.position.z, start.position.z);
            }
        }
    }
}
