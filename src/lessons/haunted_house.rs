//! A foggy graveyard around a small house, lit by the moon, a door lamp and three roaming ghosts.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::{
    abs::{Texture, TextureHandle, TextureOptions},
    assets::{AssetLoader, Fallback},
    debug::{ControlId, Panel, Slider},
    lessons::{Lesson, LessonSwitch, hex, lesson_camera},
    other::UpdateContext,
    render::Renderer,
    scene::{
        DirectionalShadow, Fog, Geometry, Light, Maps, Material, NodeId, OrbitControls,
        PerspectiveCamera, Scene, ShadowMapType, Transform,
    },
    timing::Clock,
};

const FOG_COLOR: u32 = 0x262837;
const GRAVE_COUNT: usize = 30;
const WALL_SIZE: Vec3 = Vec3::new(4.0, 2.5, 4.0);
const ROOF_RADIUS: f32 = 3.5;
const ROOF_HEIGHT: f32 = 1.0;
const DOOR_SIZE: Vec2 = Vec2::new(2.0, 2.2);

/// Positions of the three ghost lights at `time` seconds.
pub fn ghost_positions(time: f32) -> [Vec3; 3] {
    let angle = time * 0.5;
    let first = Vec3::new(angle.cos() * 4.0, (time * 3.0).sin(), angle.sin() * 4.0);

    let angle = -time * 0.32;
    let second = Vec3::new(
        angle.cos() * 5.0,
        (time * 4.0).sin() + (time * 2.5).sin(),
        angle.sin() * 5.0,
    );

    let angle = time * 0.18;
    let radius = 7.0 * (time * 0.32).sin();
    let third = Vec3::new(
        angle.cos() * radius,
        (time * 5.0).sin() * (time * 2.0).sin(),
        angle.sin() * radius,
    );

    [first, second, third]
}

/// Scatters `count` graves on a ring of radius `[3, 9)` around the house, each tilted by up to
/// half a radian around Y and then Z.
pub fn place_graves<R: Rng>(rng: &mut R, count: usize) -> Vec<Transform> {
    (0..count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let radius = 3.0 + rng.random::<f32>() * 6.0;
            let mut transform =
                Transform::from_position(Vec3::new(angle.sin() * radius, 0.4, angle.cos() * radius));
            transform.rotate_y(rng.random::<f32>() - 0.5);
            transform.rotate_z(rng.random::<f32>() - 0.5);
            transform
        })
        .collect()
}

/// Texture sets of the three textured surfaces.
#[derive(Clone, Copy, Debug, Default)]
struct HouseMaps {
    door: Maps,
    bricks: Maps,
    grass: Maps,
}

struct Handles {
    ambient: NodeId,
    moon: NodeId,
    ghosts: [NodeId; 3],
}

struct Controls {
    ambient: ControlId<Slider>,
    moon: ControlId<Slider>,
    x: ControlId<Slider>,
    y: ControlId<Slider>,
    z: ControlId<Slider>,
}

pub struct HauntedHouse {
    scene: Scene,
    camera: PerspectiveCamera,
    orbit: OrbitControls,
    panel: Panel,
    controls: Controls,
    handles: Handles,
    clock: Clock,
    _textures: Vec<Texture>,
}

fn build_scene<R: Rng>(maps: HouseMaps, rng: &mut R) -> (Scene, Handles) {
    let mut scene = Scene::new();
    let fog = hex(FOG_COLOR);
    scene.fog = Some(Fog {
        color: fog,
        near: 1.0,
        far: 15.0,
    });
    scene.background = fog;

    let house = scene.add_group(None, "house");

    let walls = scene.add_geometry(Geometry::cuboid(WALL_SIZE.x, WALL_SIZE.y, WALL_SIZE.z, 1, 1, 1));
    let material = scene.add_material(Material::standard(Vec3::ONE).with_maps(maps.bricks));
    let walls = scene.add_mesh(Some(house), "walls", walls, material);
    scene.transform_mut(walls).position.y = WALL_SIZE.y / 2.0;
    scene.set_shadows(walls, true, false);

    let roof = scene.add_geometry(Geometry::cone(ROOF_RADIUS, ROOF_HEIGHT, 4));
    let material = scene.add_material(Material::standard(hex(0xb35f45)));
    let roof = scene.add_mesh(Some(house), "roof", roof, material);
    let transform = scene.transform_mut(roof);
    transform.rotate_y(FRAC_PI_4);
    transform.position.y = WALL_SIZE.y + ROOF_HEIGHT / 2.0;

    let door = scene.add_geometry(Geometry::plane(DOOR_SIZE.x, DOOR_SIZE.y, 100, 100));
    let mut material = Material::standard(Vec3::ONE).with_maps(maps.door);
    material.transparent = true;
    material.displacement_scale = 0.1;
    let material = scene.add_material(material);
    let door = scene.add_mesh(Some(house), "door", door, material);
    scene.transform_mut(door).position = Vec3::new(
        0.0,
        DOOR_SIZE.y / 2.0 - 0.1,
        WALL_SIZE.z / 2.0 + 0.0001,
    );

    let bush = scene.add_geometry(Geometry::sphere(1.0, 16, 16));
    let material = scene.add_material(Material::standard(hex(0x89c854)));
    for (name, scale, position) in [
        ("bush", 0.5, Vec3::new(0.8, 0.2, 2.2)),
        ("small bush", 0.25, Vec3::new(1.4, 0.1, 2.1)),
    ] {
        let id = scene.add_mesh(Some(house), name, bush, material);
        let transform = scene.transform_mut(id);
        transform.scale = Vec3::splat(scale);
        transform.position = position;
        scene.set_shadows(id, true, false);
    }

    let door_light = scene.add_light(Some(house), "door light", Light::point(hex(0xff7d46), 1.0, 7.0));
    scene.transform_mut(door_light).position = Vec3::new(0.0, 2.2, 2.7);

    let graveyard = scene.add_group(None, "graveyard");
    let grave = scene.add_geometry(Geometry::cuboid(0.6, 0.8, 0.2, 1, 1, 1));
    let material = scene.add_material(Material::standard(hex(0xb2b6b1)));
    for transform in place_graves(rng, GRAVE_COUNT) {
        let id = scene.add_mesh(Some(graveyard), "grave", grave, material);
        *scene.transform_mut(id) = transform;
        scene.set_shadows(id, true, false);
    }

    let floor = scene.add_geometry(Geometry::plane(20.0, 20.0, 1, 1));
    let mut material = Material::standard(Vec3::ONE).with_maps(maps.grass);
    material.uv_transform.repeat = Vec2::splat(8.0);
    let material = scene.add_material(material);
    let floor = scene.add_mesh(None, "floor", floor, material);
    scene.transform_mut(floor).rotate_x(-FRAC_PI_2);
    scene.set_shadows(floor, false, true);

    let ambient = scene.add_light(None, "ambient", Light::ambient(hex(0xb9d5ff), 0.12));
    let moon = scene.add_light(
        None,
        "moon",
        Light::directional(Vec3::ONE, 0.5).with_shadow(DirectionalShadow::default()),
    );
    scene.transform_mut(moon).position = Vec3::new(4.0, 5.0, -2.0);

    let ghosts = [
        ("ghost 1", 0xff00ff),
        ("ghost 2", 0x00ffff),
        ("ghost 3", 0xffff00),
    ]
    .map(|(name, color)| scene.add_light(None, name, Light::point(hex(color), 2.0, 3.0)));

    (
        scene,
        Handles {
            ambient,
            moon,
            ghosts,
        },
    )
}

fn build_panel(scene: &Scene, handles: &Handles) -> (Panel, Controls) {
    let intensity = |id| scene.light(id).map_or(0.0, Light::intensity);
    let moon = scene.node(handles.moon).transform.position;

    let mut panel = Panel::new();
    let controls = Controls {
        ambient: panel.slider("ambient intensity", intensity(handles.ambient), 0.0, 1.0, 0.001),
        moon: panel.slider("moon intensity", intensity(handles.moon), 0.0, 1.0, 0.001),
        x: panel.slider("moon x", moon.x, -5.0, 5.0, 0.001),
        y: panel.slider("moon y", moon.y, -5.0, 5.0, 0.001),
        z: panel.slider("moon z", moon.z, -5.0, 5.0, 0.001),
    };
    (panel, controls)
}

fn animate(scene: &mut Scene, panel: &Panel, controls: &Controls, handles: &Handles, time: f32) {
    if let Some(light) = scene.light_mut(handles.ambient) {
        light.set_intensity(panel.value(controls.ambient));
    }
    if let Some(light) = scene.light_mut(handles.moon) {
        light.set_intensity(panel.value(controls.moon));
    }
    scene.transform_mut(handles.moon).position = Vec3::new(
        panel.value(controls.x),
        panel.value(controls.y),
        panel.value(controls.z),
    );
    for (ghost, position) in handles.ghosts.iter().zip(ghost_positions(time)) {
        scene.transform_mut(*ghost).position = position;
    }
}

/// Loads a texture into `textures` and returns its handle.
fn load(
    loader: &AssetLoader,
    textures: &mut Vec<Texture>,
    path: &str,
    options: TextureOptions,
    fallback: Fallback,
) -> Result<TextureHandle, String> {
    let texture = loader.texture(path, options, fallback)?;
    let handle = texture.handle();
    textures.push(texture);
    Ok(handle)
}

/// Loads the colour, ambient occlusion, normal and roughness maps stored under `dir`.
fn load_surface(
    loader: &AssetLoader,
    textures: &mut Vec<Texture>,
    dir: &str,
    tint: [u8; 3],
    options: TextureOptions,
) -> Result<Maps, String> {
    let white = Fallback::Solid([255; 4]);
    Ok(Maps {
        color: Some(load(
            loader,
            textures,
            &format!("{dir}/color.jpg"),
            options,
            Fallback::Noise {
                tint,
                low: 0.6,
                high: 1.0,
                frequency: 0.08,
                seed: 3,
            },
        )?),
        ambient_occlusion: Some(load(
            loader,
            textures,
            &format!("{dir}/ambientOcclusion.jpg"),
            options,
            white,
        )?),
        normal: Some(load(
            loader,
            textures,
            &format!("{dir}/normal.jpg"),
            options,
            Fallback::FlatNormal,
        )?),
        roughness: Some(load(
            loader,
            textures,
            &format!("{dir}/roughness.jpg"),
            options,
            white,
        )?),
        ..Maps::default()
    })
}

fn load_maps(loader: &AssetLoader, textures: &mut Vec<Texture>) -> Result<HouseMaps, String> {
    let options = TextureOptions::default();
    let mut door = load_surface(loader, textures, "textures/door", [150, 90, 50], options)?;
    door.alpha = Some(load(
        loader,
        textures,
        "textures/door/alpha.jpg",
        options,
        Fallback::Inset { margin: 0.1 },
    )?);
    door.displacement = Some(load(
        loader,
        textures,
        "textures/door/height.jpg",
        options,
        Fallback::Solid([0, 0, 0, 255]),
    )?);
    door.metalness = Some(load(
        loader,
        textures,
        "textures/door/metalness.jpg",
        options,
        Fallback::Solid([0, 0, 0, 255]),
    )?);

    Ok(HouseMaps {
        door,
        bricks: load_surface(loader, textures, "textures/bricks", [180, 90, 70], options)?,
        grass: load_surface(
            loader,
            textures,
            "textures/grass",
            [70, 140, 50],
            TextureOptions::repeat(),
        )?,
    })
}

impl HauntedHouse {
    pub fn new(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Self, String> {
        let mut textures = Vec::new();
        let maps = load_maps(loader, &mut textures)?;
        let (scene, handles) = build_scene(maps, &mut rand::rng());
        let (panel, controls) = build_panel(&scene, &handles);
        Ok(Self {
            scene,
            camera: lesson_camera(viewport, Vec3::new(4.0, 2.0, 5.0)),
            orbit: OrbitControls::new(Vec3::ZERO).with_damping(),
            panel,
            controls,
            handles,
            clock: Clock::new(),
            _textures: textures,
        })
    }

    pub fn boxed(loader: &AssetLoader, viewport: (u32, u32)) -> Result<Box<dyn Lesson>, String> {
        Ok(Box::new(Self::new(loader, viewport)?))
    }
}

impl Lesson for HauntedHouse {
    fn name(&self) -> &'static str {
        "haunted_house"
    }

    fn update(&mut self, ctx: &UpdateContext) -> LessonSwitch {
        self.panel.handle_keys(ctx.keyboard);
        self.clock.tick(ctx.delta_time);
        animate(
            &mut self.scene,
            &self.panel,
            &self.controls,
            &self.handles,
            self.clock.elapsed(),
        );
        self.orbit.handle_input(&self.camera, ctx);
        self.orbit.update(&mut self.camera);
        LessonSwitch::None
    }

    fn render(&mut self, renderer: &mut Renderer) -> Result<(), String> {
        renderer.shadow_type = ShadowMapType::PcfSoft;
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
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::scene::NodeKind;

    #[test]
    fn test_graves_stay_on_ring() {
        let graves = place_graves(&mut StdRng::seed_from_u64(42), 500);
        assert_eq!(graves.len(), 500);
        for grave in graves {
            let radius = Vec2::new(grave.position.x, grave.position.z).length();
            assert!((3.0 - 1e-4..9.0 + 1e-4).contains(&radius), "radius {radius}");
            assert_eq!(grave.position.y, 0.4);
            let (axis, angle) = grave.rotation.to_axis_angle();
            assert!(angle.abs() < 1.0, "tilt {angle} around {axis}");
        }
    }

    #[test]
    fn test_ghosts_at_time_zero() {
        let [first, second, third] = ghost_positions(0.0);
        assert_eq!(first, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(second, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(third, Vec3::ZERO);
    }

    #[test]
    fn test_ghost_paths() {
        for t in [0.7f32, 3.1, 12.5] {
            let [first, second, third] = ghost_positions(t);
            assert!((Vec2::new(first.x, first.z).length() - 4.0).abs() < 1e-4);
            assert!((first.y - (3.0 * t).sin()).abs() < 1e-6);
            assert!((Vec2::new(second.x, second.z).length() - 5.0).abs() < 1e-4);
            let radius = (7.0 * (0.32 * t).sin()).abs();
            assert!((Vec2::new(third.x, third.z).length() - radius).abs() < 1e-4);
            assert!(third.y.abs() <= 1.0);
        }
    }

    #[test]
    fn test_scene_layout() {
        let (scene, handles) = build_scene(HouseMaps::default(), &mut StdRng::seed_from_u64(1));
        assert_eq!(scene.background, hex(FOG_COLOR));
        assert_eq!(scene.world_position(handles.moon), Vec3::new(4.0, 5.0, -2.0));

        let mut graves = 0;
        let mut casters = 0;
        let mut door_position = None;
        scene.visit_visible(|_, node, world| {
            if let NodeKind::Mesh {
                cast_shadow,
                receive_shadow,
                ..
            } = node.kind
            {
                casters += cast_shadow as usize;
                match node.name.as_str() {
                    "grave" => graves += 1,
                    "floor" => assert!(receive_shadow),
                    "door" => door_position = Some(world.w_axis.truncate()),
                    _ => {}
                }
            }
        });
        assert_eq!(graves, GRAVE_COUNT);
        // Walls, two bushes and every grave.
        assert_eq!(casters, GRAVE_COUNT + 3);
        let door_position = door_position.unwrap();
        assert!((door_position - Vec3::new(0.0, 1.0, 2.0001)).length() < 1e-5);
    }

    #[test]
    fn test_animate_moves_ghosts_and_moon() {
        let (mut scene, handles) = build_scene(HouseMaps::default(), &mut StdRng::seed_from_u64(1));
        let (mut panel, controls) = build_panel(&scene, &handles);
        panel.set_value(controls.y, 3.0);
        animate(&mut scene, &panel, &controls, &handles, 2.0);

        let ambient = scene.light(handles.ambient).map_or(0.0, Light::intensity);
        assert!((ambient - 0.12).abs() < 1e-6);
        assert!((scene.world_position(handles.moon) - Vec3::new(4.0, 3.0, -2.0)).length() < 1e-5);
        for (ghost, expected) in handles.ghosts.iter().zip(ghost_positions(2.0)) {
            assert_eq!(scene.world_position(*ghost), expected);
        }
    }
}
