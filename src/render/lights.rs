//! Collects the lights of a scene into the fixed-size arrays the mesh shader consumes.

use glam::{Mat4, Vec3};

use crate::scene::{DirectionalShadow, Light, NodeKind, Scene};

pub const MAX_POINT_LIGHTS: usize = 4;
pub const MAX_DIRECTIONAL_LIGHTS: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLightData {
    /// Direction the light travels in.
    pub direction: Vec3,
    pub radiance: Vec3,
    /// Shadow settings and the light-space matrix, for shadow-casting lights.
    pub shadow: Option<(DirectionalShadow, Mat4)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLightData {
    pub position: Vec3,
    pub radiance: Vec3,
    pub distance: f32,
}

/// The lights affecting a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightSet {
    pub ambient: Vec3,
    pub directional: Vec<DirectionalLightData>,
    pub point: Vec<PointLightData>,
    /// Lights beyond the per-draw limits, which are left out.
    pub dropped: usize,
}

impl LightSet {
    pub fn gather(scene: &Scene) -> Self {
        let mut set = LightSet::default();
        scene.visit_visible(|_, node, world| {
            let NodeKind::Light(light) = &node.kind else {
                return;
            };
            let position = world.w_axis.truncate();
            match light {
                Light::Ambient { .. } => set.ambient += light.radiance(),
                Light::Directional { target, shadow, .. } => {
                    if set.directional.len() == MAX_DIRECTIONAL_LIGHTS {
                        set.dropped += 1;
                        return;
                    }
                    set.directional.push(DirectionalLightData {
                        direction: (*target - position).normalize_or(Vec3::NEG_Y),
                        radiance: light.radiance(),
                        shadow: shadow
                            .as_ref()
                            .map(|shadow| (*shadow, shadow.view_projection(position, *target))),
                    });
                }
                Light::Point { distance, .. } => {
                    if set.point.len() == MAX_POINT_LIGHTS {
                        set.dropped += 1;
                        return;
                    }
                    set.point.push(PointLightData {
                        position,
                        radiance: light.radiance(),
                        distance: *distance,
                    });
                }
            }
        });
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excess_lights_are_dropped() {
        let mut scene = Scene::new();
        for i in 0..6 {
            let id = scene.add_light(None, "point", Light::point(Vec3::ONE, 1.0, 0.0));
            scene.transform_mut(id).position = Vec3::splat(i as f32);
        }
        for _ in 0..3 {
            scene.add_light(None, "sun", Light::directional(Vec3::ONE, 1.0));
        }
        let set = LightSet::gather(&scene);
        assert_eq!(set.point.len(), MAX_POINT_LIGHTS);
        assert_eq!(set.directional.len(), MAX_DIRECTIONAL_LIGHTS);
        assert_eq!(set.dropped, 3);
        assert_eq!(set.point[3].position, Vec3::splat(3.0));
    }

    #[test]
    fn test_ambient_lights_add_up() {
        let mut scene = Scene::new();
        scene.add_light(None, "a", Light::ambient(Vec3::ONE, 0.5));
        scene.add_light(None, "b", Light::ambient(Vec3::new(1.0, 0.0, 0.0), 0.25));
        scene.add_light(None, "sun", Light::directional(Vec3::ONE, 1.0));
        assert_eq!(LightSet::gather(&scene).ambient, Vec3::new(0.75, 0.5, 0.5));
    }

    #[test]
    fn test_directional_light_points_at_target() {
        let mut scene = Scene::new();
        let group = scene.add_group(None, "group");
        scene.transform_mut(group).position = Vec3::new(0.0, 1.0, 0.0);
        let sun = scene.add_light(Some(group), "sun", Light::directional(Vec3::ONE, 0.5));
        scene.transform_mut(sun).position = Vec3::new(0.0, 4.0, 0.0);
        let set = LightSet::gather(&scene);
        assert_eq!(set.directional[0].direction, Vec3::NEG_Y);
        assert_eq!(set.directional[0].radiance, Vec3::splat(0.5));
        assert!(set.directional[0].shadow.is_none());
    }

    #[test]
    fn test_hidden_lights_are_ignored() {
        let mut scene = Scene::new();
        let ambient = scene.add_light(None, "ambient", Light::ambient(Vec3::ONE, 0.5));
        scene.add_light(None, "ghost", Light::point(Vec3::X, 2.0, 3.0));
        scene.node_mut(ambient).visible = false;
        let set = LightSet::gather(&scene);
        assert_eq!(set.ambient, Vec3::ZERO);
        assert_eq!(set.point[0].radiance, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(set.point[0].distance, 3.0);
    }
}
