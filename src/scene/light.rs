//! Light sources.

use glam::{Mat4, Vec3};

/// Filtering applied when sampling shadow maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowMapType {
    /// Single depth comparison, hard edges.
    Basic,
    /// 3x3 percentage-closer filtering.
    Pcf,
    /// 5x5 percentage-closer filtering scaled by the light's shadow radius.
    PcfSoft,
}

impl ShadowMapType {
    pub const ALL: [ShadowMapType; 3] = [
        ShadowMapType::Basic,
        ShadowMapType::Pcf,
        ShadowMapType::PcfSoft,
    ];

    pub fn shader_id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ShadowMapType::Basic => "basic",
            ShadowMapType::Pcf => "pcf",
            ShadowMapType::PcfSoft => "pcf soft",
        }
    }
}

/// Orthographic shadow camera and map settings of a directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalShadow {
    pub map_size: u32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    /// Blur radius in texels, used by [`ShadowMapType::PcfSoft`].
    pub radius: f32,
    pub bias: f32,
}

impl Default for DirectionalShadow {
    fn default() -> Self {
        Self {
            map_size: 512,
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
            near: 0.5,
            far: 500.0,
            radius: 1.0,
            bias: 0.0005,
        }
    }
}

impl DirectionalShadow {
    /// Projection of the shadow camera.
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh_gl(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }

    /// Combined view-projection of a shadow camera placed at `position` looking at `target`.
    pub fn view_projection(&self, position: Vec3, target: Vec3) -> Mat4 {
        let direction = (target - position).normalize_or(Vec3::NEG_Y);
        // Looking straight up or down needs a different up vector.
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        self.projection() * Mat4::look_at_rh(position, target, up)
    }

    /// The eight corners of the shadow camera frustum in world space.
    pub fn frustum_corners(&self, position: Vec3, target: Vec3) -> [Vec3; 8] {
        let inverse = self.view_projection(position, target).inverse();
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let ndc = Vec3::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            *corner = inverse.project_point3(ndc);
        }
        corners
    }
}

/// A light source. Positional lights take their position from the node they are attached to.
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    /// Uniform light from every direction.
    Ambient { color: Vec3, intensity: f32 },
    /// Parallel rays travelling from the node position towards `target`.
    Directional {
        color: Vec3,
        intensity: f32,
        target: Vec3,
        shadow: Option<DirectionalShadow>,
    },
    /// Light radiating from a point, fading to zero at `distance` (0 means infinite range).
    Point {
        color: Vec3,
        intensity: f32,
        distance: f32,
    },
}

impl Light {
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Light::Directional {
            color,
            intensity,
            target: Vec3::ZERO,
            shadow: None,
        }
    }

    pub fn point(color: Vec3, intensity: f32, distance: f32) -> Self {
        Light::Point {
            color,
            intensity,
            distance,
        }
    }

    /// Enables shadow casting on a directional light. Other lights are returned unchanged.
    pub fn with_shadow(mut self, settings: DirectionalShadow) -> Self {
        if let Light::Directional { shadow, .. } = &mut self {
            *shadow = Some(settings);
        }
        self
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. } => *intensity,
        }
    }

    pub fn set_intensity(&mut self, value: f32) {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. } => *intensity = value,
        }
    }

    /// Colour premultiplied by intensity, as consumed by the shader.
    pub fn radiance(&self) -> Vec3 {
        match self {
            Light::Ambient { color, intensity }
            | Light::Directional {
                color, intensity, ..
            }
            | Light::Point {
                color, intensity, ..
            } => *color * *intensity,
        }
    }
}
