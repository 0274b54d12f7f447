//! Surface descriptions for meshes and points.

use glam::{Mat3, Vec2, Vec3};

use crate::abs::{CubeTextureHandle, TextureHandle};

/// Lighting model used to shade a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Flat colour, unaffected by lights.
    Basic,
    /// Visualises view-space normals as colours.
    Normal,
    /// Looks up the colour in a matcap texture by view-space normal.
    Matcap,
    /// Greyscale by distance between the camera's near and far planes.
    Depth,
    Lambert,
    Phong,
    /// Diffuse lighting quantised through a gradient map.
    Toon,
    /// Metallic-roughness lighting with an optional environment map.
    Standard,
}

impl Shading {
    pub const ALL: [Shading; 8] = [
        Shading::Basic,
        Shading::Normal,
        Shading::Matcap,
        Shading::Depth,
        Shading::Lambert,
        Shading::Phong,
        Shading::Toon,
        Shading::Standard,
    ];

    /// Integer id consumed by the mesh shader.
    pub fn shader_id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Shading::Basic => "basic",
            Shading::Normal => "normal",
            Shading::Matcap => "matcap",
            Shading::Depth => "depth",
            Shading::Lambert => "lambert",
            Shading::Phong => "phong",
            Shading::Toon => "toon",
            Shading::Standard => "standard",
        }
    }

    /// Whether this model reads scene lights.
    pub fn is_lit(self) -> bool {
        matches!(
            self,
            Shading::Lambert | Shading::Phong | Shading::Toon | Shading::Standard
        )
    }
}

/// Which faces of a mesh are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Offset, repeat and rotation applied to the texture coordinates of every map on a material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    /// Rotation in radians around `center`.
    pub rotation: f32,
    pub center: Vec2,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
            center: Vec2::ZERO,
        }
    }
}

impl UvTransform {
    /// The homogeneous 2D matrix applied to `(u, v, 1)`.
    pub fn matrix(&self) -> Mat3 {
        let (s, c) = self.rotation.sin_cos();
        let Vec2 { x: sx, y: sy } = self.repeat;
        let Vec2 { x: cx, y: cy } = self.center;
        let Vec2 { x: tx, y: ty } = self.offset;
        Mat3::from_cols(
            Vec3::new(sx * c, -sy * s, 0.0),
            Vec3::new(sx * s, sy * c, 0.0),
            Vec3::new(
                -sx * (c * cx + s * cy) + cx + tx,
                -sy * (-s * cx + c * cy) + cy + ty,
                1.0,
            ),
        )
    }
}

/// Texture slots a material can sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Maps {
    pub color: Option<TextureHandle>,
    pub alpha: Option<TextureHandle>,
    pub ambient_occlusion: Option<TextureHandle>,
    pub displacement: Option<TextureHandle>,
    pub normal: Option<TextureHandle>,
    pub roughness: Option<TextureHandle>,
    pub metalness: Option<TextureHandle>,
    pub matcap: Option<TextureHandle>,
    pub gradient: Option<TextureHandle>,
    pub environment: Option<CubeTextureHandle>,
}

/// Surface parameters of a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub color: Vec3,
    pub opacity: f32,
    /// Transparent surfaces are blended and drawn after opaque ones, back to front.
    pub transparent: bool,
    pub side: Side,
    pub wireframe: bool,
    pub maps: Maps,
    pub uv_transform: UvTransform,
    pub roughness: f32,
    pub metalness: f32,
    pub shininess: f32,
    pub specular: Vec3,
    pub ao_intensity: f32,
    pub displacement_scale: f32,
    pub normal_scale: Vec2,
}

impl Material {
    fn with_shading(shading: Shading) -> Self {
        Self {
            shading,
            color: Vec3::ONE,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            wireframe: false,
            maps: Maps::default(),
            uv_transform: UvTransform::default(),
            roughness: 1.0,
            metalness: 0.0,
            shininess: 30.0,
            specular: Vec3::splat(0.067),
            ao_intensity: 1.0,
            displacement_scale: 1.0,
            normal_scale: Vec2::ONE,
        }
    }

    pub fn basic(color: Vec3) -> Self {
        Self {
            color,
            ..Self::with_shading(Shading::Basic)
        }
    }

    pub fn standard(color: Vec3) -> Self {
        Self {
            color,
            ..Self::with_shading(Shading::Standard)
        }
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_maps(mut self, maps: Maps) -> Self {
        self.maps = maps;
        self
    }

    /// Whether the material needs to be drawn in the blended pass.
    pub fn is_blended(&self) -> bool {
        self.transparent && (self.opacity < 1.0 || self.maps.alpha.is_some())
    }
}

/// How point sprites combine with what is already in the framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blending {
    Normal,
    Additive,
}

/// Surface parameters of a particle field.
#[derive(Clone, Debug, PartialEq)]
pub struct PointsMaterial {
    /// Point size in world units when attenuated, pixels otherwise.
    pub size: f32,
    pub size_attenuation: bool,
    pub color: Vec3,
    pub vertex_colors: bool,
    pub alpha_map: Option<TextureHandle>,
    pub transparent: bool,
    pub alpha_test: f32,
    pub depth_test: bool,
    pub depth_write: bool,
    pub blending: Blending,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 1.0,
            size_attenuation: true,
            color: Vec3::ONE,
            vertex_colors: false,
            alpha_map: None,
            transparent: false,
            alpha_test: 0.0,
            depth_test: true,
            depth_write: true,
            blending: Blending::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;

    #[test]
    fn test_default_uv_transform_is_identity() {
        assert_eq!(UvTransform::default().matrix(), Mat3::IDENTITY);
    }

    #[test]
    fn test_uv_rotation_keeps_center_fixed() {
        let transform = UvTransform {
            rotation: FRAC_PI_4,
            center: Vec2::splat(0.5),
            ..Default::default()
        };
        let center = transform.matrix() * Vec3::new(0.5, 0.5, 1.0);
        assert!((center.truncate() - Vec2::splat(0.5)).length() < 1e-6);
        let corner = transform.matrix() * Vec3::new(1.0, 0.5, 1.0);
        assert!(((corner.truncate() - Vec2::splat(0.5)).length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_uv_repeat_scales() {
        let transform = UvTransform {
            repeat: Vec2::splat(8.0),
            ..Default::default()
        };
        let uv = transform.matrix() * Vec3::new(1.0, 0.5, 1.0);
        assert_eq!(uv.truncate(), Vec2::new(8.0, 4.0));
    }

    #[test]
    fn test_blending_needs_transparency() {
        let mut material = Material::basic(Vec3::ONE);
        material.opacity = 0.5;
        assert!(!material.is_blended());
        material.transparent = true;
        assert!(material.is_blended());
    }

    #[test]
    fn test_lit_models() {
        let lit: Vec<_> = Shading::ALL.into_iter().filter(|s| s.is_lit()).collect();
        assert_eq!(
            lit,
            vec![Shading::Lambert, Shading::Phong, Shading::Toon, Shading::Standard]
        );
    }
}
