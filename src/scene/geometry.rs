//! CPU-side geometry and the primitive generators used by the lessons.
//!
//! Generators follow the usual layout conventions: planes lie in XY facing +Z, UV origin is the
//! bottom-left corner, and triangles wind counter-clockwise when seen from the outside.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use glow::HasContext;

use crate::abs::Vertex;

/// A vertex as uploaded for lit meshes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex for MeshVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<MeshVertex>() as i32;

            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);

            // Normal attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, size_of::<Vec3>() as i32);

            // UV attribute
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(
                2,
                2,
                glow::FLOAT,
                false,
                stride,
                (size_of::<Vec3>() * 2) as i32,
            );
        }
    }
}

/// An indexed triangle list.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Box centred on the origin, with each face subdivided into a grid.
    pub fn cuboid(
        width: f32,
        height: f32,
        depth: f32,
        width_segments: u32,
        height_segments: u32,
        depth_segments: u32,
    ) -> Self {
        let mut geometry = Self::default();
        let (ws, hs, ds) = (
            width_segments.max(1),
            height_segments.max(1),
            depth_segments.max(1),
        );

        // Each face is given as (u axis, v axis, normal) in world space; u x v == normal.
        let faces = [
            (Vec3::NEG_Z, Vec3::Y, Vec3::X, depth, height, width, ds, hs),
            (Vec3::Z, Vec3::Y, Vec3::NEG_X, depth, height, width, ds, hs),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y, width, depth, height, ws, ds),
            (Vec3::X, Vec3::Z, Vec3::NEG_Y, width, depth, height, ws, ds),
            (Vec3::X, Vec3::Y, Vec3::Z, width, height, depth, ws, hs),
            (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z, width, height, depth, ws, hs),
        ];
        for (u_axis, v_axis, normal, u_len, v_len, n_len, u_segs, v_segs) in faces {
            geometry.push_grid(
                normal * (n_len / 2.0),
                u_axis * u_len,
                v_axis * v_len,
                normal,
                u_segs,
                v_segs,
            );
        }
        geometry
    }

    /// Plane in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut geometry = Self::default();
        geometry.push_grid(
            Vec3::ZERO,
            Vec3::X * width,
            Vec3::Y * height,
            Vec3::Z,
            width_segments.max(1),
            height_segments.max(1),
        );
        geometry
    }

    /// Appends a `u_segs` x `v_segs` grid centred on `center` and spanning `u` and `v`.
    fn push_grid(&mut self, center: Vec3, u: Vec3, v: Vec3, normal: Vec3, u_segs: u32, v_segs: u32) {
        let base = self.vertices.len() as u32;
        for iy in 0..=v_segs {
            let fy = iy as f32 / v_segs as f32;
            for ix in 0..=u_segs {
                let fx = ix as f32 / u_segs as f32;
                self.vertices.push(MeshVertex {
                    position: center + u * (fx - 0.5) + v * (fy - 0.5),
                    normal,
                    uv: Vec2::new(fx, fy),
                });
            }
        }
        let row = u_segs + 1;
        for iy in 0..v_segs {
            for ix in 0..u_segs {
                let a = base + iy * row + ix;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                self.indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }

    /// UV sphere. Pole rows emit a single triangle per segment instead of a degenerate quad.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut geometry = Self::default();

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let theta = v * PI;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let phi = u * TAU;
                let normal = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                geometry.vertices.push(MeshVertex {
                    position: normal * radius,
                    normal,
                    uv: Vec2::new(u, 1.0 - v),
                });
            }
        }

        let row = ws + 1;
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs - 1 {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        geometry
    }

    /// Cone standing on the XZ plane, centred vertically on the origin, with a bottom cap.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        let rs = radial_segments.max(3);
        let mut geometry = Self::default();
        let half = height / 2.0;
        let slope = radius / height;

        // Side: a ring at the apex and a ring at the base, duplicated per segment so each
        // segment gets its own seam-free UVs.
        for iy in 0..=1u32 {
            let v = iy as f32;
            let ring_radius = v * radius;
            for ix in 0..=rs {
                let u = ix as f32 / rs as f32;
                let theta = u * TAU;
                let (sin, cos) = theta.sin_cos();
                geometry.vertices.push(MeshVertex {
                    position: Vec3::new(ring_radius * sin, half - v * height, ring_radius * cos),
                    normal: Vec3::new(sin, slope, cos).normalize(),
                    uv: Vec2::new(u, 1.0 - v),
                });
            }
        }
        let row = rs + 1;
        for ix in 0..rs {
            let apex = ix;
            let b = row + ix;
            let c = row + ix + 1;
            geometry.indices.extend_from_slice(&[apex, b, c]);
        }

        // Bottom cap
        let center = geometry.vertices.len() as u32;
        geometry.vertices.push(MeshVertex {
            position: Vec3::new(0.0, -half, 0.0),
            normal: Vec3::NEG_Y,
            uv: Vec2::splat(0.5),
        });
        let ring = geometry.vertices.len() as u32;
        for ix in 0..=rs {
            let theta = ix as f32 / rs as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            geometry.vertices.push(MeshVertex {
                position: Vec3::new(radius * sin, -half, radius * cos),
                normal: Vec3::NEG_Y,
                uv: Vec2::new(cos * 0.5 + 0.5, sin * 0.5 + 0.5),
            });
        }
        for ix in 0..rs {
            geometry
                .indices
                .extend_from_slice(&[center, ring + ix + 1, ring + ix]);
        }
        geometry
    }

    /// Torus around the Z axis.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let rs = radial_segments.max(3);
        let ts = tubular_segments.max(3);
        let mut geometry = Self::default();

        for j in 0..=rs {
            let v = j as f32 / rs as f32 * TAU;
            for i in 0..=ts {
                let u = i as f32 / ts as f32 * TAU;
                let position = Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let ring_center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                geometry.vertices.push(MeshVertex {
                    position,
                    normal: (position - ring_center).normalize(),
                    uv: Vec2::new(i as f32 / ts as f32, j as f32 / rs as f32),
                });
            }
        }

        let row = ts + 1;
        for j in 1..=rs {
            for i in 1..=ts {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        geometry
    }

    /// Non-indexed triangle soup from a flat `[x, y, z, ...]` buffer, with flat normals.
    ///
    /// Trailing values that do not form a whole triangle are ignored.
    pub fn triangles(positions: &[f32]) -> Self {
        let mut geometry = Self::default();
        for tri in positions.chunks_exact(9) {
            let p = [
                Vec3::from_slice(&tri[0..3]),
                Vec3::from_slice(&tri[3..6]),
                Vec3::from_slice(&tri[6..9]),
            ];
            let normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize_or(Vec3::Z);
            let uvs = [Vec2::ZERO, Vec2::X, Vec2::Y];
            for (position, uv) in p.into_iter().zip(uvs) {
                geometry.indices.push(geometry.vertices.len() as u32);
                geometry.vertices.push(MeshVertex {
                    position,
                    normal,
                    uv,
                });
            }
        }
        geometry
    }

    /// Number of triangles described by the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(geometry: &Geometry) {
        assert_eq!(geometry.indices.len() % 3, 0);
        let count = geometry.vertices.len() as u32;
        assert!(geometry.indices.iter().all(|&i| i < count));
        for vertex in &geometry.vertices {
            assert!((vertex.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_plane_counts() {
        let plane = Geometry::plane(1.0, 1.0, 100, 100);
        assert_eq!(plane.vertices.len(), 101 * 101);
        assert_eq!(plane.indices.len(), 6 * 100 * 100);
        assert_well_formed(&plane);
    }

    #[test]
    fn test_plane_faces_forward() {
        let plane = Geometry::plane(2.0, 4.0, 1, 1);
        let [a, b, c] = [0, 1, 2].map(|i| plane.vertices[plane.indices[i] as usize].position);
        assert!((b - a).cross(c - a).z > 0.0);
        let max = plane
            .vertices
            .iter()
            .fold(Vec3::ZERO, |acc, v| acc.max(v.position));
        assert_eq!(max, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_box_counts() {
        let cube = Geometry::cuboid(1.0, 1.0, 1.0, 2, 2, 2);
        assert_eq!(cube.vertices.len(), 6 * 9);
        assert_eq!(cube.indices.len(), 6 * 6 * 4);
        assert_well_formed(&cube);
    }

    #[test]
    fn test_box_faces_point_outwards() {
        let cube = Geometry::cuboid(4.0, 2.5, 4.0, 1, 1, 1);
        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| cube.vertices[tri[i] as usize]);
            let face_normal = (b.position - a.position).cross(c.position - a.position);
            assert!(face_normal.dot(a.normal) > 0.0);
            // The face sits on the side its normal points at.
            assert!(a.position.dot(a.normal) > 0.0);
        }
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = Geometry::sphere(0.5, 32, 32);
        assert_eq!(sphere.vertices.len(), 33 * 33);
        assert_eq!(sphere.triangle_count(), 32 * (2 * 32 - 2));
        assert_well_formed(&sphere);
        for vertex in &sphere.vertices {
            assert!((vertex.position.length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cone_apex_and_base() {
        let cone = Geometry::cone(3.5, 1.0, 4);
        assert_well_formed(&cone);
        let top = cone
            .vertices
            .iter()
            .map(|v| v.position.y)
            .fold(f32::MIN, f32::max);
        let bottom = cone
            .vertices
            .iter()
            .map(|v| v.position.y)
            .fold(f32::MAX, f32::min);
        assert_eq!(top, 0.5);
        assert_eq!(bottom, -0.5);
        assert_eq!(cone.triangle_count(), 4 + 4);
    }

    #[test]
    fn test_torus_counts() {
        let torus = Geometry::torus(0.3, 0.2, 16, 32);
        assert_eq!(torus.vertices.len(), 17 * 33);
        assert_eq!(torus.indices.len(), 6 * 16 * 32);
        assert_well_formed(&torus);
    }

    #[test]
    fn test_triangle_soup() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0];
        let soup = Geometry::triangles(&positions);
        assert_eq!(soup.vertices.len(), 3);
        assert_eq!(soup.indices, vec![0, 1, 2]);
        assert_eq!(soup.vertices[0].normal, Vec3::Z);
    }

    #[test]
    fn test_degenerate_triangle_gets_fallback_normal() {
        let soup = Geometry::triangles(&[0.0; 9]);
        assert_eq!(soup.vertices[0].normal, Vec3::Z);
    }
}
