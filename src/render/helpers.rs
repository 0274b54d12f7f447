//! Line geometry for debug helpers.

use glam::{Mat4, Vec3};

use crate::scene::ColorVertex;

const SHADOW_FRUSTUM_COLOR: Vec3 = Vec3::new(1.0, 0.667, 0.0);
const SHADOW_UP_COLOR: Vec3 = Vec3::new(0.0, 0.667, 1.0);

fn line(vertices: &mut Vec<ColorVertex>, from: Vec3, to: Vec3, color: Vec3) {
    vertices.push(ColorVertex {
        position: from,
        color,
    });
    vertices.push(ColorVertex {
        position: to,
        color,
    });
}

/// Red, green and blue segments of length `size` along the local axes of `world`.
pub fn axes_lines(world: Mat4, size: f32, vertices: &mut Vec<ColorVertex>) {
    let origin = world.transform_point3(Vec3::ZERO);
    for (axis, color) in [(Vec3::X, Vec3::X), (Vec3::Y, Vec3::Y), (Vec3::Z, Vec3::Z)] {
        line(
            vertices,
            origin,
            world.transform_point3(axis * size),
            color,
        );
    }
}

/// The twelve edges of a box given by its corners, plus lines from the light to the near
/// plane corners.
///
/// Corner `i` uses bit 0 for x, bit 1 for y and bit 2 for far versus near.
pub fn frustum_lines(light: Vec3, corners: &[Vec3; 8], vertices: &mut Vec<ColorVertex>) {
    for i in 0..8 {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                line(vertices, corners[i], corners[i | bit], SHADOW_FRUSTUM_COLOR);
            }
        }
    }
    for corner in &corners[..4] {
        line(vertices, light, *corner, SHADOW_UP_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_follow_world_matrix() {
        let mut vertices = Vec::new();
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        axes_lines(world, 3.0, &mut vertices);
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(vertices[1].position, Vec3::new(4.0, 2.0, 3.0));
        assert_eq!(vertices[3].position, Vec3::new(1.0, 5.0, 3.0));
        assert_eq!(vertices[5].color, Vec3::Z);
    }

    #[test]
    fn test_frustum_has_twelve_edges_and_four_rays() {
        let corners = std::array::from_fn(|i| {
            Vec3::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32)
        });
        let mut vertices = Vec::new();
        frustum_lines(Vec3::splat(-1.0), &corners, &mut vertices);
        assert_eq!(vertices.len(), (12 + 4) * 2);
        for pair in vertices[..24].chunks(2) {
            let edge = pair[1].position - pair[0].position;
            assert_eq!(edge.length(), 1.0);
        }
    }
}
