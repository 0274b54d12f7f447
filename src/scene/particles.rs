//! Particle fields and the travelling-wave animation.
//!
//! Positions and colours are kept as flat, interleaved `[x, y, z, x, y, z, ...]` buffers so the
//! whole field can be uploaded to the GPU in one call.

use glam::Vec3;
use glow::HasContext;

use crate::abs::Vertex;

/// A point sprite vertex. Also used for coloured helper lines.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl Vertex for ColorVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<ColorVertex>() as i32;

            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);

            // Color attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, size_of::<Vec3>() as i32);
        }
    }
}

/// Sets every particle's y coordinate to `sin(time + x)`, leaving x and z untouched.
///
/// `positions` holds interleaved `(x, y, z)` triples; a trailing partial triple is ignored.
pub fn wave_update(positions: &mut [f32], time: f32) {
    for particle in positions.chunks_exact_mut(3) {
        particle[1] = (time + particle[0]).sin();
    }
}

/// A fixed-size collection of coloured particles.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    positions: Vec<f32>,
    colors: Vec<f32>,
    /// Set when positions changed since the last upload.
    dirty: bool,
}

impl ParticleField {
    /// Builds a field from interleaved position and colour buffers of equal length.
    pub fn new(positions: Vec<f32>, colors: Vec<f32>) -> Result<Self, String> {
        if positions.len() % 3 != 0 {
            return Err(format!(
                "Position buffer length {} is not a multiple of 3",
                positions.len()
            ));
        }
        if positions.len() != colors.len() {
            return Err(format!(
                "Position buffer has {} values but colour buffer has {}",
                positions.len(),
                colors.len()
            ));
        }
        Ok(Self {
            positions,
            colors,
            dirty: true,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Recomputes the wave for the given elapsed time and flags the field for re-upload.
    pub fn animate_wave(&mut self, time: f32) {
        wave_update(&mut self.positions, time);
        self.dirty = true;
    }

    /// Whether the GPU copy is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Interleaves positions and colours into upload-ready vertices and clears the dirty flag.
    pub fn take_vertices(&mut self) -> Vec<ColorVertex> {
        self.dirty = false;
        self.vertices()
    }

    pub fn vertices(&self) -> Vec<ColorVertex> {
        self.positions
            .chunks_exact(3)
            .zip(self.colors.chunks_exact(3))
            .map(|(p, c)| ColorVertex {
                position: Vec3::from_slice(p),
                color: Vec3::from_slice(c),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn random_field(seed: u64, count: usize) -> ParticleField {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = (0..count * 3)
            .map(|_| (rng.random::<f32>() - 0.5) * 10.0)
            .collect();
        let colors = (0..count * 3).map(|_| rng.random::<f32>()).collect();
        ParticleField::new(positions, colors).unwrap()
    }

    #[test]
    fn test_wave_matches_formula() {
        let mut field = random_field(7, 100);
        for &t in &[0.0, 0.25, 1.0, 12.5, 1000.0] {
            field.animate_wave(t);
            for p in field.positions.chunks_exact(3) {
                assert_eq!(p[1], (t + p[0]).sin());
            }
        }
    }

    #[test]
    fn test_wave_only_touches_y() {
        let mut field = random_field(42, 64);
        let before = field.positions.to_vec();
        for frame in 0..10 {
            field.animate_wave(frame as f32 / 60.0);
        }
        for (old, new) in before.chunks_exact(3).zip(field.positions.chunks_exact(3)) {
            assert_eq!(old[0], new[0]);
            assert_eq!(old[2], new[2]);
        }
    }

    #[test]
    fn test_wave_is_idempotent() {
        let mut field = random_field(3, 32);
        field.animate_wave(2.0);
        let once = field.positions.to_vec();
        field.animate_wave(2.0);
        assert_eq!(once, field.positions);
    }

    #[test]
    fn test_wave_empty_buffer() {
        let mut positions: [f32; 0] = [];
        wave_update(&mut positions, 1.0);
        let mut field = ParticleField::new(vec![], vec![]).unwrap();
        field.animate_wave(1.0);
        assert!(field.is_empty());
        assert!(field.vertices().is_empty());
    }

    #[test]
    fn test_wave_known_values() {
        let mut positions = [0.0, 0.0, 0.0];
        wave_update(&mut positions, 0.0);
        assert_eq!(positions, [0.0, 0.0, 0.0]);
        wave_update(&mut positions, FRAC_PI_2);
        assert_eq!(positions[1], 1.0);
        assert_eq!(positions[0], 0.0);
        assert_eq!(positions[2], 0.0);
    }

    #[test]
    fn test_vertices_pair_positions_with_colors() {
        let field = ParticleField::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        )
        .unwrap();
        assert_eq!(field.len(), 2);
        let vertices = field.vertices();
        assert_eq!(vertices[1].position, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(vertices[1].color, Vec3::new(0.4, 0.5, 0.6));
    }

    #[test]
    fn test_mismatched_buffers_are_rejected() {
        assert!(ParticleField::new(vec![0.0; 4], vec![0.0; 4]).is_err());
        assert!(ParticleField::new(vec![0.0; 3], vec![0.0; 6]).is_err());
    }

    #[test]
    fn test_dirty_flag() {
        let mut field = ParticleField::new(vec![1.0, 2.0, 3.0], vec![0.5, 0.5, 0.5]).unwrap();
        assert!(field.is_dirty());
        let vertices = field.take_vertices();
        assert_eq!(vertices[0].position, Vec3::new(1.0, 2.0, 3.0));
        assert!(!field.is_dirty());
        field.animate_wave(0.0);
        assert!(field.is_dirty());
    }
}
