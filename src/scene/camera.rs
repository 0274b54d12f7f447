//! Perspective camera and orbit controls.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec2, Vec3};
use sdl2::mouse::MouseButton;

use crate::other::UpdateContext;

/// A pinhole camera looking from `position` towards `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Updates the aspect ratio after the viewport changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Orbits the camera around a target with the mouse.
///
/// Left drag rotates, right drag pans and the wheel dollies. With damping enabled, input
/// accumulates into a pending delta of which a fixed fraction is applied per update, so motion
/// glides to a stop.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pending azimuth change in radians.
    delta_theta: f32,
    /// Pending polar change in radians.
    delta_phi: f32,
    pending_pan: Vec3,
    pending_scale: f32,
}

const POLAR_EPSILON: f32 = 1e-6;

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
        }
    }

    pub fn with_damping(mut self) -> Self {
        self.enable_damping = true;
        self
    }

    /// Rotates by a mouse drag of `delta` pixels in a viewport `viewport_height` pixels tall.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.delta_theta -= TAU * delta.x / viewport_height * self.rotate_speed;
        self.delta_phi -= TAU * delta.y / viewport_height * self.rotate_speed;
    }

    /// Moves camera and target parallel to the view plane by a drag of `delta` pixels.
    pub fn pan(&mut self, camera: &PerspectiveCamera, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let offset = camera.position - self.target;
        // World units per pixel at the target distance.
        let scale = 2.0 * offset.length() * (camera.fov.to_radians() / 2.0).tan() / viewport_height;
        let forward = (-offset).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        self.pending_pan += (-right * delta.x + up * delta.y) * scale;
    }

    /// Dollies towards the target by `steps` wheel notches (positive zooms in).
    pub fn dolly(&mut self, steps: f32) {
        self.pending_scale *= 0.95_f32.powf(steps);
    }

    /// Feeds this frame's mouse input into the controls.
    pub fn handle_input(&mut self, camera: &PerspectiveCamera, ctx: &UpdateContext) {
        let delta = ctx.mouse.delta;
        if ctx.mouse.down.contains(&MouseButton::Left) {
            self.rotate(delta, ctx.viewport.y);
        } else if ctx.mouse.down.contains(&MouseButton::Right) {
            self.pan(camera, delta, ctx.viewport.y);
        }
        if ctx.mouse.scroll_delta.y != 0.0 {
            self.dolly(ctx.mouse.scroll_delta.y);
        }
    }

    /// Applies pending motion to the camera. Call once per frame.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        theta += self.delta_theta * factor;
        phi += self.delta_phi * factor;
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let radius = (radius * self.pending_scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pending_pan * factor;

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            self.pending_pan *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pending_pan = Vec3::ZERO;
        }
        self.pending_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0).at(Vec3::new(0.0, 0.0, 3.0))
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = camera();
        camera.resize(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
        camera.resize(100, 0);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn test_update_without_input_keeps_camera() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.rotate(Vec2::new(150.0, 40.0), 600.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn test_quarter_drag_is_quarter_turn() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        // A drag of a quarter of the viewport height turns a quarter of a full circle.
        controls.rotate(Vec2::new(-150.0, 0.0), 600.0);
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_damping_converges() {
        let mut damped_camera = camera();
        let mut damped = OrbitControls::new(Vec3::ZERO).with_damping();
        let mut direct_camera = camera();
        let mut direct = OrbitControls::new(Vec3::ZERO);

        damped.rotate(Vec2::new(60.0, 0.0), 600.0);
        direct.rotate(Vec2::new(60.0, 0.0), 600.0);
        direct.update(&mut direct_camera);

        damped.update(&mut damped_camera);
        let first = (damped_camera.position - direct_camera.position).length();
        assert!(first > 0.1);
        for _ in 0..500 {
            damped.update(&mut damped_camera);
        }
        assert!((damped_camera.position - direct_camera.position).length() < 1e-3);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.rotate(Vec2::new(0.0, 10_000.0), 600.0);
        controls.update(&mut camera);
        assert!(camera.position.y <= 3.0);
        assert!(camera.position.y > 2.99);
        assert!(!camera.position.is_nan());
    }

    #[test]
    fn test_dolly_respects_limits() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.min_distance = 2.0;
        controls.dolly(100.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_pan_moves_target_and_camera_together() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let before = camera.position - controls.target;
        controls.pan(&camera, Vec2::new(100.0, 0.0), 600.0);
        controls.update(&mut camera);
        assert!(controls.target.x < 0.0);
        assert!((camera.position - controls.target - before).length() < 1e-4);
    }
}
