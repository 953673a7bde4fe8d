//! Orbit camera
//!
//! Circles the origin at a fixed radius and height, always looking at the
//! origin. The orbit angle is driven by the frame counter, so replaying the
//! same frame numbers replays the same views.
//!
//! # Coordinate System
//!
//! Right-handed, y up; the camera looks down its local -z.

use std::f32::consts::PI;

use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    radius: f32,
    height: f32,
    fov_y: f32, // radians
    aspect_ratio: f32,
    near: f32,
    far: f32,
}

impl OrbitCamera {
    pub fn new(aspect_ratio: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
            radius: 7.0,
            height: 1.0,
            fov_y: 50.0_f32.to_radians(),
            aspect_ratio,
            near: 1.0,
            far: 100.0,
        };
        camera.orbit(0);
        camera
    }

    /// Moves the camera to its place on the orbit for `frame`.
    ///
    /// The camera stays on the +z half of the circle: the angle sweeps
    /// half a turn every 360 frames and z is mirrored to be non-negative.
    pub fn orbit(&mut self, frame: u32) {
        let angle = frame as f32 * PI / 360.0 - 0.5 * PI;
        self.position = Vec3::new(
            self.radius * angle.sin(),
            self.height,
            (self.radius * angle.cos()).abs(),
        );
    }

    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width as f32 / height.max(1) as f32;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orbit_start_is_on_the_x_axis() {
        let camera = OrbitCamera::new(1.0);
        let p = camera.position();
        assert_relative_eq!(p.x, -7.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_frame_180_faces_front() {
        let mut camera = OrbitCamera::new(1.0);
        camera.orbit(180);
        let p = camera.position();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 7.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_stays_in_front() {
        let mut camera = OrbitCamera::new(1.0);
        for frame in (0..1440).step_by(37) {
            camera.orbit(frame);
            let p = camera.position();
            assert!(p.z >= 0.0);
            assert_relative_eq!((p.x * p.x + p.z * p.z).sqrt(), 7.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let mut camera = OrbitCamera::new(1.0);
        camera.orbit(260);
        let ndc = camera.view_projection() * Vec3::ZERO;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
    }
}
