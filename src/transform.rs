//! Placement of the area light in the world.
//!
//! Provides a [`Transform`] with a fluent API for translation, per-axis
//! rotation in degrees and a 2D size (the light is planar, so z scale is 1).

use crate::math::vec2::Vec2;
use crate::math::{mat4::Mat4, vec3::Vec3};

/// Translation, Euler rotation (degrees) and planar size.
///
/// Mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .set_translation_xyz(0.0, 1.3, 0.0)
///     .rotate_z(-0.5)
///     .set_size(Vec2::new(2.0, 2.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Vec3, // degrees around x, y, z
    size: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            size: Vec2::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with default values (translation=0, rotation=0, size=1).
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Translation ============

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) -> &mut Self {
        self.translation = translation;
        self
    }

    pub fn set_translation_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.translation = Vec3::new(x, y, z);
        self
    }

    /// Set only the vertical offset.
    pub fn set_height(&mut self, y: f32) -> &mut Self {
        self.translation.y = y;
        self
    }

    // ============ Rotation ============

    /// Euler angles in degrees.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Set the Euler angles in degrees.
    pub fn set_rotation(&mut self, degrees: Vec3) -> &mut Self {
        self.rotation = degrees;
        self
    }

    /// Set the rotation around the Z axis in degrees.
    pub fn set_rotation_z(&mut self, degrees: f32) -> &mut Self {
        self.rotation.z = degrees;
        self
    }

    /// Add to the rotation around the Z axis (degrees).
    pub fn rotate_z(&mut self, degrees: f32) -> &mut Self {
        self.rotation.z += degrees;
        self
    }

    // ============ Size ============

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) -> &mut Self {
        self.size = size;
        self
    }

    // ============ Matrix Generation ============

    /// Model matrix.
    ///
    /// Order: Translation * RotationZ * RotationY * RotationX * Scale
    /// (scale applied first, then X, Y and Z rotations, then translation).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.translation.x, self.translation.y, self.translation.z)
            * Mat4::rotation_z(self.rotation.z.to_radians())
            * Mat4::rotation_y(self.rotation.y.to_radians())
            * Mat4::rotation_x(self.rotation.x.to_radians())
            * Mat4::scaling(self.size.x, self.size.y, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default() {
        let t = Transform::default();
        assert_eq!(t.translation(), Vec3::ZERO);
        assert_eq!(t.rotation(), Vec3::ZERO);
        assert_eq!(t.size(), Vec2::ONE);
        assert_eq!(t.to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_fluent_api() {
        let mut t = Transform::new();
        t.set_translation_xyz(0.0, 1.3, 0.0)
            .rotate_z(45.0)
            .set_size(Vec2::new(2.0, 2.0));

        assert_eq!(t.translation(), Vec3::new(0.0, 1.3, 0.0));
        assert_relative_eq!(t.rotation().z, 45.0);
        assert_eq!(t.size(), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let mut t = Transform::new();
        t.set_translation_xyz(0.0, 1.0, 0.0)
            .set_rotation_z(90.0)
            .set_size(Vec2::new(2.0, 3.0));
        // (1, 0) -> scaled (2, 0) -> rotated (0, 2) -> translated (0, 3)
        let p = t.to_matrix() * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_z_is_not_scaled() {
        let mut t = Transform::new();
        t.set_size(Vec2::new(4.0, 4.0));
        let p = t.to_matrix() * Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(p.z, 1.0);
    }
}
