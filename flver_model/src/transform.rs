use std::ops::Mul;

use glam::{EulerRot, Mat3, Mat4, Vec3};

/// A decomposed transform as scale -> rotation -> translation (TRS).
///
/// Scale does not affect translation when multiplying [Transform].
/// Rotations use matrices to match the Euler angles stored in bones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Mat3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Mat3::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform from game Euler angles in radians applied in X, Z, Y order.
    pub fn from_euler(translation: Vec3, euler: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: Mat3::from_euler(EulerRot::YZX, euler.y, euler.z, euler.x),
            scale,
        }
    }

    /// The rotation as game Euler angles in radians applied in X, Z, Y order.
    ///
    /// Rotations near gimbal lock may not produce the same angles used to create the rotation.
    pub fn euler(&self) -> Vec3 {
        let (y, z, x) = self.rotation.to_euler(EulerRot::YZX);
        Vec3::new(x, y, z)
    }

    pub fn to_matrix(self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_mat3(self.rotation)
            * Mat4::from_scale(self.scale)
    }

    pub fn from_matrix(value: Mat4) -> Self {
        let (scale, rotation, translation) = value.to_scale_rotation_translation();
        Self {
            translation,
            rotation: Mat3::from_quat(rotation),
            scale,
        }
    }

    /// The inverse with respect to [Transform] multiplication.
    pub fn inverse(self) -> Self {
        // Rotations are orthonormal, so the transpose is the inverse.
        let rotation = self.rotation.transpose();
        Self {
            translation: -(rotation * self.translation),
            rotation,
            scale: self.scale.recip(),
        }
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Self::Output {
        Transform {
            translation: self.rotation * rhs.translation + self.translation,
            rotation: self.rotation * rhs.rotation,
            scale: self.scale * rhs.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use glam::vec3;

    #[test]
    fn transform_to_matrix() {
        assert_eq!(
            Mat4::from_cols_array_2d(&[
                [4.0, 0.0, 0.0, 0.0],
                [0.0, -5.0, 0.0, 0.0],
                [0.0, 0.0, -6.0, 0.0],
                [1.0, 2.0, 3.0, 1.0],
            ]),
            Transform {
                translation: vec3(1.0, 2.0, 3.0),
                rotation: Mat3::from_diagonal(vec3(1.0, -1.0, -1.0)),
                scale: vec3(4.0, 5.0, 6.0),
            }
            .to_matrix()
        );
    }

    #[test]
    fn transform_inverse() {
        let transform = Transform::from_euler(
            vec3(1.0, 2.0, 3.0),
            vec3(0.5, -0.25, 1.0),
            vec3(2.0, 4.0, 0.5),
        );
        let identity = transform.inverse() * transform;
        assert!(identity.translation.abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(identity.rotation.abs_diff_eq(Mat3::IDENTITY, 1e-5));
        assert!(identity.scale.abs_diff_eq(Vec3::ONE, 1e-5));
    }

    #[test]
    fn euler_order() {
        // Rotations are applied to X first, then Z, then Y.
        let transform = Transform::from_euler(Vec3::ZERO, vec3(0.1, 0.2, 0.3), Vec3::ONE);
        let expected = Mat3::from_rotation_y(0.2)
            * Mat3::from_rotation_z(0.3)
            * Mat3::from_rotation_x(0.1);
        assert!(transform.rotation.abs_diff_eq(expected, 1e-6));

        let euler = transform.euler();
        assert!(euler.abs_diff_eq(vec3(0.1, 0.2, 0.3), 1e-5));
    }

    #[test]
    fn scale_does_not_affect_translation() {
        let parent = Transform {
            scale: vec3(2.0, 2.0, 2.0),
            ..Transform::IDENTITY
        };
        let child = Transform {
            translation: vec3(1.0, 0.0, 0.0),
            ..Transform::IDENTITY
        };
        assert_eq!(vec3(1.0, 0.0, 0.0), (parent * child).translation);
        assert_eq!(vec3(2.0, 2.0, 2.0), (parent * child).scale);
    }
}
