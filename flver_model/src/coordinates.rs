//! Conversions between the game's coordinate system and the scene coordinate system.
//!
//! The game uses a left-handed coordinate system with +Y up and -Z forward.
//! Scenes use a right-handed coordinate system with +Z up and +Y forward.
//! Swapping the Y and Z axes converts between the two.
//! The swap is its own inverse, so each pair of functions performs the same operation
//! and exists to document the direction of the conversion.
use glam::{Mat3, Vec2, Vec3, Vec4, vec2, vec3};

use crate::Transform;

// The Y and Z axis swap as a change of basis.
const SWAP_YZ: Mat3 = Mat3::from_cols(Vec3::X, Vec3::Z, Vec3::Y);

/// The game's up direction.
pub const GAME_UP: Vec3 = Vec3::Y;

pub fn vec3_to_game(v: Vec3) -> Vec3 {
    vec3(v.x, v.z, v.y)
}

pub fn vec3_from_game(v: Vec3) -> Vec3 {
    vec3(v.x, v.z, v.y)
}

/// Convert a tangent or bitangent with its sign in the fourth component.
///
/// The axis swap mirrors the space, so the sign is flipped.
pub fn tangent_to_game(v: Vec4) -> Vec4 {
    vec3_to_game(v.truncate()).extend(-v.w)
}

pub fn tangent_from_game(v: Vec4) -> Vec4 {
    vec3_from_game(v.truncate()).extend(-v.w)
}

pub fn mat3_to_game(m: Mat3) -> Mat3 {
    // Perform the rotation in the scene's basis and convert back to the game's basis.
    SWAP_YZ * m * SWAP_YZ
}

pub fn mat3_from_game(m: Mat3) -> Mat3 {
    SWAP_YZ * m * SWAP_YZ
}

/// Convert scene XYZ Euler angles to game Euler angles applied in X, Z, Y order.
pub fn euler_to_game(euler: Vec3) -> Vec3 {
    vec3(-euler.x, -euler.z, -euler.y)
}

/// Convert game Euler angles applied in X, Z, Y order to scene XYZ Euler angles.
pub fn euler_from_game(euler: Vec3) -> Vec3 {
    vec3(-euler.x, -euler.z, -euler.y)
}

pub fn transform_to_game(transform: Transform) -> Transform {
    Transform {
        translation: vec3_to_game(transform.translation),
        rotation: mat3_to_game(transform.rotation),
        scale: vec3_to_game(transform.scale),
    }
}

pub fn transform_from_game(transform: Transform) -> Transform {
    Transform {
        translation: vec3_from_game(transform.translation),
        rotation: mat3_from_game(transform.rotation),
        scale: vec3_from_game(transform.scale),
    }
}

/// Convert scene texture coordinates with the origin at the bottom left
/// to game texture coordinates with the origin at the top left.
pub fn uv_to_game(uv: Vec2) -> Vec3 {
    vec3(uv.x, 1.0 - uv.y, 0.0)
}

pub fn uv_from_game(uv: Vec3) -> Vec2 {
    vec2(uv.x, 1.0 - uv.y)
}

/// The rotation with `forward` as the Z axis and `upward` as the Y axis.
///
/// The vectors do not need to be normalized or perpendicular.
/// The forward direction is preserved and the up direction is adjusted to be perpendicular.
pub fn rotation_from_forward_up(forward: Vec3, upward: Vec3) -> Mat3 {
    let forward = forward.try_normalize().unwrap_or(Vec3::Z);
    let right = upward
        .cross(forward)
        .try_normalize()
        .unwrap_or_else(|| forward.any_orthonormal_vector());
    let up = forward.cross(right);
    Mat3::from_cols(right, up, forward)
}

/// The forward and up directions for `rotation`.
pub fn forward_up_from_rotation(rotation: Mat3) -> (Vec3, Vec3) {
    (rotation.z_axis, rotation.y_axis)
}
