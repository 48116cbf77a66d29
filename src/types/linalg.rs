//! Linear algebra aliases for head and drone frames
//!
//! Headset frame: x lateral (right), y up, z forward. Euler angles are
//! stored as (pitch, yaw, roll) about (x, y, z), so yaw is component 1.
//! Drone attitude arrives as a quaternion and is reduced to
//! (roll, pitch, yaw) Euler angles.

use nalgebra::{Quaternion, UnitQuaternion, Vector2, Vector3};

pub type Vec2 = Vector2<f64>;
pub type Vec3 = Vector3<f64>;
pub type Quat = Quaternion<f64>;

/// Headset Euler component holding yaw.
pub const HEADSET_YAW_AXIS: usize = 1;
/// Drone Euler component holding yaw.
pub const DRONE_YAW_AXIS: usize = 2;

/// Below this norm a quaternion carries no usable attitude.
const QUAT_NORM_EPS: f64 = 1e-9;

/// Project a headset-frame vector onto the horizontal (x, z) plane.
pub fn planar(v: &Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Convert a (possibly non-normalized) quaternion to (roll, pitch, yaw).
///
/// A zero quaternion, which is what a link reports before its first
/// attitude update, maps to zero angles.
pub fn quat_to_euler(q: &Quat) -> Vec3 {
    match UnitQuaternion::try_new(*q, QUAT_NORM_EPS) {
        Some(unit) => {
            let (roll, pitch, yaw) = unit.euler_angles();
            Vec3::new(roll, pitch, yaw)
        }
        None => Vec3::zeros(),
    }
}

/// `(x, y, z)` with fixed decimals, as written to the CSV logs.
pub fn format_vec3(v: &Vec3, decimals: usize) -> String {
    format!(
        "({:.prec$}, {:.prec$}, {:.prec$})",
        v.x,
        v.y,
        v.z,
        prec = decimals
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_quaternion_is_level() {
        let euler = quat_to_euler(&Quat::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(euler, Vec3::zeros());
    }

    #[test]
    fn test_yaw_extraction() {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.7);
        let euler = quat_to_euler(q.quaternion());
        assert_abs_diff_eq!(euler[DRONE_YAW_AXIS], 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(euler[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unnormalized_quaternion() {
        let q = UnitQuaternion::from_euler_angles(0.1, -0.2, 1.2);
        let scaled = q.quaternion() * 3.0;
        let euler = quat_to_euler(&scaled);
        assert_abs_diff_eq!(euler[DRONE_YAW_AXIS], 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3(&Vec3::new(1.0, -0.5, 0.25), 2), "(1.00, -0.50, 0.25)");
    }

    #[test]
    fn test_planar_drops_height() {
        let p = planar(&Vec3::new(0.5, 1.7, -0.25));
        assert_eq!(p, Vec2::new(0.5, -0.25));
    }
}
