//! Planar frame transforms between headset and drone heading.

use crate::types::Vec2;
use nalgebra::Rotation2;
use std::f64::consts::PI;

/// Rotate `v` by `theta` radians: `[[cos, -sin], [sin, cos]] * v`.
pub fn rotate(v: Vec2, theta: f64) -> Vec2 {
    Rotation2::new(theta) * v
}

/// Heading error beyond which one full turn is taken off.
pub const WRAP_LIMIT: f64 = 3.14;
/// One full turn, as the headset-side heading math counts it.
pub const WRAP_STEP: f64 = 2.0 * WRAP_LIMIT;

/// Bring a heading error back toward (-pi, pi] with at most one turn.
///
/// Inputs are expected within [-2pi, 2pi]; anything further out stays
/// outside the interval after the single step (3pi comes back as ~3.1448).
pub fn wrap_once(angle: f64) -> f64 {
    if angle > WRAP_LIMIT {
        angle - WRAP_STEP
    } else if angle < -WRAP_LIMIT {
        angle + WRAP_STEP
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), PI / 2.0);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_preserves_norm() {
        let v = Vec2::new(0.3, -1.2);
        let mut theta = -PI + 0.01;
        while theta <= PI {
            let r = rotate(v, theta);
            assert_abs_diff_eq!(r.norm(), v.norm(), epsilon = 1e-12);
            theta += 0.1;
        }
    }

    #[test]
    fn test_inverse_rotation_restores_vector() {
        let v = Vec2::new(-0.7, 0.05);
        for &theta in &[-3.0, -1.0, -0.2, 0.0, 0.4, 2.5, PI] {
            let back = rotate(rotate(v, theta), -theta);
            assert_abs_diff_eq!(back.x, v.x, epsilon = 1e-12);
            assert_abs_diff_eq!(back.y, v.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_wrap_boundaries() {
        let wrapped = wrap_once(PI + 0.01);
        assert_abs_diff_eq!(wrapped, PI + 0.01 - WRAP_STEP, epsilon = 1e-12);
        assert!(wrapped > -PI && wrapped <= PI);

        let wrapped = wrap_once(-PI - 0.01);
        assert_abs_diff_eq!(wrapped, -PI - 0.01 + WRAP_STEP, epsilon = 1e-12);
        assert!(wrapped > -PI && wrapped <= PI);

        assert_eq!(wrap_once(0.3), 0.3);
        assert_eq!(wrap_once(WRAP_LIMIT), WRAP_LIMIT);
        assert_eq!(wrap_once(-WRAP_LIMIT), -WRAP_LIMIT);
    }

    #[test]
    fn test_wrap_leaves_in_range_errors_alone() {
        let mut angle = -3.0;
        while angle <= 3.0 {
            assert_eq!(wrap_once(angle), angle);
            angle += 0.25;
        }
    }

    #[test]
    fn test_three_pi_is_not_normalized() {
        let wrapped = wrap_once(3.0 * PI);
        assert_abs_diff_eq!(wrapped, 3.0 * PI - 6.28, epsilon = 1e-12);
        assert!(wrapped > PI);

        let wrapped = wrap_once(-3.0 * PI);
        assert_abs_diff_eq!(wrapped, -3.0 * PI + 6.28, epsilon = 1e-12);
        assert!(wrapped < -PI);
    }
}
