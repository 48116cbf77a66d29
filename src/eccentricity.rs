//! Angular offset of a gaze ray from the forward axis.

use crate::error::{TeleopError, TeleopResult};
use crate::types::Vec3;

/// A forward component this close to zero makes the ratio meaningless.
const MIN_FORWARD: f64 = 1e-9;

/// Horizontal and vertical eccentricity in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eccentricity {
    pub x_deg: f64,
    pub y_deg: f64,
}

/// `atan(x / z)` and `atan(y / z)` in degrees.
///
/// Rays with a near-zero or non-finite forward component, or any
/// non-finite component, are rejected instead of producing inf/NaN.
pub fn eccentricity(forward: &Vec3) -> TeleopResult<Eccentricity> {
    if !forward.iter().all(|c| c.is_finite()) {
        return Err(TeleopError::InvalidSample(format!(
            "non-finite gaze vector ({}, {}, {})",
            forward.x, forward.y, forward.z
        )));
    }
    if forward.z.abs() < MIN_FORWARD {
        return Err(TeleopError::InvalidSample(format!(
            "gaze forward component {} too close to zero",
            forward.z
        )));
    }

    Ok(Eccentricity {
        x_deg: (forward.x / forward.z).atan().to_degrees(),
        y_deg: (forward.y / forward.z).atan().to_degrees(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_straight_ahead() {
        let ecc = eccentricity(&Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(ecc.x_deg, 0.0);
        assert_eq!(ecc.y_deg, 0.0);
    }

    #[test]
    fn test_forty_five_degrees() {
        let ecc = eccentricity(&Vec3::new(1.0, -1.0, 1.0).normalize()).unwrap();
        assert_abs_diff_eq!(ecc.x_deg, 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ecc.y_deg, -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_forward_rejected() {
        let err = eccentricity(&Vec3::new(0.3, 0.1, 0.0)).unwrap_err();
        assert!(matches!(err, TeleopError::InvalidSample(_)));
        assert!(eccentricity(&Vec3::zeros()).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(eccentricity(&Vec3::new(f64::NAN, 0.0, 1.0)).is_err());
        assert!(eccentricity(&Vec3::new(0.0, 0.0, f64::INFINITY)).is_err());
    }
}
