use crate::error::{TeleopError, TeleopResult};
use crate::types::{Vec3, DRONE_YAW_AXIS};

/// Shared reference between headset and drone frames.
///
/// Captured once per session at the operator's trigger; every later frame
/// is expressed as a delta from that instant. Once captured it is never
/// reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationState {
    captured: bool,
    headset_origin: Vec3,
    drone_origin: Vec3,
    /// Drone (roll, pitch, yaw) at capture.
    drone_origin_rotation: Vec3,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the origin snapshot. A second request leaves the first
    /// snapshot untouched and returns `RedundantAction`.
    pub fn request_calibration(
        &mut self,
        headset_position: Vec3,
        drone_position: Vec3,
        drone_rotation: Vec3,
    ) -> TeleopResult<()> {
        if self.captured {
            return Err(TeleopError::RedundantAction(
                "calibration already captured for this session".to_string(),
            ));
        }

        self.headset_origin = headset_position;
        self.drone_origin = drone_position;
        self.drone_origin_rotation = drone_rotation;
        self.captured = true;
        Ok(())
    }

    pub fn is_calibrated(&self) -> bool {
        self.captured
    }

    /// Zero until captured.
    pub fn headset_origin(&self) -> Vec3 {
        self.headset_origin
    }

    /// Zero until captured.
    pub fn drone_origin(&self) -> Vec3 {
        self.drone_origin
    }

    pub fn drone_origin_rotation(&self) -> Vec3 {
        self.drone_origin_rotation
    }

    /// Drone yaw relative to its attitude at calibration.
    pub fn corrected_drone_yaw(&self, drone_yaw: f64) -> f64 {
        drone_yaw - self.drone_origin_rotation[DRONE_YAW_AXIS]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uncalibrated() {
        let state = CalibrationState::new();
        assert!(!state.is_calibrated());
        assert_eq!(state.headset_origin(), Vec3::zeros());
        assert_eq!(state.corrected_drone_yaw(0.25), 0.25);
    }

    #[test]
    fn test_capture_stores_snapshot() {
        let mut state = CalibrationState::new();
        state
            .request_calibration(
                Vec3::new(0.1, 1.6, 0.2),
                Vec3::new(2.0, 0.0, -1.0),
                Vec3::new(0.0, 0.0, 0.3),
            )
            .unwrap();

        assert!(state.is_calibrated());
        assert_eq!(state.headset_origin(), Vec3::new(0.1, 1.6, 0.2));
        assert_eq!(state.drone_origin(), Vec3::new(2.0, 0.0, -1.0));
        assert!((state.corrected_drone_yaw(0.5) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_second_request_is_ignored() {
        let mut state = CalibrationState::new();
        state
            .request_calibration(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        let first = state.clone();

        let result = state.request_calibration(
            Vec3::new(9.0, 9.0, 9.0),
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(0.0, 0.0, 1.0),
        );

        assert!(result.unwrap_err().is_redundant());
        assert_eq!(state, first);
    }
}
