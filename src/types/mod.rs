pub mod linalg;

pub use linalg::*;

use chrono::{DateTime, Utc};

/// Headset pose: position in meters, Euler rotation in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    pub fn yaw(&self) -> f64 {
        self.rotation[HEADSET_YAW_AXIS]
    }
}

/// Latest drone state as reported by the link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DroneTelemetrySample {
    pub position: Vec3,
    pub velocity_body: Vec3,
    /// North, east, down
    pub velocity_ned: Vec3,
    pub orientation: Quat,
}

impl DroneTelemetrySample {
    /// Attitude as (roll, pitch, yaw) radians.
    pub fn euler(&self) -> Vec3 {
        quat_to_euler(&self.orientation)
    }

    pub fn yaw(&self) -> f64 {
        self.euler()[DRONE_YAW_AXIS]
    }
}

impl Default for DroneTelemetrySample {
    /// All-zero sample, including the quaternion.
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity_body: Vec3::zeros(),
            velocity_ned: Vec3::zeros(),
            orientation: Quat::new(0.0, 0.0, 0.0, 0.0),
        }
    }
}

/// Single-eye gaze ray.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EyeSample {
    pub forward: Vec3,
    pub origin: Vec3,
    pub valid: bool,
}

/// One gaze measurement from the headset.
#[derive(Clone, Debug, PartialEq)]
pub struct GazeSample {
    pub capture_time: DateTime<Utc>,
    pub headset: Pose,
    pub combined_forward: Vec3,
    pub focus_distance: f64,
    pub focus_stability: f64,
    pub left: EyeSample,
    pub right: EyeSample,
}

/// Stick-style command axes, each nominally in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CommandAxes {
    /// Yaw / pan
    pub lx: f64,
    /// Vertical
    pub ly: f64,
    /// Lateral strafe
    pub rx: f64,
    /// Forward / back
    pub ry: f64,
}

impl CommandAxes {
    pub fn new(lx: f64, ly: f64, rx: f64, ry: f64) -> Self {
        Self { lx, ly, rx, ry }
    }

    pub fn clamped(self) -> Self {
        Self {
            lx: self.lx.clamp(-1.0, 1.0),
            ly: self.ly.clamp(-1.0, 1.0),
            rx: self.rx.clamp(-1.0, 1.0),
            ry: self.ry.clamp(-1.0, 1.0),
        }
    }
}
