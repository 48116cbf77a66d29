//! Head pose to stick-axis mapping.
//!
//! Yaw uses a resetting two-tier deadband on the heading error between
//! headset and drone. Translation re-expresses the horizontal head
//! displacement in the drone's heading frame and quantizes each component
//! independently. The default translation deadband latches: inside the
//! band the previous command keeps standing.

use crate::calibration::CalibrationState;
use crate::config::{MapperConfig, PositionReference, TranslationMode};
use crate::transform::{rotate, wrap_once};
use crate::types::{planar, CommandAxes, Pose, Vec2};

/// Quantize a wrapped heading error into a yaw command.
pub fn quantize_yaw(rotation_diff: f64, config: &MapperConfig) -> f64 {
    let magnitude = rotation_diff.abs();
    if !magnitude.is_finite() || magnitude <= config.deadband_yaw {
        return 0.0;
    }
    let level = if magnitude < config.full_turn_threshold {
        config.small_turn_gain
    } else {
        config.full_turn_gain
    };
    level.copysign(rotation_diff)
}

/// Deadband around zero that keeps the last command inside the band.
#[derive(Debug, Clone, PartialEq)]
pub struct LatchingDeadband {
    band: f64,
    gain: f64,
    command: f64,
}

impl LatchingDeadband {
    pub fn new(band: f64, gain: f64) -> Self {
        Self {
            band,
            gain,
            command: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        if value > self.band {
            self.command = self.gain;
        } else if value < -self.band {
            self.command = -self.gain;
        }
        self.command
    }

    pub fn command(&self) -> f64 {
        self.command
    }
}

/// Deadband around the previous sample; zero when the value holds still.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementalDeadband {
    band: f64,
    gain: f64,
    history: f64,
    command: f64,
}

impl IncrementalDeadband {
    pub fn new(band: f64, gain: f64) -> Self {
        Self {
            band,
            gain,
            history: 0.0,
            command: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        self.command = if value > self.history + self.band {
            self.gain
        } else if value < self.history - self.band {
            -self.gain
        } else {
            0.0
        };
        self.history = value;
        self.command
    }

    pub fn command(&self) -> f64 {
        self.command
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TranslationChannel {
    Latching(LatchingDeadband),
    Incremental(IncrementalDeadband),
}

impl TranslationChannel {
    fn new(config: &MapperConfig) -> Self {
        match config.translation_mode {
            TranslationMode::Latching => {
                TranslationChannel::Latching(LatchingDeadband::new(config.deadband_pos, config.pos_gain))
            }
            TranslationMode::Incremental => TranslationChannel::Incremental(IncrementalDeadband::new(
                config.deadband_pos,
                config.pos_gain,
            )),
        }
    }

    fn update(&mut self, value: f64) -> f64 {
        match self {
            TranslationChannel::Latching(d) => d.update(value),
            TranslationChannel::Incremental(d) => d.update(value),
        }
    }

    fn command(&self) -> f64 {
        match self {
            TranslationChannel::Latching(d) => d.command(),
            TranslationChannel::Incremental(d) => d.command(),
        }
    }
}

/// Result of one mapping step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    pub axes: CommandAxes,
    /// Heading error after the single wrap step.
    pub rotation_diff: f64,
    /// Head displacement in the drone frame; `None` before calibration.
    pub pos_diff: Option<Vec2>,
}

pub struct ControlMapper {
    config: MapperConfig,
    /// Lateral, forward
    channels: [TranslationChannel; 2],
}

impl ControlMapper {
    pub fn new(config: MapperConfig) -> Self {
        let channels = [TranslationChannel::new(&config), TranslationChannel::new(&config)];
        Self { config, channels }
    }

    /// Map the live head pose to command axes.
    ///
    /// `drone_yaw` is the raw telemetry yaw; it is corrected by the yaw
    /// captured at calibration. Translation only runs once calibrated.
    pub fn map(&mut self, pose: &Pose, calibration: &CalibrationState, drone_yaw: f64) -> Mapping {
        let drone_yaw = calibration.corrected_drone_yaw(drone_yaw);
        let rotation_diff = wrap_once(pose.yaw() - drone_yaw);
        let yaw_axis = quantize_yaw(rotation_diff, &self.config);

        let pos_diff = if calibration.is_calibrated() {
            let head = match self.config.position_reference {
                PositionReference::Absolute => pose.position,
                PositionReference::OriginRelative => pose.position - calibration.headset_origin(),
            };
            let in_drone_frame = rotate(planar(&head), rotation_diff);
            self.channels[0].update(in_drone_frame.x);
            self.channels[1].update(in_drone_frame.y);
            Some(in_drone_frame)
        } else {
            None
        };

        let axes = CommandAxes {
            lx: yaw_axis,
            ly: 0.0,
            rx: -self.channels[0].command(),
            ry: -self.channels[1].command(),
        };

        Mapping {
            axes,
            rotation_diff,
            pos_diff,
        }
    }
}
