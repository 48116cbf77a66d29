//! Head-pose teleoperation of a quadcopter from a VR headset, with gaze and
//! drone telemetry logging.

pub mod calibration;
pub mod config;
pub mod control_loop;
pub mod drone;
pub mod eccentricity;
pub mod error;
pub mod gaze_log;
pub mod headset;
pub mod input;
pub mod mapper;
pub mod telemetry;
pub mod telemetry_log;
pub mod transform;
pub mod types;

pub use calibration::CalibrationState;
pub use config::AppConfig;
pub use control_loop::{ControlLoop, ControlPhase, SessionSummary, TickReport};
pub use error::{TeleopError, TeleopResult};
pub use mapper::ControlMapper;
pub use telemetry::{TelemetryPublisher, TelemetrySnapshot, TelemetryStore};
pub use types::{CommandAxes, DroneTelemetrySample, GazeSample, Pose};
