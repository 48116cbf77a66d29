//! One control tick per rendered frame.
//!
//! Order within a tick: operator triggers, gaze drain and logging, mapping,
//! manual override, axis submission, telemetry logging. Logging failures
//! disable the affected log and never stop the tick.

use crate::calibration::CalibrationState;
use crate::config::{AppConfig, HeadsetConfig, LoggingConfig};
use crate::drone::DroneLink;
use crate::error::{TeleopError, TeleopResult};
use crate::gaze_log::GazeLogger;
use crate::headset::HeadsetSource;
use crate::input::InputFrame;
use crate::mapper::ControlMapper;
use crate::telemetry::{TelemetrySnapshot, TelemetryStore};
use crate::telemetry_log::TelemetryLogger;
use crate::types::{CommandAxes, Pose};
use chrono::Local;
use std::path::PathBuf;

/// Session phase, derived from the calibration state.
///
/// Calibrating is instantaneous: a mark-origin trigger captures the origin
/// within the tick that services it, so the loop moves from `Idle` straight
/// to `Active` and no tick ever reports an in-between phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPhase {
    /// Yaw tracking only, no shared origin yet
    Idle,
    /// Origin captured; translation mapping enabled
    Active,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Axes submitted to the drone link
    pub axes: CommandAxes,
    pub phase: ControlPhase,
    pub logging: bool,
    pub gaze_rows: usize,
    pub telemetry_stale: bool,
    pub rotation_diff: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub gaze_rows: u64,
    pub telemetry_rows: u64,
    pub calibrated: bool,
}

pub struct ControlLoop<H: HeadsetSource, D: DroneLink> {
    headset: H,
    drone: D,
    telemetry: TelemetryStore,
    calibration: CalibrationState,
    mapper: ControlMapper,
    headset_config: HeadsetConfig,
    logging_config: LoggingConfig,
    gaze_log: Option<GazeLogger>,
    telemetry_log: Option<TelemetryLogger>,
    ticks: u64,
    gaze_rows: u64,
    telemetry_rows: u64,
    reported_stale: bool,
}

impl<H: HeadsetSource, D: DroneLink> ControlLoop<H, D> {
    /// Build the session. Opens the telemetry log; failure to do so is
    /// reported and the session runs without it.
    pub fn new(config: &AppConfig, mut headset: H, drone: D, telemetry: TelemetryStore) -> Self {
        headset.set_output_frequency(config.headset.output_frequency);
        headset.set_output_filter(config.headset.output_filter);
        log::info!(
            "Translation reads {:?} head position, {:?} deadband",
            config.mapper.position_reference,
            config.mapper.translation_mode
        );

        let logging = &config.logging;
        let telemetry_log = match TelemetryLogger::create(
            &logging.telemetry_dir(),
            &Local::now(),
            logging.telemetry_include_rotation,
            logging.telemetry_offset_by_origin,
        ) {
            Ok(log) => {
                log::info!("Telemetry log started at {}", log.path().display());
                Some(log)
            }
            Err(e) => {
                log::warn!("Telemetry logging disabled: {}", e);
                None
            }
        };

        Self {
            headset,
            drone,
            telemetry,
            calibration: CalibrationState::new(),
            mapper: ControlMapper::new(config.mapper.clone()),
            headset_config: config.headset.clone(),
            logging_config: config.logging.clone(),
            gaze_log: None,
            telemetry_log,
            ticks: 0,
            gaze_rows: 0,
            telemetry_rows: 0,
            reported_stale: false,
        }
    }

    pub fn tick(&mut self, input: &InputFrame) -> TickReport {
        let snapshot = self.telemetry.latest();
        let pose = self.headset.current_pose();

        if snapshot.is_stale() && !self.reported_stale {
            log::debug!("No drone telemetry yet, using zero defaults");
            self.reported_stale = true;
        }

        self.service_triggers(input, &pose, &snapshot);
        let gaze_rows = self.log_gaze();

        let mapping = self.mapper.map(&pose, &self.calibration, snapshot.sample.yaw());
        let axes = input.manual.apply(mapping.axes).clamped();

        if let Err(e) = self.drone.submit_axes(axes) {
            log::warn!("Axis submission failed: {}", e);
        }
        log::debug!(
            "tick {} lx={:.2} ly={:.2} rx={:.2} ry={:.2} yaw_err={:.3}",
            self.ticks,
            axes.lx,
            axes.ly,
            axes.rx,
            axes.ry,
            mapping.rotation_diff
        );

        self.log_telemetry(&snapshot);
        self.ticks += 1;

        TickReport {
            axes,
            phase: self.phase(),
            logging: self.is_logging(),
            gaze_rows,
            telemetry_stale: snapshot.is_stale(),
            rotation_diff: mapping.rotation_diff,
        }
    }

    fn service_triggers(&mut self, input: &InputFrame, pose: &Pose, snapshot: &TelemetrySnapshot) {
        let triggers = &input.triggers;

        if triggers.calibrate_gaze {
            self.headset.request_calibration(self.headset_config.calibration_mode);
        }

        if triggers.mark_origin {
            if let Err(e) = self.mark_origin(pose, snapshot) {
                log::warn!("{}", e);
            }
        }

        if triggers.toggle_logging {
            let result = if self.is_logging() {
                self.stop_logging()
            } else {
                self.start_logging()
            };
            if let Err(e) = result {
                log::warn!("{}", e);
            }
        }

        if triggers.take_off {
            if let Err(e) = self.drone.take_off() {
                log::warn!("Take-off failed: {}", e);
            }
        }
        if triggers.land {
            if let Err(e) = self.drone.land() {
                log::warn!("Land failed: {}", e);
            }
        }
    }

    /// Capture the shared origin from the current head pose and telemetry.
    pub fn mark_origin(&mut self, pose: &Pose, snapshot: &TelemetrySnapshot) -> TeleopResult<()> {
        if snapshot.is_stale() && !self.calibration.is_calibrated() {
            log::warn!("Capturing origin before any drone telemetry arrived; drone origin is zero");
        }

        let drone_rotation = snapshot.sample.euler();
        self.calibration
            .request_calibration(pose.position, snapshot.sample.position, drone_rotation)?;

        log::info!(
            "Origin captured: headset ({:.3}, {:.3}, {:.3}), drone ({:.3}, {:.3}, {:.3}), drone yaw {:.3}",
            pose.position.x,
            pose.position.y,
            pose.position.z,
            snapshot.sample.position.x,
            snapshot.sample.position.y,
            snapshot.sample.position.z,
            drone_rotation[2]
        );
        Ok(())
    }

    pub fn start_logging(&mut self) -> TeleopResult<()> {
        if self.gaze_log.is_some() {
            return Err(TeleopError::RedundantAction(
                "start logging called while already logging, no new log started".to_string(),
            ));
        }
        let log = GazeLogger::create(&self.logging_config.log_dir, &Local::now())?;
        log::info!("Gaze log started at {}", log.path().display());
        self.gaze_log = Some(log);
        Ok(())
    }

    /// Flush and close the gaze log. Not logging is a silent no-op.
    pub fn stop_logging(&mut self) -> TeleopResult<()> {
        let Some(log) = self.gaze_log.take() else {
            return Ok(());
        };
        let path: PathBuf = log.path().to_path_buf();
        let rows = log.finish()?;
        log::info!("Gaze log ended: {} rows in {}", rows, path.display());
        Ok(())
    }

    /// Drain every gaze sample since the last tick; log them if logging.
    fn log_gaze(&mut self) -> usize {
        let samples = self.headset.drain_samples();
        let Some(log) = self.gaze_log.as_mut() else {
            return 0;
        };

        let origin = self.calibration.headset_origin();
        let mut written = 0;
        let mut failed = false;
        for sample in &samples {
            if let Err(e) = log.log_sample(sample, &origin) {
                log::warn!("Gaze logging stopped: {}", e);
                failed = true;
                break;
            }
            written += 1;
        }
        if failed {
            self.gaze_log = None;
        }
        self.gaze_rows += written as u64;
        written
    }

    fn log_telemetry(&mut self, snapshot: &TelemetrySnapshot) {
        let Some(log) = self.telemetry_log.as_mut() else {
            return;
        };
        match log.append(&snapshot.sample, &self.calibration.drone_origin()) {
            Ok(()) => self.telemetry_rows += 1,
            Err(e) => {
                log::warn!("Telemetry logging stopped: {}", e);
                self.telemetry_log = None;
            }
        }
    }

    pub fn phase(&self) -> ControlPhase {
        if self.calibration.is_calibrated() {
            ControlPhase::Active
        } else {
            ControlPhase::Idle
        }
    }

    pub fn is_logging(&self) -> bool {
        self.gaze_log.is_some()
    }

    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    pub fn headset(&self) -> &H {
        &self.headset
    }

    pub fn drone(&self) -> &D {
        &self.drone
    }

    /// Flush and close both logs.
    pub fn shutdown(mut self) -> SessionSummary {
        if let Err(e) = self.stop_logging() {
            log::warn!("{}", e);
        }
        if let Some(log) = self.telemetry_log.take() {
            let path = log.path().to_path_buf();
            match log.finish() {
                Ok(rows) => log::info!("Telemetry log closed: {} rows in {}", rows, path.display()),
                Err(e) => log::warn!("{}", e),
            }
        }

        let summary = SessionSummary {
            ticks: self.ticks,
            gaze_rows: self.gaze_rows,
            telemetry_rows: self.telemetry_rows,
            calibrated: self.calibration.is_calibrated(),
        };
        log::info!(
            "Session ended: {} ticks, {} gaze rows, {} telemetry rows, calibrated={}",
            summary.ticks,
            summary.gaze_rows,
            summary.telemetry_rows,
            summary.calibrated
        );
        summary
    }
}
