use crate::error::{TeleopError, TeleopResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound for the frame clock; the tick period must stay non-zero.
pub const MAX_TICK_HZ: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mapper: MapperConfig,
    pub headset: HeadsetConfig,
    pub logging: LoggingConfig,
    /// Frame clock driving the control tick.
    pub tick_hz: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mapper: MapperConfig::default(),
            headset: HeadsetConfig::default(),
            logging: LoggingConfig::default(),
            tick_hz: 60,
        }
    }
}

impl AppConfig {
    /// Load config from a JSON file, or return defaults if it does not exist.
    pub fn load(path: &Path) -> TeleopResult<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TeleopError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(contents: &str) -> TeleopResult<Self> {
        let config: AppConfig =
            serde_json::from_str(contents).map_err(|e| TeleopError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TeleopResult<()> {
        self.mapper.validate()?;
        if self.tick_hz == 0 || self.tick_hz > MAX_TICK_HZ {
            return Err(TeleopError::Config(format!(
                "tick_hz must be in 1..={}, got {}",
                MAX_TICK_HZ, self.tick_hz
            )));
        }
        Ok(())
    }
}

/// Which head position the translation mapping reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionReference {
    /// Raw tracking-space position, ignoring the calibrated origin.
    Absolute,
    /// Position minus the headset origin captured at calibration.
    OriginRelative,
}

/// How translation commands react inside the deadband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationMode {
    /// Compare against zero; keep the previous command inside the band.
    Latching,
    /// Compare against the previous sample; zero inside the band.
    Incremental,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Yaw error (rad) at or below which the yaw axis is zero.
    pub deadband_yaw: f64,
    /// Yaw error (rad) at or above which the full turn gain applies.
    pub full_turn_threshold: f64,
    pub small_turn_gain: f64,
    pub full_turn_gain: f64,
    /// Head displacement (m) that must be exceeded to move.
    pub deadband_pos: f64,
    pub pos_gain: f64,
    pub position_reference: PositionReference,
    pub translation_mode: TranslationMode,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            deadband_yaw: 0.05,
            full_turn_threshold: 0.35,
            small_turn_gain: 0.3,
            full_turn_gain: 1.0,
            deadband_pos: 0.02,
            pos_gain: 0.4,
            position_reference: PositionReference::Absolute,
            translation_mode: TranslationMode::Latching,
        }
    }
}

impl MapperConfig {
    pub fn validate(&self) -> TeleopResult<()> {
        if self.deadband_yaw < 0.0 || self.deadband_pos < 0.0 {
            return Err(TeleopError::Config("deadbands must be non-negative".to_string()));
        }
        if self.full_turn_threshold <= self.deadband_yaw {
            return Err(TeleopError::Config(format!(
                "full_turn_threshold ({}) must exceed deadband_yaw ({})",
                self.full_turn_threshold, self.deadband_yaw
            )));
        }
        for (name, gain) in [
            ("small_turn_gain", self.small_turn_gain),
            ("full_turn_gain", self.full_turn_gain),
            ("pos_gain", self.pos_gain),
        ] {
            if !(0.0..=1.0).contains(&gain) {
                return Err(TeleopError::Config(format!("{name} must be within [0, 1], got {gain}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeCalibrationMode {
    /// 10 dots without priors
    Legacy,
    /// 5 dots
    Fast,
    /// Quickest, least accurate
    OneDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeOutputFrequency {
    MaximumSupported,
    Hz100,
    Hz200,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeOutputFilter {
    /// Smoothed gaze
    Standard,
    /// Unfiltered gaze
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadsetConfig {
    pub output_frequency: GazeOutputFrequency,
    pub calibration_mode: GazeCalibrationMode,
    pub output_filter: GazeOutputFilter,
}

impl Default for HeadsetConfig {
    fn default() -> Self {
        Self {
            output_frequency: GazeOutputFrequency::MaximumSupported,
            calibration_mode: GazeCalibrationMode::Fast,
            output_filter: GazeOutputFilter::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Gaze logs land here; telemetry logs in `telemetry_subdir` below it.
    pub log_dir: PathBuf,
    pub telemetry_subdir: String,
    pub telemetry_include_rotation: bool,
    pub telemetry_offset_by_origin: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("Logs"),
            telemetry_subdir: "drone_log".to_string(),
            telemetry_include_rotation: true,
            telemetry_offset_by_origin: true,
        }
    }
}

impl LoggingConfig {
    pub fn telemetry_dir(&self) -> PathBuf {
        self.log_dir.join(&self.telemetry_subdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mapper.deadband_yaw, 0.05);
        assert_eq!(config.mapper.pos_gain, 0.4);
        assert_eq!(config.mapper.position_reference, PositionReference::Absolute);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = AppConfig::from_json(
            r#"{ "mapper": { "pos_gain": 0.6, "position_reference": "origin_relative" }, "tick_hz": 90 }"#,
        )
        .unwrap();
        assert_eq!(config.tick_hz, 90);
        assert_eq!(config.mapper.pos_gain, 0.6);
        assert_eq!(config.mapper.deadband_pos, 0.02);
        assert_eq!(config.mapper.position_reference, PositionReference::OriginRelative);
        assert_eq!(config.headset.calibration_mode, GazeCalibrationMode::Fast);
    }

    #[test]
    fn test_rejects_inverted_yaw_thresholds() {
        let result = AppConfig::from_json(
            r#"{ "mapper": { "deadband_yaw": 0.5, "full_turn_threshold": 0.35 } }"#,
        );
        assert!(matches!(result, Err(TeleopError::Config(_))));
    }

    #[test]
    fn test_tick_rate_bounds() {
        let mut config = AppConfig::default();
        config.tick_hz = 0;
        assert!(config.validate().is_err());
        config.tick_hz = MAX_TICK_HZ;
        assert!(config.validate().is_ok());
        config.tick_hz = 2_000_000_000;
        assert!(matches!(config.validate(), Err(TeleopError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(AppConfig::from_json("{ tick_hz: ").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("head_teleop_no_such_config.json");
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_telemetry_dir() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.telemetry_dir(), PathBuf::from("Logs").join("drone_log"));
    }
}
