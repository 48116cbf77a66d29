//! Semicolon-delimited gaze log.
//!
//! One header row, then one row per gaze sample in arrival order. Fields
//! never contain the delimiter; embedded CR/LF are stripped.

use crate::eccentricity::eccentricity;
use crate::error::{TeleopError, TeleopResult};
use crate::types::{format_vec3, EyeSample, GazeSample, Vec3};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const GAZE_COLUMNS: [&str; 12] = [
    "CaptureTime",
    "HeadsetPos",
    "HeadsetRotation",
    "CombinedGazeForward",
    "FocusDistance",
    "FocusStability",
    "CalcXEccentricity",
    "CalcYEccentricity",
    "LeftForward",
    "RightForward",
    "LeftPosition",
    "RightPosition",
];

pub const GAZE_DELIMITER: &str = ";";

const VECTOR_DECIMALS: usize = 6;
const DEGREE_DECIMALS: usize = 1;
const EYE_ORIGIN_DECIMALS: usize = 3;

/// `ET-{yyyy}-{MM}-{dd}-{HH}-{mm}.csv`
pub fn gaze_log_file_name(now: &DateTime<Local>) -> String {
    now.format("ET-%Y-%m-%d-%H-%M.csv").to_string()
}

fn eye_field(eye: &EyeSample, value: &Vec3, decimals: usize) -> String {
    if eye.valid {
        format_vec3(value, decimals)
    } else {
        String::new()
    }
}

/// Build the row fields for one sample. `headset_origin` is subtracted from
/// the headset position (zero before calibration).
pub fn gaze_row(sample: &GazeSample, headset_origin: &Vec3) -> Vec<String> {
    let (ecc_x, ecc_y) = match eccentricity(&sample.combined_forward) {
        Ok(ecc) => (
            format!("{:.prec$}", ecc.x_deg, prec = DEGREE_DECIMALS),
            format!("{:.prec$}", ecc.y_deg, prec = DEGREE_DECIMALS),
        ),
        Err(e) => {
            log::debug!("Eccentricity left blank: {}", e);
            (String::new(), String::new())
        }
    };

    vec![
        sample.capture_time.timestamp_millis().to_string(),
        format_vec3(&(sample.headset.position - headset_origin), VECTOR_DECIMALS),
        format_vec3(&sample.headset.rotation, VECTOR_DECIMALS),
        format_vec3(&sample.combined_forward, VECTOR_DECIMALS),
        sample.focus_distance.to_string(),
        sample.focus_stability.to_string(),
        ecc_x,
        ecc_y,
        eye_field(&sample.left, &sample.left.forward, VECTOR_DECIMALS),
        eye_field(&sample.right, &sample.right.forward, VECTOR_DECIMALS),
        eye_field(&sample.left, &sample.left.origin, EYE_ORIGIN_DECIMALS),
        eye_field(&sample.right, &sample.right.origin, EYE_ORIGIN_DECIMALS),
    ]
}

/// Strip line breaks from each field and join with the delimiter.
pub fn join_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| f.as_ref().replace(['\r', '\n'], ""))
        .collect::<Vec<_>>()
        .join(GAZE_DELIMITER)
}

/// Open gaze log file.
pub struct GazeLogger {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: u64,
}

impl GazeLogger {
    /// Create `dir` if needed and open the log named after `now`.
    ///
    /// Names only resolve to the minute, so a log restarted within the same
    /// minute appends to the existing file. The header is written only when
    /// the file is empty.
    pub fn create(dir: &Path, now: &DateTime<Local>) -> TeleopResult<Self> {
        fs::create_dir_all(dir).map_err(|e| TeleopError::log_io(dir, e))?;
        let path = dir.join(gaze_log_file_name(now));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| TeleopError::log_io(&path, e))?;
        let fresh = file.metadata().map_err(|e| TeleopError::log_io(&path, e))?.len() == 0;

        let mut logger = GazeLogger {
            path,
            writer: BufWriter::new(file),
            rows: 0,
        };
        if fresh {
            logger.write_line(&GAZE_COLUMNS)?;
        }
        Ok(logger)
    }

    pub fn log_sample(&mut self, sample: &GazeSample, headset_origin: &Vec3) -> TeleopResult<()> {
        let row = gaze_row(sample, headset_origin);
        self.write_line(&row)?;
        self.rows += 1;
        Ok(())
    }

    fn write_line<S: AsRef<str>>(&mut self, fields: &[S]) -> TeleopResult<()> {
        writeln!(self.writer, "{}", join_fields(fields)).map_err(|e| TeleopError::log_io(&self.path, e))
    }

    /// Flush and close; returns the number of sample rows written.
    pub fn finish(mut self) -> TeleopResult<u64> {
        self.writer.flush().map_err(|e| TeleopError::log_io(&self.path, e))?;
        Ok(self.rows)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for GazeLogger {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush gaze log {}: {}", self.path.display(), e);
        }
    }
}
