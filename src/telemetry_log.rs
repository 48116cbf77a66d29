//! Tab-delimited drone telemetry log, one row per control tick.

use crate::error::{TeleopError, TeleopResult};
use crate::types::{format_vec3, DroneTelemetrySample, Vec3};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const TELEMETRY_COLUMNS: [&str; 9] = [
    "posX", "posY", "posZ", "velX", "velY", "velZ", "velN", "velE", "velD",
];
const ROTATION_COLUMN: &str = "rotation";
const ROTATION_DECIMALS: usize = 6;

/// `Data-{yyyy-MM-dd-HH-mm-ss}.csv`
pub fn telemetry_log_file_name(now: &DateTime<Local>) -> String {
    now.format("Data-%Y-%m-%d-%H-%M-%S.csv").to_string()
}

pub fn telemetry_header(include_rotation: bool) -> String {
    let mut columns: Vec<&str> = TELEMETRY_COLUMNS.to_vec();
    if include_rotation {
        columns.push(ROTATION_COLUMN);
    }
    columns.join("\t")
}

/// One row; `origin` is subtracted from the position.
pub fn telemetry_row(sample: &DroneTelemetrySample, origin: &Vec3, include_rotation: bool) -> String {
    let position = sample.position - origin;
    let mut fields: Vec<String> = position
        .iter()
        .chain(sample.velocity_body.iter())
        .chain(sample.velocity_ned.iter())
        .map(|v| v.to_string())
        .collect();
    if include_rotation {
        fields.push(format_vec3(&sample.euler(), ROTATION_DECIMALS));
    }
    fields.join("\t")
}

pub struct TelemetryLogger {
    path: PathBuf,
    writer: BufWriter<File>,
    include_rotation: bool,
    offset_by_origin: bool,
    rows: u64,
}

impl TelemetryLogger {
    pub fn create(
        dir: &Path,
        now: &DateTime<Local>,
        include_rotation: bool,
        offset_by_origin: bool,
    ) -> TeleopResult<Self> {
        fs::create_dir_all(dir).map_err(|e| TeleopError::log_io(dir, e))?;
        let path = dir.join(telemetry_log_file_name(now));
        let file = File::create(&path).map_err(|e| TeleopError::log_io(&path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", telemetry_header(include_rotation))
            .map_err(|e| TeleopError::log_io(&path, e))?;

        Ok(TelemetryLogger {
            path,
            writer,
            include_rotation,
            offset_by_origin,
            rows: 0,
        })
    }

    /// Append the snapshot. `drone_origin` only applies when the logger
    /// was opened with origin offsetting.
    pub fn append(&mut self, sample: &DroneTelemetrySample, drone_origin: &Vec3) -> TeleopResult<()> {
        let origin = if self.offset_by_origin {
            *drone_origin
        } else {
            Vec3::zeros()
        };
        let row = telemetry_row(sample, &origin, self.include_rotation);
        writeln!(self.writer, "{}", row).map_err(|e| TeleopError::log_io(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn finish(mut self) -> TeleopResult<u64> {
        self.writer.flush().map_err(|e| TeleopError::log_io(&self.path, e))?;
        Ok(self.rows)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TelemetryLogger {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush telemetry log {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nalgebra::UnitQuaternion;
    use std::env;

    fn sample() -> DroneTelemetrySample {
        DroneTelemetrySample {
            position: Vec3::new(1.5, 2.0, -0.5),
            velocity_body: Vec3::new(0.1, 0.0, 0.0),
            velocity_ned: Vec3::new(0.0, 0.1, 0.0),
            orientation: *UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5).quaternion(),
        }
    }

    #[test]
    fn test_file_name() {
        let now = Local.with_ymd_and_hms(2024, 5, 31, 14, 3, 9).unwrap();
        assert_eq!(telemetry_log_file_name(&now), "Data-2024-05-31-14-03-09.csv");
    }

    #[test]
    fn test_header() {
        assert_eq!(
            telemetry_header(false),
            "posX\tposY\tposZ\tvelX\tvelY\tvelZ\tvelN\tvelE\tvelD"
        );
        assert!(telemetry_header(true).ends_with("\tvelD\trotation"));
    }

    #[test]
    fn test_row_offsets_position() {
        let row = telemetry_row(&sample(), &Vec3::new(0.5, 0.0, 0.0), false);
        let fields: Vec<&str> = row.split('\t').collect();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[0], "1");
        assert_eq!(fields[1], "2");
        assert_eq!(fields[2], "-0.5");
        assert_eq!(fields[3], "0.1");
        assert_eq!(fields[7], "0.1");
    }

    #[test]
    fn test_row_rotation_column() {
        let row = telemetry_row(&sample(), &Vec3::zeros(), true);
        let fields: Vec<&str> = row.split('\t').collect();
        assert_eq!(fields.len(), 10);
        assert!(fields[9].starts_with('('));
        assert!(fields[9].ends_with(", 0.500000)"));
    }

    #[test]
    fn test_logger_writes_rows() {
        let dir = env::temp_dir().join("head_teleop_telemetry_log_test");
        let _ = fs::remove_dir_all(&dir);

        let mut logger = TelemetryLogger::create(&dir, &Local::now(), true, false).unwrap();
        let path = logger.path().to_path_buf();
        logger.append(&sample(), &Vec3::new(100.0, 0.0, 0.0)).unwrap();
        logger.append(&DroneTelemetrySample::default(), &Vec3::zeros()).unwrap();
        assert_eq!(logger.finish().unwrap(), 2);

        let contents = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("posX\t"));
        // Origin ignored when offsetting is off
        assert!(lines[1].starts_with("1.5\t2\t"));
    }
}
