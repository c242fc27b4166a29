// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simulated IMU source replaying prerecorded rows.
//!
//! Lets the whole pipeline run without hardware: a headerless CSV is
//! replayed cyclically, restarting from the first row when exhausted.
//! Row schema (13 columns):
//!
//! ```text
//! accel_x,accel_y,accel_z,gyro_x,gyro_y,gyro_z,mag_x,mag_y,mag_z,quat_w,quat_x,quat_y,quat_z
//! ```
//!
//! Rows carry the raw quaternion rather than derived angles, so replayed
//! samples exercise the same conversion path as hardware samples.

use crate::math::Quaternion;
use crate::source::{ImuSource, RawReading, SourceError};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Columns per replay row.
pub const SIM_FIELDS: usize = 13;

/// Default identifier reported by simulated sources.
pub const SIM_DEVICE_ID: &str = "sim-imu-0";

/// Cyclic replay of a fixed-schema CSV as raw readings.
pub struct SimSource {
    reader: BufReader<File>,
    path: PathBuf,
    device_id: String,
}

impl SimSource {
    /// Open a replay file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        tracing::info!("Replaying IMU readings from {}", path.display());

        Ok(Self {
            reader: BufReader::new(file),
            path,
            device_id: SIM_DEVICE_ID.to_string(),
        })
    }

    /// Override the synthetic device identifier.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    fn next_row(&mut self) -> Result<String, SourceError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            self.reader.seek(SeekFrom::Start(0))?;
            tracing::debug!("replay wrapped to start of {}", self.path.display());

            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(SourceError::ConnectionLost(format!(
                    "replay file {} is empty",
                    self.path.display()
                )));
            }
        }
        Ok(line)
    }
}

impl ImuSource for SimSource {
    fn read_raw(&mut self) -> Result<RawReading, SourceError> {
        let row = self.next_row()?;
        let row = row.trim();

        let values: Vec<f64> = row
            .split(',')
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| SourceError::Malformed(format!("non-numeric field in row `{row}`")))?;

        if values.len() != SIM_FIELDS {
            return Err(SourceError::Malformed(format!(
                "expected {SIM_FIELDS} fields, got {} in row `{row}`",
                values.len()
            )));
        }

        Ok(RawReading {
            accel: [values[0], values[1], values[2]],
            gyro: [values[3], values[4], values[5]],
            mag: [values[6], values[7], values[8]],
            orientation: Quaternion::new(values[9], values[10], values[11], values[12]),
        })
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn replay_file(rows: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("replay.csv");
        let mut file = File::create(&path).expect("create");
        file.write_all(rows.as_bytes()).expect("write");
        (dir, path)
    }

    #[test]
    fn test_replay_cycles_through_rows() {
        let (_dir, path) = replay_file(
            "1,2,3,4,5,6,7,8,9,1,0,0,0\n\
             9,8,7,6,5,4,3,2,1,0,1,0,0\n",
        );
        let mut source = SimSource::open(&path).expect("open");

        let first = source.read_raw().expect("row 1");
        let second = source.read_raw().expect("row 2");
        let wrapped = source.read_raw().expect("wrap");

        assert_eq!(first.accel, [1.0, 2.0, 3.0]);
        assert_eq!(second.accel, [9.0, 8.0, 7.0]);
        assert_eq!(wrapped.accel, first.accel);
        assert_eq!(wrapped.orientation, Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_malformed_row_is_transient() {
        let (_dir, path) = replay_file("1,2,3,oops,5,6,7,8,9,1,0,0,0\n");
        let mut source = SimSource::open(&path).expect("open");

        let err = source.read_raw().expect_err("malformed");
        assert!(err.is_transient());
    }

    #[test]
    fn test_short_row_is_transient() {
        let (_dir, path) = replay_file("1,2,3\n");
        let mut source = SimSource::open(&path).expect("open");

        let err = source.read_raw().expect_err("short row");
        assert!(err.is_transient());
    }

    #[test]
    fn test_empty_file_is_a_hard_failure() {
        let (_dir, path) = replay_file("");
        let mut source = SimSource::open(&path).expect("open");

        let err = source.read_raw().expect_err("empty");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_device_id_override() {
        let (_dir, path) = replay_file("1,2,3,4,5,6,7,8,9,1,0,0,0\n");
        let source = SimSource::open(&path).expect("open").with_device_id("bench-7");

        assert_eq!(source.device_id(), "bench-7");
    }
}
