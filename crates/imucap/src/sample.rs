// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The per-reading sample record and its log/wire representation.
//!
//! # Record layout
//!
//! One header line, then one comma-separated data line per sample:
//!
//! ```text
//! counter,capture_time_ms,recorded_at_time_ms,
//! accel_x,accel_y,accel_z,
//! gyro_x,gyro_y,gyro_z,
//! mag_x,mag_y,mag_z,
//! yaw,pitch,roll
//! ```
//!
//! Values keep their plain numeric representation; no quoting, no
//! escaping. The publish payload is byte-identical to the log line.

use crate::math::EulerAngles;
use crate::source::RawReading;
use thiserror::Error;

/// Versioned header naming every field in order. Always the first line
/// of a log file.
pub const CSV_HEADER: &str = "counter,capture_time_ms,recorded_at_time_ms,\
accel_x,accel_y,accel_z,\
gyro_x,gyro_y,gyro_z,\
mag_x,mag_y,mag_z,\
yaw,pitch,roll";

/// Fields per data line.
pub const FIELD_COUNT: usize = 15;

/// One timestamped IMU reading.
///
/// Built by the acquisition loop, stamped and serialized by the sink
/// writer, then discarded; nothing retains samples after the write.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Per-source sequence number.
    pub counter: u64,
    /// Identifier reported by the producing source. Not part of the log
    /// line; the publish topic carries it instead.
    pub device_id: String,
    /// Wall-clock milliseconds when the physical reading was taken.
    pub capture_time_ms: i64,
    /// Wall-clock milliseconds when the record reached the sink writer.
    /// Stamped by the writer at hand-off; always >= `capture_time_ms`.
    pub recorded_at_time_ms: i64,
    /// Linear acceleration (x, y, z).
    pub accel: [f64; 3],
    /// Angular velocity (x, y, z).
    pub gyro: [f64; 3],
    /// Magnetic field (x, y, z).
    pub mag: [f64; 3],
    /// Orientation derived from the raw quaternion.
    pub euler: EulerAngles,
}

/// Data-line parse errors.
#[derive(Debug, Error)]
pub enum LineParseError {
    #[error("expected {} fields, got {0}", FIELD_COUNT)]
    FieldCount(usize),

    #[error("field `{0}` is not numeric")]
    BadField(&'static str),
}

impl Sample {
    /// Assemble a record for one raw reading. `recorded_at_time_ms`
    /// stays zero until the sink writer stamps it.
    pub fn new(
        counter: u64,
        device_id: impl Into<String>,
        capture_time_ms: i64,
        reading: RawReading,
        euler: EulerAngles,
    ) -> Self {
        Self {
            counter,
            device_id: device_id.into(),
            capture_time_ms,
            recorded_at_time_ms: 0,
            accel: reading.accel,
            gyro: reading.gyro,
            mag: reading.mag,
            euler,
        }
    }

    /// Serialize as one log/publish line, fields in [`CSV_HEADER`] order.
    pub fn csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.counter,
            self.capture_time_ms,
            self.recorded_at_time_ms,
            self.accel[0],
            self.accel[1],
            self.accel[2],
            self.gyro[0],
            self.gyro[1],
            self.gyro[2],
            self.mag[0],
            self.mag[1],
            self.mag[2],
            self.euler.yaw,
            self.euler.pitch,
            self.euler.roll,
        )
    }

    /// Parse a data line by field position. Inverse of [`Sample::csv_line`]
    /// up to the device identifier, which the line does not carry.
    pub fn parse_line(line: &str, device_id: &str) -> Result<Self, LineParseError> {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != FIELD_COUNT {
            return Err(LineParseError::FieldCount(fields.len()));
        }

        let num = |idx: usize, name: &'static str| -> Result<f64, LineParseError> {
            fields[idx]
                .parse::<f64>()
                .map_err(|_| LineParseError::BadField(name))
        };

        Ok(Self {
            counter: fields[0]
                .parse()
                .map_err(|_| LineParseError::BadField("counter"))?,
            device_id: device_id.to_string(),
            capture_time_ms: fields[1]
                .parse()
                .map_err(|_| LineParseError::BadField("capture_time_ms"))?,
            recorded_at_time_ms: fields[2]
                .parse()
                .map_err(|_| LineParseError::BadField("recorded_at_time_ms"))?,
            accel: [num(3, "accel_x")?, num(4, "accel_y")?, num(5, "accel_z")?],
            gyro: [num(6, "gyro_x")?, num(7, "gyro_y")?, num(8, "gyro_z")?],
            mag: [num(9, "mag_x")?, num(10, "mag_y")?, num(11, "mag_z")?],
            euler: EulerAngles {
                yaw: num(12, "yaw")?,
                pitch: num(13, "pitch")?,
                roll: num(14, "roll")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quaternion;

    fn reading() -> RawReading {
        RawReading {
            accel: [1.0, 2.0, 3.0],
            gyro: [4.0, 5.0, 6.0],
            mag: [7.0, 8.0, 9.0],
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_header_names_fields_in_order() {
        assert_eq!(CSV_HEADER.split(',').count(), FIELD_COUNT);
        assert!(CSV_HEADER.starts_with("counter,capture_time_ms,recorded_at_time_ms,"));
        assert!(CSV_HEADER.ends_with("yaw,pitch,roll"));
    }

    #[test]
    fn test_line_field_order() {
        let mut sample = Sample::new(
            1523,
            "joint-1",
            1711111111111,
            reading(),
            EulerAngles {
                yaw: 10.5,
                pitch: 11.25,
                roll: 12.125,
            },
        );
        sample.recorded_at_time_ms = 1711111111120;

        let line = sample.csv_line();
        assert!(line.starts_with("1523,1711111111111,"));
        assert_eq!(
            line,
            "1523,1711111111111,1711111111120,1,2,3,4,5,6,7,8,9,10.5,11.25,12.125"
        );
    }

    #[test]
    fn test_line_round_trip() {
        let mut sample = Sample::new(
            7,
            "joint-1",
            1711111111111,
            RawReading {
                accel: [0.125, -9.81, 3.5e-3],
                gyro: [0.1, 0.2, -0.3],
                mag: [22.4, -3.17, 41.0],
                orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            },
            EulerAngles {
                yaw: -179.999,
                pitch: 0.001,
                roll: 90.0,
            },
        );
        sample.recorded_at_time_ms = 1711111111115;

        let parsed = Sample::parse_line(&sample.csv_line(), "joint-1").expect("parse");
        assert_eq!(parsed, sample);
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(matches!(
            Sample::parse_line("1,2,3", "dev"),
            Err(LineParseError::FieldCount(3))
        ));

        let bad = "x,2,3,4,5,6,7,8,9,10,11,12,13,14,15";
        assert!(matches!(
            Sample::parse_line(bad, "dev"),
            Err(LineParseError::BadField("counter"))
        ));
    }
}
