// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The sensor source contract.
//!
//! The acquisition loop depends only on the [`ImuSource`] capability.
//! Hardware drivers sit behind a thin adapter implementing it, and the
//! simulated source implements it for offline runs, so the pipeline
//! never knows which kind of collaborator feeds it.

use crate::math::Quaternion;
use thiserror::Error;

/// One raw reading from a sensor source.
#[derive(Debug, Clone, Copy)]
pub struct RawReading {
    /// Linear acceleration (x, y, z).
    pub accel: [f64; 3],
    /// Angular velocity (x, y, z).
    pub gyro: [f64; 3],
    /// Magnetic field (x, y, z).
    pub mag: [f64; 3],
    /// Orientation as reported by the sensor, not yet normalized.
    pub orientation: Quaternion,
}

/// Sensor source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// An isolated malformed packet. The reading is skipped and the next
    /// cycle retries.
    #[error("malformed sensor packet: {0}")]
    Malformed(String),

    /// The physical or bus connection is gone.
    #[error("sensor connection lost: {0}")]
    ConnectionLost(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Transient errors are absorbed by the acquisition loop; everything
    /// else ends the session.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Malformed(_))
    }
}

/// A provider of raw IMU readings.
pub trait ImuSource {
    /// The most recent available reading. May block briefly.
    fn read_raw(&mut self) -> Result<RawReading, SourceError>;

    /// Identifier recorded with every sample from this source.
    fn device_id(&self) -> &str;

    /// Zero the current orientation as the new reference.
    ///
    /// Sources without a zeroing capability keep this default no-op.
    fn tare(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}
