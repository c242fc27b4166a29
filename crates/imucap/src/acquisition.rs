// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-cadence acquisition driving the sample pipeline.
//!
//! One thread polls the source, derives the orientation angles, stamps
//! and numbers the reading, and hands it to the sink writer. Transient
//! sensor faults skip a reading; everything else ends the session.

use crate::counter::SampleCounter;
use crate::math::{self, MathError};
use crate::sample::Sample;
use crate::source::{ImuSource, SourceError};
use crate::writer::{SinkWriter, WriterError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default sampling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

/// Fatal faults that end a capture session.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("sensor failure: {0}")]
    Source(#[from] SourceError),

    #[error("orientation conversion failed: {0}")]
    Math(#[from] MathError),

    #[error("log write failed: {0}")]
    Writer(#[from] WriterError),
}

/// Drift-free fixed-interval scheduler.
///
/// Tick n wakes at `start + n * interval`, anchored to session start
/// rather than to the previous tick. An iteration that overruns its slot
/// makes the following ticks fire back-to-back until the schedule is
/// caught up; ticks are never skipped.
#[derive(Debug)]
pub struct CadenceTimer {
    start: Instant,
    interval_nanos: u64,
    tick: u64,
}

impl CadenceTimer {
    /// Anchor a new schedule at the current instant.
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval_nanos: interval.as_nanos() as u64,
            tick: 0,
        }
    }

    /// Deadline of the next tick.
    pub fn next_deadline(&self) -> Instant {
        let offset = self.interval_nanos.saturating_mul(self.tick + 1);
        self.start + Duration::from_nanos(offset)
    }

    /// Sleep until the next tick's deadline, or return immediately when
    /// the schedule is already behind.
    pub fn wait(&mut self) {
        let deadline = self.next_deadline();
        self.tick += 1;

        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Polls a source at fixed cadence and feeds every sample to the writer.
pub struct AcquisitionLoop<S> {
    source: S,
    counter: SampleCounter,
    interval: Duration,
    tare_on_start: bool,
}

impl<S: ImuSource> AcquisitionLoop<S> {
    /// New loop around `source` with the default interval and a counter
    /// starting at zero.
    pub fn new(source: S) -> Self {
        Self {
            source,
            counter: SampleCounter::default(),
            interval: DEFAULT_INTERVAL,
            tare_on_start: false,
        }
    }

    /// Set the sampling interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start sequence numbers at `start`.
    pub fn counter_start(mut self, start: u64) -> Self {
        self.counter = SampleCounter::new(start);
        self
    }

    /// Zero the source's orientation once before the first sample.
    pub fn tare_on_start(mut self, enable: bool) -> Self {
        self.tare_on_start = enable;
        self
    }

    /// Run until `running` is cleared or a fatal fault occurs, returning
    /// the number of samples produced.
    ///
    /// Transient sensor errors skip the reading and keep the cadence. A
    /// lost sensor, a degenerate quaternion or a failed log write ends
    /// the session; the caller releases resources afterwards.
    pub fn run(&mut self, writer: &mut SinkWriter, running: &AtomicBool) -> Result<u64, CaptureError> {
        if self.tare_on_start {
            self.source.tare()?;
            tracing::info!("Tared {}", self.source.device_id());
        }

        let mut timer = CadenceTimer::new(self.interval);
        let mut produced = 0u64;
        let mut last_report = Instant::now();

        while running.load(Ordering::SeqCst) {
            match self.source.read_raw() {
                Ok(raw) => {
                    let capture_time_ms = chrono::Utc::now().timestamp_millis();
                    let euler = math::to_euler(raw.orientation)?;
                    let counter = self.counter.next();

                    let sample = Sample::new(
                        counter,
                        self.source.device_id(),
                        capture_time_ms,
                        raw,
                        euler,
                    );
                    writer.write(sample)?;
                    produced += 1;
                }
                Err(err) if err.is_transient() => {
                    tracing::debug!("skipped reading: {err}");
                }
                Err(err) => return Err(err.into()),
            }

            if last_report.elapsed() >= Duration::from_secs(10) {
                tracing::info!("Captured {produced} samples");
                last_report = Instant::now();
            }

            timer.wait();
        }

        Ok(produced)
    }
}
