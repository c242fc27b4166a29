// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dual-sink sample writer: durable CSV log plus best-effort publish.
//!
//! The log is the durable source of truth: a failed append aborts the
//! session. The publish side is optional and per-message best-effort; a
//! broker that cannot be reached at construction leaves the session
//! log-only.

use crate::channel::PublishChannel;
use crate::sample::{Sample, CSV_HEADER};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Sink writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Log file path.
    pub log_path: PathBuf,

    /// Device identifier scoping the publish topic.
    pub device_id: String,

    /// Publish broker host.
    pub broker_host: String,

    /// Publish broker port.
    pub broker_port: u16,

    /// How long to wait for the broker acknowledgment before settling
    /// into log-only operation.
    pub connect_timeout: Duration,
}

impl WriterConfig {
    /// Create a writer config with defaults for everything but the path.
    pub fn new<P: AsRef<Path>>(log_path: P) -> Self {
        Self {
            log_path: log_path.as_ref().to_path_buf(),
            device_id: "joint-1".to_string(),
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1883,
            connect_timeout: Duration::from_secs(3),
        }
    }

    /// Set the device identifier.
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// Set the broker endpoint.
    pub fn broker(mut self, host: impl Into<String>, port: u16) -> Self {
        self.broker_host = host.into();
        self.broker_port = port;
        self
    }

    /// Set the broker connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Writer errors. Only the log side raises; publish faults are contained
/// in the channel.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session statistics, finalized by [`SinkWriter::finish`].
#[derive(Debug, Clone, Default)]
pub struct WriterStats {
    /// Samples appended to the log.
    pub samples_written: u64,

    /// Log bytes written, header excluded.
    pub bytes_written: u64,

    /// Samples handed to the publish channel.
    pub published: u64,

    /// Session duration in seconds.
    pub duration_secs: f64,

    /// Samples per second (average).
    pub samples_per_second: f64,
}

/// Writes each sample to the log and, when a channel is up, publishes
/// the identical line on the per-device topic.
///
/// Both sinks are released on drop no matter how the session ended.
pub struct SinkWriter {
    log: BufWriter<File>,
    log_path: PathBuf,
    channel: Option<PublishChannel>,
    started: Instant,
    stats: WriterStats,
}

impl SinkWriter {
    /// Open the log, write the header line, and try the publish channel.
    ///
    /// A connection failure is logged and leaves the channel absent for
    /// the rest of the session; only log construction faults are fatal.
    pub fn create(config: &WriterConfig) -> Result<Self, WriterError> {
        if let Some(parent) = config.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut log = BufWriter::new(File::create(&config.log_path)?);
        writeln!(log, "{CSV_HEADER}")?;
        tracing::info!("Logging samples to {}", config.log_path.display());

        tracing::info!(
            "Connecting to broker at {}:{}",
            config.broker_host,
            config.broker_port
        );
        let channel = match PublishChannel::connect(
            &config.broker_host,
            config.broker_port,
            &config.device_id,
            config.connect_timeout,
        ) {
            Ok(channel) => {
                tracing::info!("Established publish channel on {}", channel.topic());
                Some(channel)
            }
            Err(err) => {
                tracing::warn!(
                    "Could not establish publish channel to {}:{} ({err}); continuing log-only",
                    config.broker_host,
                    config.broker_port
                );
                None
            }
        };

        Ok(Self {
            log,
            log_path: config.log_path.clone(),
            channel,
            started: Instant::now(),
            stats: WriterStats::default(),
        })
    }

    /// Whether the publish channel came up at construction.
    pub fn is_publishing(&self) -> bool {
        self.channel.is_some()
    }

    /// Persist one sample.
    ///
    /// Stamps `recorded_at_time_ms` at hand-off, appends the log line,
    /// then publishes the same line if the channel is up. Log faults are
    /// fatal; publish faults are dropped per message.
    pub fn write(&mut self, mut sample: Sample) -> Result<(), WriterError> {
        sample.recorded_at_time_ms = chrono::Utc::now().timestamp_millis();

        let line = sample.csv_line();
        self.log.write_all(line.as_bytes())?;
        self.log.write_all(b"\n")?;

        if let Some(channel) = self.channel.as_mut() {
            channel.publish(&line);
            self.stats.published += 1;
        }

        self.stats.samples_written += 1;
        self.stats.bytes_written += line.len() as u64 + 1;
        Ok(())
    }

    /// Statistics so far. Duration and rate are filled in by `finish`.
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Flush and close both sinks, returning final statistics.
    pub fn finish(mut self) -> Result<WriterStats, WriterError> {
        self.log.flush()?;
        if let Some(channel) = self.channel.take() {
            channel.disconnect();
        }

        let mut stats = self.stats.clone();
        stats.duration_secs = self.started.elapsed().as_secs_f64();
        if stats.duration_secs > 0.0 {
            stats.samples_per_second = stats.samples_written as f64 / stats.duration_secs;
        }

        tracing::info!(
            "Closed {} after {} samples",
            self.log_path.display(),
            stats.samples_written
        );
        Ok(stats)
    }
}

impl Drop for SinkWriter {
    /// Backstop for sessions that end without `finish` (fatal fault or
    /// interrupt): flush the log and disconnect the channel.
    fn drop(&mut self) {
        if let Err(err) = self.log.flush() {
            tracing::warn!(
                "flush of {} failed during cleanup: {err}",
                self.log_path.display()
            );
        }
        if let Some(channel) = self.channel.take() {
            channel.disconnect();
        }
    }
}
