// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Capture session configuration.
//!
//! Loadable from YAML; every field has a default so a minimal file (or
//! none at all) is enough to run.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Top-level capture configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Device identifier; scopes the publish topic.
    pub device_id: String,

    /// Log file path. `None` picks `data/<device>-<timestamp>.csv`.
    pub log_path: Option<PathBuf>,

    /// Publish broker host.
    pub broker_host: String,

    /// Publish broker port.
    pub broker_port: u16,

    /// Sampling interval in milliseconds.
    pub interval_ms: u64,

    /// First sequence number issued.
    pub counter_start: u64,

    /// Broker acknowledgment wait in milliseconds.
    pub connect_timeout_ms: u64,

    /// Zero the orientation once after the source comes up.
    pub tare: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: "joint-1".to_string(),
            log_path: None,
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1883,
            interval_ms: 10,
            counter_start: 0,
            connect_timeout_ms: 3000,
            tare: false,
        }
    }
}

/// Configuration parsing errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: CaptureConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Sampling interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Broker connect timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Configured log path, or the timestamped default.
    pub fn effective_log_path(&self) -> PathBuf {
        match &self.log_path {
            Some(path) => path.clone(),
            None => default_log_path(&self.device_id),
        }
    }
}

/// `data/<device>-<UTC timestamp>.csv`
pub fn default_log_path(device_id: &str) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S");
    PathBuf::from("data").join(format!("{device_id}-{stamp}.csv"))
}
