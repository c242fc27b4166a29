// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! imucap - fixed-cadence IMU capture pipeline.
//!
//! Polls an IMU source at a fixed interval, converts its orientation
//! quaternion to yaw/pitch/roll, and fans each numbered sample out to a
//! durable CSV log and a best-effort MQTT topic.
//!
//! # Pipeline
//!
//! ```text
//! ImuSource --raw reading--> AcquisitionLoop --Sample--> SinkWriter
//!                              |  to_euler()               |  CSV log (fatal on error)
//!                              |  SampleCounter            |  MQTT publish (best effort)
//! ```
//!
//! # Quick Start
//!
//! ```bash
//! # Replay a recorded file at 10 ms cadence
//! imucap-capture --sim data/sample_data.csv
//!
//! # Name the device and broker explicitly
//! imucap-capture --sim data/sample_data.csv --device joint-1 --broker-host 192.168.1.76
//! ```

pub mod acquisition;
pub mod channel;
pub mod config;
pub mod counter;
pub mod math;
pub mod sample;
pub mod sim;
pub mod source;
pub mod writer;

pub use acquisition::{AcquisitionLoop, CadenceTimer, CaptureError, DEFAULT_INTERVAL};
pub use channel::{ChannelError, PublishChannel};
pub use config::{CaptureConfig, ConfigError};
pub use counter::SampleCounter;
pub use math::{normalize, to_euler, EulerAngles, MathError, Quaternion};
pub use sample::{Sample, CSV_HEADER};
pub use sim::{SimSource, SIM_DEVICE_ID};
pub use source::{ImuSource, RawReading, SourceError};
pub use writer::{SinkWriter, WriterConfig, WriterError, WriterStats};
