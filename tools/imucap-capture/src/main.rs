// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! imucap-capture - Poll an IMU and fan samples out to CSV + MQTT.
//!
//! Usage:
//!   imucap-capture --sim data/sample_data.csv
//!   imucap-capture --sim data/sample_data.csv --device joint-1 --output data/run1.csv
//!   imucap-capture --config capture.yaml --tare --duration 60

use clap::Parser;
use imucap::{AcquisitionLoop, CaptureConfig, SimSource, SinkWriter, WriterConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "imucap-capture")]
#[command(about = "Capture IMU samples to a CSV log and an MQTT topic")]
#[command(version)]
struct Args {
    /// YAML config file; the flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a recorded CSV instead of attaching hardware
    #[arg(long, value_name = "FILE")]
    sim: Option<PathBuf>,

    /// Device identifier (also scopes the publish topic)
    #[arg(short, long)]
    device: Option<String>,

    /// Output log path (default: data/<device>-<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// MQTT broker host
    #[arg(long)]
    broker_host: Option<String>,

    /// MQTT broker port
    #[arg(long)]
    broker_port: Option<u16>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// First sequence number
    #[arg(long)]
    counter_start: Option<u64>,

    /// Zero the orientation once before the first sample
    #[arg(long)]
    tare: bool,

    /// Duration to capture (seconds, 0 = until Ctrl+C)
    #[arg(long, default_value = "0")]
    duration: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .init();

    // Config file first, flag overrides second
    let mut config = match &args.config {
        Some(path) => CaptureConfig::from_file(path)?,
        None => CaptureConfig::default(),
    };
    if let Some(device) = &args.device {
        config.device_id = device.clone();
    }
    if let Some(output) = &args.output {
        config.log_path = Some(output.clone());
    }
    if let Some(host) = &args.broker_host {
        config.broker_host = host.clone();
    }
    if let Some(port) = args.broker_port {
        config.broker_port = port;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = interval_ms;
    }
    if let Some(counter_start) = args.counter_start {
        config.counter_start = counter_start;
    }
    if args.tare {
        config.tare = true;
    }

    let Some(sim_path) = &args.sim else {
        anyhow::bail!("no hardware backend is wired into this build; replay a file with --sim");
    };

    let log_path = config.effective_log_path();

    if !args.quiet {
        info!("imucap capture v{}", env!("CARGO_PKG_VERSION"));
        info!("Device: {}", config.device_id);
        info!("Output: {}", log_path.display());
        info!("Broker: {}:{}", config.broker_host, config.broker_port);
        info!("Interval: {} ms", config.interval_ms);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    if args.duration > 0 {
        let r = Arc::clone(&running);
        let limit = Duration::from_secs(args.duration);
        std::thread::spawn(move || {
            std::thread::sleep(limit);
            r.store(false, Ordering::SeqCst);
        });
    }

    let writer_config = WriterConfig::new(&log_path)
        .device_id(config.device_id.clone())
        .broker(config.broker_host.clone(), config.broker_port)
        .connect_timeout(config.connect_timeout());
    let mut writer = SinkWriter::create(&writer_config)?;

    let source = SimSource::open(sim_path)?.with_device_id(config.device_id.clone());

    if !args.quiet {
        info!("Capturing. Press Ctrl+C to stop.");
    }

    let mut acquisition = AcquisitionLoop::new(source)
        .interval(config.interval())
        .counter_start(config.counter_start)
        .tare_on_start(config.tare);
    let outcome = acquisition.run(&mut writer, &running);

    // Release both sinks before surfacing any capture fault.
    let stats = writer.finish()?;

    if !args.quiet {
        info!("Capture stopped");
        info!("  Samples: {}", stats.samples_written);
        info!("  Published: {}", stats.published);
        info!("  Duration: {:.1}s", stats.duration_secs);
        info!("  Throughput: {:.1} samples/s", stats.samples_per_second);
        info!("  File: {}", log_path.display());
    }

    outcome?;
    Ok(())
}
