// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Best-effort MQTT publish channel.
//!
//! Samples are broadcast on a fixed per-device topic with QoS 0 and no
//! acknowledgment wait. A channel that cannot be established, or that
//! dies mid-session, stays down: delivery is sacrificed before cadence.

use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Publish-channel errors. These only surface at connect time; a
/// session-time publish never raises.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("broker refused or dropped the connection: {0}")]
    Refused(String),

    #[error("no broker response within {0:?}")]
    Timeout(Duration),

    #[error("could not spawn event-loop thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Fire-and-forget publisher on a fixed per-device topic.
///
/// The connection event loop runs on a drain thread. There is no
/// reconnection: one connection error ends the event loop and every
/// later publish is silently dropped.
pub struct PublishChannel {
    client: Client,
    drain: Option<JoinHandle<()>>,
    topic: String,
}

impl PublishChannel {
    /// Connect to the broker and wait, bounded by `timeout`, for its
    /// session acknowledgment.
    pub fn connect(
        host: &str,
        port: u16,
        device_id: &str,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let mut options = MqttOptions::new(format!("imucap-{device_id}"), host, port);
        options.set_keep_alive(Duration::from_secs(5));

        let (client, mut connection) = Client::new(options, 64);
        let (ack_tx, ack_rx) = mpsc::channel();

        let drain = thread::Builder::new()
            .name("imucap-mqtt".into())
            .spawn(move || {
                let mut ack = Some(ack_tx);
                for event in connection.iter() {
                    match event {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            if let Some(tx) = ack.take() {
                                let _ = tx.send(Ok(()));
                            }
                        }
                        Ok(_) => {}
                        Err(err) => {
                            match ack.take() {
                                Some(tx) => {
                                    let _ = tx.send(Err(err.to_string()));
                                }
                                None => tracing::debug!("publish channel closed: {err}"),
                            }
                            // One failure ends the event loop; there is
                            // no reconnection for the rest of the session.
                            break;
                        }
                    }
                }
            })?;

        match ack_rx.recv_timeout(timeout) {
            Ok(Ok(())) => Ok(Self {
                client,
                drain: Some(drain),
                topic: format!("imu/{device_id}"),
            }),
            Ok(Err(reason)) => {
                // The drain thread has already broken out of its loop.
                let _ = drain.join();
                Err(ChannelError::Refused(reason))
            }
            Err(_) => {
                // Leave the drain thread to wind down on its own once the
                // dropped client closes the request queue.
                Err(ChannelError::Timeout(timeout))
            }
        }
    }

    /// Topic every sample is published on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Queue one payload, QoS 0.
    ///
    /// Failures (full queue, dead channel) are dropped per message so the
    /// caller's cadence is never disturbed.
    pub fn publish(&mut self, payload: &str) {
        let outcome = self.client.try_publish(
            self.topic.as_str(),
            QoS::AtMostOnce,
            false,
            payload.as_bytes().to_vec(),
        );
        if let Err(err) = outcome {
            tracing::debug!("dropped publish on {}: {err}", self.topic);
        }
    }

    /// Disconnect from the broker and stop the drain thread.
    pub fn disconnect(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.client.disconnect();
        if let Some(handle) = self.drain.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PublishChannel {
    fn drop(&mut self) {
        self.shutdown();
    }
}
