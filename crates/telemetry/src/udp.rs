//! UDP receiver that keeps a [`TelemetryTable`] current.
//!
//! # Wire format
//!
//! One JSON object per datagram, mapping key names to numbers:
//!
//! ```text
//! {"X": 8.23, "Y": 4.115, "Theta": 1.5708, "VX": -0.12, "VY": 2.5}
//! ```
//!
//! Keys are written into the table under the configured namespace. Missing
//! keys keep their previous value; optional keys that were never sent stay
//! absent.
//!
//! The receiver runs on its own thread and is the only writer. When no
//! datagram arrives within the disconnect timeout the table is flagged as
//! disconnected, which makes [`TableSource`](crate::TableSource) report
//! `None` until traffic resumes.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::{qualified_key, TelemetryTable, DEFAULT_NAMESPACE};

/// Largest datagram accepted; pose publications are well under 1 KB.
const MAX_DATAGRAM_SIZE: usize = 4096;

/// Upper bound on how long the receive loop blocks before checking for
/// shutdown and timeouts.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the UDP receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Address to bind (e.g. "0.0.0.0:5810")
    pub bind_addr: String,
    /// Namespace keys are stored under
    pub namespace: String,
    /// Silence longer than this marks the source disconnected (s)
    pub disconnect_timeout: f64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5810".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            disconnect_timeout: 1.0,
        }
    }
}

/// Decode one datagram into `(key, value)` pairs.
///
/// Members that are not numbers are skipped with a warning.
pub fn decode_datagram(bytes: &[u8]) -> Result<Vec<(String, f64)>> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(bytes)?;
    let mut values = Vec::with_capacity(object.len());
    for (key, value) in object {
        match value.as_f64() {
            Some(number) => values.push((key, number)),
            None => warn!("Ignoring non-numeric telemetry key {key}: {value}"),
        }
    }
    Ok(values)
}

/// UDP receiver writing decoded publications into a table.
pub struct UdpTableReceiver {
    socket: UdpSocket,
    table: TelemetryTable,
    namespace: String,
    disconnect_timeout: Duration,
    running: Arc<AtomicBool>,
}

impl UdpTableReceiver {
    /// Bind the socket. Nothing is received until [`run`](Self::run) or
    /// [`spawn`](Self::spawn).
    pub fn bind(config: &ReceiverConfig, table: TelemetryTable, running: Arc<AtomicBool>) -> Result<Self> {
        let socket = UdpSocket::bind(&config.bind_addr)?;
        let disconnect_timeout = Duration::from_secs_f64(config.disconnect_timeout.clamp(0.01, 3600.0));
        socket.set_read_timeout(Some(POLL_INTERVAL.min(disconnect_timeout)))?;

        info!("Telemetry receiver bound to {}", socket.local_addr()?);

        Ok(Self {
            socket,
            table,
            namespace: config.namespace.clone(),
            disconnect_timeout,
            running,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Run the receive loop on a named background thread.
    pub fn spawn(self) -> Result<ProducerHandle> {
        let running = Arc::clone(&self.running);
        let thread = thread::Builder::new()
            .name("telemetry-udp".to_string())
            .spawn(move || self.run())?;
        Ok(ProducerHandle::new(running, thread))
    }

    /// Run the receive loop (blocking) until the running flag clears.
    pub fn run(self) {
        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut last_rx: Option<Instant> = None;

        self.table.set_connected(false);
        info!("Waiting for telemetry on {}", self.namespace);

        while self.running.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buffer) {
                Ok((len, src)) => {
                    let now = Instant::now();
                    if self.apply(&buffer[..len], now) {
                        if !self.table.is_connected() {
                            info!("Telemetry connected from {src}");
                            self.table.set_connected(true);
                        }
                        last_rx = Some(now);
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => {
                    error!("Telemetry receive error: {e}");
                }
            }

            let silent = last_rx.is_some_and(|t| t.elapsed() > self.disconnect_timeout);
            if silent && self.table.is_connected() {
                warn!(
                    "No telemetry for {:.1} s, marking source disconnected",
                    self.disconnect_timeout.as_secs_f64()
                );
                self.table.set_connected(false);
            }
        }

        debug!("Telemetry receiver stopped");
    }

    /// Decode and store one datagram; returns whether anything was written.
    fn apply(&self, bytes: &[u8], now: Instant) -> bool {
        match decode_datagram(bytes) {
            Ok(values) if !values.is_empty() => {
                let qualified: Vec<(String, f64)> = values
                    .into_iter()
                    .map(|(key, value)| (qualified_key(&self.namespace, &key), value))
                    .collect();
                self.table.put_many(&qualified, now);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Dropping malformed telemetry datagram: {e}");
                false
            }
        }
    }
}

/// Handle to a background producer thread; stops and joins it on drop.
#[derive(Debug)]
pub struct ProducerHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ProducerHandle {
    pub fn new(running: Arc<AtomicBool>, thread: JoinHandle<()>) -> Self {
        Self { running, thread: Some(thread) }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the thread to stop and wait for it.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Telemetry producer thread panicked");
            }
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
