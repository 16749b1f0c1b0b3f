//! Telemetry boundary for the field display
//!
//! This crate provides:
//! - A thread-safe key-value table of named numbers, the shape in which pose
//!   telemetry arrives
//! - The `SampleSource` adapter that turns table snapshots into samples
//! - A UDP/JSON receiver that keeps the table current from the network
//! - A simulated publisher that drives the table (or a socket) along a path

pub mod error;
pub mod sim;
pub mod source;
pub mod table;
pub mod udp;

pub use error::{Result, TelemetryError};
pub use sim::{Publication, SimulatedPublisher, SimulationConfig};
pub use source::{SampleSource, ScriptedSource, TableSource};
pub use table::{keys, qualified_key, Entry, TelemetryTable, DEFAULT_NAMESPACE};
pub use udp::{decode_datagram, ProducerHandle, ReceiverConfig, UdpTableReceiver};
