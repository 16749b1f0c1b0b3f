//! Error types for the telemetry boundary

/// Result type alias
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Telemetry error types
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Socket or thread setup failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Datagram was not a JSON object
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
