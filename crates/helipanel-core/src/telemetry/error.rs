//! Telemetry errors

use thiserror::Error;

/// Errors that can occur while talking to the simulator
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A telnet request did not finish within its budget
    #[error("Request timed out")]
    Timeout,

    /// The telnet session could not be opened
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The simulator hung up
    #[error("Connection closed by simulator")]
    ConnectionClosed,

    /// A datagram had the wrong size
    #[error("Invalid packet length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Received length
        actual: usize,
    },

    /// A datagram carried an unsupported version
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Supported version
        expected: u32,
        /// Version in the datagram
        actual: u32,
    },

    /// A property reply did not parse as a number
    #[error("Property '{path}' returned a non-numeric value: '{value}'")]
    InvalidValue {
        /// Property path that was read
        path: String,
        /// Raw reply line
        value: String,
    },

    /// Socket error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<tokio::time::error::Elapsed> for TelemetryError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        TelemetryError::Timeout
    }
}
