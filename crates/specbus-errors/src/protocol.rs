//! Errors raised by exchanges and protocol codecs.
//!
//! Every transport failure seen by a transfer is translated into one of these
//! variants before it leaves the protocol layer.

use crate::common::ErrorSeverity;
use crate::transport::TransportError;

/// Protocol-layer error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Sending bytes to the device failed
    #[error("Failed to write to bus.")]
    WriteFailed {
        /// Transport failure that caused this error
        #[source]
        source: TransportError,
    },

    /// Receiving bytes from the device failed
    #[error("Failed to read from bus.")]
    ReadFailed {
        /// Transport failure that caused this error
        #[source]
        source: TransportError,
    },

    /// The device did not answer in time
    #[error("Timed out during {direction} transfer")]
    Timeout {
        /// "write" or "read"
        direction: &'static str,
        /// Configured transport timeout, 0 when unknown
        timeout_ms: u64,
    },

    /// The transport moved fewer (or more) bytes than requested
    #[error("Short {direction} transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer {
        /// "write" or "read"
        direction: &'static str,
        /// Requested length
        expected: usize,
        /// Length reported by the transport
        actual: usize,
    },

    /// A raw direction code did not name a known direction
    #[error("Invalid transfer direction specified.")]
    InvalidDirection(u8),

    /// Received bytes did not match the expected framing
    #[error("Protocol format error: {0}")]
    Format(String),

    /// No transfer helper on the bus serves the exchange's hints
    #[error("No transfer helper on bus matches protocol hint {hint}")]
    BusMismatch {
        /// Description of the first hint of the exchange
        hint: String,
    },

    /// `set_dynamic_parameter` was called on a transfer without a setter
    #[error("Transfer has no dynamic parameter setter")]
    MissingParameterSetter,

    /// The device answered with an error status
    #[error("Device reported error {code:#06x}: {message}")]
    Device {
        /// Device error number
        code: u16,
        /// Human-readable description
        message: String,
    },

    /// A request could not be encoded
    #[error("Cannot encode request: {0}")]
    Encoding(String),
}

impl ProtocolError {
    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        ProtocolError::Format(message.into())
    }

    /// Create an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        ProtocolError::Encoding(message.into())
    }

    /// Create a bus mismatch error for the given hint description.
    pub fn bus_mismatch(hint: impl Into<String>) -> Self {
        ProtocolError::BusMismatch { hint: hint.into() }
    }

    /// Translate a failed send.
    pub fn from_write(source: TransportError) -> Self {
        match source {
            TransportError::Timeout { timeout_ms } => ProtocolError::Timeout {
                direction: "write",
                timeout_ms,
            },
            other => ProtocolError::WriteFailed { source: other },
        }
    }

    /// Translate a failed receive.
    pub fn from_read(source: TransportError) -> Self {
        match source {
            TransportError::Timeout { timeout_ms } => ProtocolError::Timeout {
                direction: "read",
                timeout_ms,
            },
            other => ProtocolError::ReadFailed { source: other },
        }
    }

    /// Whether the stream can no longer be trusted to be in sync with the device.
    pub fn is_desynchronizing(&self) -> bool {
        matches!(
            self,
            ProtocolError::Format(_) | ProtocolError::ShortTransfer { .. }
        )
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProtocolError::WriteFailed { source } | ProtocolError::ReadFailed { source } => {
                source.severity()
            }
            ProtocolError::Timeout { .. } => ErrorSeverity::Warning,
            ProtocolError::BusMismatch { .. } | ProtocolError::MissingParameterSetter => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::Error,
        }
    }
}
