//! Errors raised by transport-level transfer helpers.

use crate::common::ErrorSeverity;

/// Failure of a raw send or receive on a transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The operating system reported an I/O failure
    #[error("I/O error on transport: {message}")]
    Io {
        /// Description of the underlying failure
        message: String,
    },

    /// A read did not complete within the configured time
    #[error("Transport read timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout, 0 when unknown
        timeout_ms: u64,
    },

    /// The peer closed the connection or the device went away
    #[error("Transport disconnected")]
    Disconnected,

    /// The transport was used before `open()` succeeded
    #[error("Transport is not open")]
    NotOpen,
}

impl TransportError {
    /// Create an I/O error from any displayable message.
    pub fn io(message: impl Into<String>) -> Self {
        TransportError::Io {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(timeout_ms: u64) -> Self {
        TransportError::Timeout { timeout_ms }
    }

    /// Whether this is the timeout sub-kind.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TransportError::Io { .. } => ErrorSeverity::Error,
            TransportError::Timeout { .. } => ErrorSeverity::Warning,
            TransportError::Disconnected => ErrorSeverity::Critical,
            TransportError::NotOpen => ErrorSeverity::Error,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportError::Timeout { timeout_ms: 0 },
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof => TransportError::Disconnected,
            ErrorKind::NotConnected => TransportError::NotOpen,
            _ => TransportError::Io {
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kind_mapping() {
        let err: TransportError = std::io::Error::from(std::io::ErrorKind::TimedOut).into();
        assert!(err.is_timeout());

        let err: TransportError = std::io::Error::from(std::io::ErrorKind::WouldBlock).into();
        assert!(err.is_timeout());

        let err: TransportError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert_eq!(err, TransportError::Disconnected);

        let err: TransportError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, TransportError::Io { .. }));
    }

    #[test]
    fn test_severity() {
        assert_eq!(TransportError::Disconnected.severity(), ErrorSeverity::Critical);
        assert_eq!(TransportError::timeout(100).severity(), ErrorSeverity::Warning);
    }
}
