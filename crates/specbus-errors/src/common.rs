//! Top-level error type, classification and context helpers.

use core::fmt;

use crate::{FeatureError, ProtocolError, TransportError};

/// Top-level error type that can wrap every specbus sub-error.
#[derive(Debug, thiserror::Error)]
pub enum SpecbusError {
    /// Transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Feature errors
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    /// I/O errors outside of a transfer (configuration files, sockets setup)
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl SpecbusError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SpecbusError::Transport(_) => ErrorCategory::Transport,
            SpecbusError::Protocol(_) => ErrorCategory::Protocol,
            SpecbusError::Feature(_) => ErrorCategory::Feature,
            SpecbusError::Io(_) => ErrorCategory::IO,
            SpecbusError::Config(_) => ErrorCategory::Config,
            SpecbusError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SpecbusError::Transport(e) => e.severity(),
            SpecbusError::Protocol(e) => e.severity(),
            SpecbusError::Feature(e) => e.severity(),
            SpecbusError::Io(_) | SpecbusError::Config(_) | SpecbusError::Other(_) => {
                ErrorSeverity::Error
            }
        }
    }

    /// Check if this error is recoverable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        SpecbusError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        SpecbusError::Other(msg.into())
    }
}

impl From<std::io::Error> for SpecbusError {
    fn from(e: std::io::Error) -> Self {
        SpecbusError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Transport errors
    Transport = 0,
    /// Protocol errors
    Protocol = 1,
    /// Feature errors
    Feature = 2,
    /// Configuration errors
    Config = 3,
    /// I/O errors
    IO = 4,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transport => write!(f, "Transport"),
            ErrorCategory::Protocol => write!(f, "Protocol"),
            ErrorCategory::Feature => write!(f, "Feature"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, device communication is no longer trustworthy
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Context information for errors.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation that was being performed
    pub operation: String,
    /// Additional context key-value pairs
    pub context: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key-value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (key, value) in &self.context {
            write!(f, ", {key}: {value}")?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, ctx: ErrorContext) -> Result<T, SpecbusError>;

    /// Add context with an operation name.
    fn with_context(self, operation: impl Into<String>) -> Result<T, SpecbusError>;
}

impl<T, E: Into<SpecbusError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, SpecbusError> {
        self.map_err(|e| {
            let err: SpecbusError = e.into();
            SpecbusError::Other(format!("{ctx}: {err}"))
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, SpecbusError> {
        self.context(ErrorContext::new(operation))
    }
}
