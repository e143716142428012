//! Error types for specctl

use specbus_errors::{FeatureError, SpecbusError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Capability not supported: {0}")]
    Unsupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Device error: {0}")]
    Device(#[source] FeatureError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::DeviceUnavailable(_) => 2,
            CliError::Unsupported(_) => 3,
            CliError::InvalidArgument(_) | CliError::InvalidConfiguration(_) | CliError::JsonError(_) => 4,
            CliError::Device(_) | CliError::IoError(_) => 1,
        }
    }
}

impl From<FeatureError> for CliError {
    fn from(error: FeatureError) -> Self {
        match error {
            FeatureError::IllegalArgument { .. } => CliError::InvalidArgument(error.to_string()),
            FeatureError::CapabilityUnavailable { .. } | FeatureError::ProtocolNotFound { .. } => {
                CliError::Unsupported(error.to_string())
            }
            other => CliError::Device(other),
        }
    }
}

impl From<SpecbusError> for CliError {
    fn from(error: SpecbusError) -> Self {
        match error {
            SpecbusError::Feature(e) => e.into(),
            SpecbusError::Io(e) => CliError::IoError(e),
            SpecbusError::Transport(e) => CliError::DeviceUnavailable(e.to_string()),
            other => CliError::InvalidConfiguration(other.to_string()),
        }
    }
}
