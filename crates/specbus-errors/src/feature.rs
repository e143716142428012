//! Errors visible to application code calling a feature.

use crate::common::ErrorSeverity;
use crate::protocol::ProtocolError;

/// Feature-layer error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// The feature has no protocol helper for the requested protocol
    #[error("Feature '{feature}' has no implementation for protocol {protocol}")]
    ProtocolNotFound {
        /// Feature name
        feature: &'static str,
        /// Requested protocol name
        protocol: String,
    },

    /// A protocol error occurred while executing a feature operation
    #[error("{feature}: {operation} failed: {source}")]
    Control {
        /// Feature name
        feature: &'static str,
        /// Operation name
        operation: &'static str,
        /// Protocol failure
        #[source]
        source: ProtocolError,
    },

    /// The protocol helper does not offer any of the capability variants needed
    #[error("Feature '{feature}' cannot perform {capability} with the selected protocol")]
    CapabilityUnavailable {
        /// Feature name
        feature: &'static str,
        /// Capability that was probed
        capability: &'static str,
    },

    /// The caller supplied an out-of-range index or value
    #[error("Illegal argument {name}={value}: {reason}")]
    IllegalArgument {
        /// Argument name
        name: &'static str,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl FeatureError {
    /// Create an illegal argument error.
    pub fn illegal_argument(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        FeatureError::IllegalArgument {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a protocol error raised by `operation`.
    pub fn control(feature: &'static str, operation: &'static str, source: ProtocolError) -> Self {
        FeatureError::Control {
            feature,
            operation,
            source,
        }
    }

    /// The wrapped protocol error, if this is a control error.
    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        match self {
            FeatureError::Control { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FeatureError::ProtocolNotFound { .. } => ErrorSeverity::Error,
            FeatureError::Control { source, .. } => source.severity(),
            FeatureError::CapabilityUnavailable { .. } => ErrorSeverity::Info,
            FeatureError::IllegalArgument { .. } => ErrorSeverity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_preserves_inner_message() {
        let err = FeatureError::control(
            "spectrometer",
            "read spectrum",
            ProtocolError::format("missing sync byte 0x69"),
        );
        let msg = err.to_string();
        assert!(msg.contains("read spectrum"));
        assert!(msg.contains("missing sync byte 0x69"));
        assert!(err.protocol_error().is_some());
    }

    #[test]
    fn test_illegal_argument() {
        let err = FeatureError::illegal_argument("slot", 42, "must be below 32");
        assert_eq!(err.to_string(), "Illegal argument slot=42: must be below 32");
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }
}
