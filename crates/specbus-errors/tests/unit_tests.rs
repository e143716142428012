//! Display, source chain and conversion tests for every error layer.

use insta::assert_snapshot;
use specbus_errors::{
    Result,
    common::{ErrorCategory, ErrorSeverity, SpecbusError},
    feature::FeatureError,
    protocol::ProtocolError,
    transport::TransportError,
};

mod transport_error_tests {
    use super::*;

    #[test]
    fn test_display_messages() -> Result<()> {
        assert_snapshot!(TransportError::timeout(500).to_string(), @"Transport read timed out after 500ms");
        assert_snapshot!(TransportError::Disconnected.to_string(), @"Transport disconnected");
        assert_snapshot!(TransportError::io("EPIPE").to_string(), @"I/O error on transport: EPIPE");
        Ok(())
    }
}

mod protocol_error_tests {
    use super::*;

    #[test]
    fn test_transfer_failure_messages() -> Result<()> {
        let write = ProtocolError::from_write(TransportError::Disconnected);
        let read = ProtocolError::from_read(TransportError::Disconnected);
        assert_snapshot!(write.to_string(), @"Failed to write to bus.");
        assert_snapshot!(read.to_string(), @"Failed to read from bus.");
        Ok(())
    }

    #[test]
    fn test_invalid_direction_message() -> Result<()> {
        assert_snapshot!(ProtocolError::InvalidDirection(7).to_string(), @"Invalid transfer direction specified.");
        Ok(())
    }

    #[test]
    fn test_short_transfer_message() -> Result<()> {
        let err = ProtocolError::ShortTransfer {
            direction: "read",
            expected: 4097,
            actual: 4096,
        };
        assert_snapshot!(err.to_string(), @"Short read transfer: expected 4097 bytes, got 4096");
        assert!(err.is_desynchronizing());
        Ok(())
    }

    #[test]
    fn test_device_error_message() -> Result<()> {
        let err = ProtocolError::Device {
            code: 5,
            message: "message type not recognized".into(),
        };
        assert_snapshot!(err.to_string(), @"Device reported error 0x0005: message type not recognized");
        Ok(())
    }
}

mod feature_error_tests {
    use super::*;

    #[test]
    fn test_protocol_not_found_message() -> Result<()> {
        let err = FeatureError::ProtocolNotFound {
            feature: "gpio",
            protocol: "OOI".into(),
        };
        assert_snapshot!(err.to_string(), @"Feature 'gpio' has no implementation for protocol OOI");
        Ok(())
    }

    #[test]
    fn test_control_wraps_protocol_error() -> Result<()> {
        let err = FeatureError::control(
            "spectrometer",
            "set integration time",
            ProtocolError::from_write(TransportError::Disconnected),
        );
        assert_snapshot!(err.to_string(), @"spectrometer: set integration time failed: Failed to write to bus.");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        Ok(())
    }
}

mod top_level_tests {
    use super::*;

    #[test]
    fn test_from_conversions() -> Result<()> {
        let err: SpecbusError = FeatureError::illegal_argument("pin", 40, "only 10 pins").into();
        assert_eq!(err.category(), ErrorCategory::Feature);

        let err: SpecbusError = std::io::Error::other("disk").into();
        assert_eq!(err.category(), ErrorCategory::IO);

        let err = SpecbusError::config("missing bus section");
        assert_eq!(err.to_string(), "Configuration error: missing bus section");
        Ok(())
    }

    #[test]
    fn test_question_mark_propagation() {
        fn inner() -> Result<()> {
            Err(ProtocolError::format("bad start bytes"))?;
            Ok(())
        }
        let err = match inner() {
            Ok(()) => panic!("expected an error"),
            Err(e) => e,
        };
        assert_eq!(err.category(), ErrorCategory::Protocol);
    }
}
