//! Prelude module for convenient error handling imports.
//!
//! ```
//! use specbus_errors::prelude::*;
//!
//! fn open_config(path: &str) -> Result<String> {
//!     if path.is_empty() {
//!         return Err(SpecbusError::config("empty configuration path"));
//!     }
//!     Ok(path.to_string())
//! }
//! # assert!(open_config("").is_err());
//! ```

pub use crate::{
    FeatureResult, ProtocolResult, Result, TransportResult,
    common::{ErrorCategory, ErrorContext, ErrorSeverity, ResultExt, SpecbusError},
    feature::FeatureError,
    protocol::ProtocolError,
    transport::TransportError,
};
