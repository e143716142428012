//! Centralized error types for specbus
//!
//! Errors are layered the same way the driver stack is layered, and each layer
//! boundary translates the error of the layer below into its own type:
//!
//! - [`transport`]: failures reported by a `TransferHelper` (I/O, timeout, disconnect)
//! - [`protocol`]: failures of a `Transfer`/`Transaction` or of a protocol codec
//! - [`feature`]: failures visible to application code calling a `Feature`
//! - [`common`]: the top-level error, classification, severity and context helpers
//!
//! A transport error never crosses the transfer boundary unwrapped, and a
//! protocol error never crosses the feature boundary unwrapped.
//!
//! # Example
//!
//! ```
//! use specbus_errors::prelude::*;
//!
//! fn check_slot(slot: usize) -> FeatureResult<usize> {
//!     if slot > 31 {
//!         return Err(FeatureError::illegal_argument("slot", slot, "must be at most 31"));
//!     }
//!     Ok(slot)
//! }
//!
//! assert!(check_slot(40).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod feature;
pub mod prelude;
pub mod protocol;
pub mod transport;

pub use common::{ErrorCategory, ErrorContext, ErrorSeverity, ResultExt, SpecbusError};
pub use feature::FeatureError;
pub use protocol::ProtocolError;
pub use transport::TransportError;

/// A specialized `Result` type for application-level specbus operations.
pub type Result<T> = std::result::Result<T, SpecbusError>;

/// Result of a `TransferHelper` send or receive.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Result of an exchange or protocol codec.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Result of a feature operation.
pub type FeatureResult<T> = std::result::Result<T, FeatureError>;
