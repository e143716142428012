//! Protocol-transfer and feature-dispatch engine for spectrometer drivers.
//!
//! The crate is a small plumbing layer between application-facing features and
//! byte transports:
//!
//! - [`Transfer`] moves one fixed-length block of bytes in one direction.
//! - [`Transaction`] runs an ordered list of transfers as one operation.
//! - [`Exchange`] is the common interface of both, plus any protocol-specific
//!   exchange (for example a variable-length OBP message round trip).
//! - [`Bus`] owns the [`TransferHelper`]s of one transport attachment and routes
//!   an exchange to one of them by [`ProtocolHint`].
//! - [`FeatureImpl`] selects the [`ProtocolHelper`] for a requested [`Protocol`]
//!   and translates protocol errors into feature errors.
//!
//! Vendor wire formats live in separate crates and plug in by implementing the
//! capability traits in [`interfaces`].

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod bus;
pub mod codec;
pub mod data;
pub mod exchange;
pub mod feature;
pub mod geometry;
pub mod hint;
pub mod interfaces;
pub mod protocol;
pub mod transaction;
pub mod transfer;

pub use bus::{Bus, DeviceLocator, HelperRegistry, TransferHelper};
pub use codec::{ByteReader, ByteWriter, fixed_to_f64};
pub use data::{Data, DataVector, UnitDescriptor};
pub use exchange::{Exchange, execute, query};
pub use feature::FeatureImpl;
pub use geometry::{IntegrationTimeLimits, MAX_BINNING_FACTOR, PixelWord, SpectrumGeometry};
pub use hint::ProtocolHint;
pub use protocol::{Protocol, ProtocolHelper};
pub use transaction::Transaction;
pub use transfer::{Direction, ParameterSetter, Transfer};

pub use specbus_errors::{
    FeatureError, FeatureResult, ProtocolError, ProtocolResult, TransportError, TransportResult,
};
