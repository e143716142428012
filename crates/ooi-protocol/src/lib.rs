//! Legacy OOI spectrometer command set.
//!
//! Commands are single opcode bytes with little-endian arguments sent to a
//! control endpoint; spectra are read as one fixed-length block from a
//! spectrum endpoint and end in the sync byte `0x69`.
//!
//! This crate is I/O-free: every operation is expressed as an
//! [`Exchange`](specbus_core::Exchange) and executed on whatever
//! [`Bus`](specbus_core::Bus) the caller supplies.

#![deny(static_mut_refs)]

pub mod decode;
pub mod exchanges;
pub mod helpers;
pub mod ids;
pub mod models;

pub use decode::{
    PixelLayout, check_sync_byte, decode_le_pairs, decode_packet_interleaved, decode_with_sync,
};
pub use exchanges::{IntegrationTimeExchange, IntegrationWord, OoiStatus};
pub use helpers::{
    OoiCoefficientsProtocol, OoiEepromProtocol, OoiSaturationProtocol, OoiSerialNumberProtocol,
    OoiSpectrometerProtocol, OoiStrobeLampProtocol, OoiTemperatureProtocol,
};
pub use ids::{ALL_HINTS, OOI_PROTOCOL, SYNC_BYTE, hints, opcodes};
pub use models::OoiModel;
