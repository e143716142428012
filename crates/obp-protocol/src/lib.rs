//! OBP spectrometer protocol.
//!
//! Every request and reply is a framed message with a 44-byte header, an
//! optional payload, a 16-byte checksum field and a fixed footer (see
//! [`message`]). Small arguments and results travel as immediate data inside
//! the header.
//!
//! Like the OOI crate this one is I/O-free; helpers build
//! [`ObpTransaction`]s and execute them on the caller's bus.

#![deny(static_mut_refs)]

pub mod ids;
pub mod message;
pub mod peripherals;
pub mod spectrometer;
pub mod transaction;

pub use ids::{ALL_HINTS, OBP_PROTOCOL, error_text, flags, hints, message_types};
pub use message::ObpMessage;
pub use peripherals::{
    IntensityMode, ObpAcquisitionDelayProtocol, ObpGpioProtocol, ObpIpv4Protocol,
    ObpLightSourceProtocol, ObpSaturationProtocol, ObpSerialNumberProtocol, ObpTemperatureProtocol,
};
pub use spectrometer::{
    ObpBufferedSpectrumProtocol, ObpCoefficientsProtocol, ObpPixelBinningProtocol,
    ObpSpectrometerProtocol, decode_metadata_spectrum,
};
pub use transaction::{ObpRead, ObpTransaction, Reply, query_data, send_command};
