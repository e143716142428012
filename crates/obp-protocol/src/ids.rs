//! OBP protocol identity, routing hints, header constants and message types.

use specbus_core::{Protocol, ProtocolHint};

pub const OBP_PROTOCOL: Protocol = Protocol::new(2, "OBP");

pub mod hints {
    use specbus_core::ProtocolHint;

    pub const CONTROL: ProtocolHint = ProtocolHint::new(0x0200, "OBP control");
    pub const SPECTRUM: ProtocolHint = ProtocolHint::new(0x0201, "OBP spectrum");
}

/// Every hint OBP exchanges route by, for bus setup.
pub const ALL_HINTS: [ProtocolHint; 2] = [hints::CONTROL, hints::SPECTRUM];

pub const START_BYTES: [u8; 2] = [0xC1, 0xC0];
pub const PROTOCOL_VERSION: u16 = 0x1100;
pub const FOOTER: u32 = 0xC5C4_C3C2;

/// Bytes before the payload.
pub const HEADER_LEN: usize = 44;
pub const CHECKSUM_LEN: usize = 16;
pub const FOOTER_LEN: usize = 4;
/// Smallest message: header, checksum and footer with no payload.
pub const MIN_MESSAGE_LEN: usize = HEADER_LEN + CHECKSUM_LEN + FOOTER_LEN;
pub const MAX_IMMEDIATE_LEN: usize = 16;
/// Largest message accepted from a device. Bytes-remaining fields that
/// announce more are treated as a desynchronized stream.
pub const MAX_MESSAGE_LEN: usize = 4 * 1024 * 1024;

pub mod flags {
    pub const RESPONSE: u16 = 0x0001;
    pub const ACK: u16 = 0x0002;
    pub const ACK_REQUESTED: u16 = 0x0004;
    pub const NACK: u16 = 0x0008;
    pub const EXCEPTION: u16 = 0x0010;
    pub const DEPRECATED: u16 = 0x0020;
}

pub mod checksum_types {
    pub const NONE: u8 = 0x00;
}

pub mod message_types {
    pub const GET_SERIAL_NUMBER: u32 = 0x0000_0100;

    pub const GET_SPECTRUM: u32 = 0x0010_1000;
    pub const GET_BUFFERED_SPECTRA: u32 = 0x0010_0928;

    pub const SET_INTEGRATION_TIME: u32 = 0x0011_0010;
    pub const SET_TRIGGER_MODE: u32 = 0x0011_0110;
    pub const GET_BINNING_FACTOR: u32 = 0x0011_0280;
    pub const GET_MAX_BINNING_FACTOR: u32 = 0x0011_0282;
    pub const GET_DEFAULT_BINNING_FACTOR: u32 = 0x0011_0285;
    pub const SET_BINNING_FACTOR: u32 = 0x0011_0290;
    pub const GET_ACQUISITION_DELAY: u32 = 0x0011_0500;
    pub const SET_ACQUISITION_DELAY: u32 = 0x0011_0510;

    pub const GET_WAVELENGTH_COEFFICIENT_COUNT: u32 = 0x0018_0100;
    pub const GET_WAVELENGTH_COEFFICIENT: u32 = 0x0018_0101;
    pub const GET_NONLINEARITY_COEFFICIENT_COUNT: u32 = 0x0018_1100;
    pub const GET_NONLINEARITY_COEFFICIENT: u32 = 0x0018_1101;
    pub const GET_SATURATION_LEVEL: u32 = 0x000C_0001;

    pub const GET_GPIO_PIN_COUNT: u32 = 0x0020_0000;
    pub const GET_GPIO_OUTPUT_ENABLE: u32 = 0x0020_0100;
    pub const SET_GPIO_OUTPUT_ENABLE: u32 = 0x0020_0110;
    pub const GET_GPIO_VALUE: u32 = 0x0020_0300;
    pub const SET_GPIO_VALUE: u32 = 0x0020_0310;

    pub const GET_TEMPERATURE_COUNT: u32 = 0x0040_0000;
    pub const GET_TEMPERATURE: u32 = 0x0040_0001;
    pub const GET_ALL_TEMPERATURES: u32 = 0x0040_0002;

    pub const GET_LIGHT_SOURCE_COUNT: u32 = 0x0081_0001;
    pub const GET_LIGHT_SOURCE_ENABLE: u32 = 0x0081_0021;
    pub const SET_LIGHT_SOURCE_ENABLE: u32 = 0x0081_0031;
    pub const GET_LIGHT_SOURCE_INTENSITY: u32 = 0x0081_0041;
    pub const SET_LIGHT_SOURCE_INTENSITY: u32 = 0x0081_0051;
    pub const GET_LIGHT_SOURCE_COUNTS: u32 = 0x0081_0061;
    pub const SET_LIGHT_SOURCE_COUNTS: u32 = 0x0081_0071;
    pub const GET_LIGHT_SOURCE_COUNTS_MIN: u32 = 0x0081_0081;
    pub const GET_LIGHT_SOURCE_COUNTS_MAX: u32 = 0x0081_0091;

    pub const GET_DHCP_ENABLE: u32 = 0x0080_0100;
    pub const SET_DHCP_ENABLE: u32 = 0x0080_0110;
    pub const GET_IPV4_ADDRESS: u32 = 0x0080_0200;
    pub const SET_IPV4_ADDRESS: u32 = 0x0080_0210;
}

/// Text of the error numbers a device reports in a NACK.
pub fn error_text(code: u16) -> &'static str {
    match code {
        0 => "success",
        1 => "unsupported protocol version",
        2 => "unknown message type",
        3 => "bad checksum",
        4 => "message too large",
        5 => "payload length does not match message type",
        6 => "invalid payload data",
        7 => "device not ready",
        8 => "unknown checksum type",
        9 => "device reset unexpectedly",
        10 => "too many buses",
        11 => "out of memory",
        12 => "requested data not found",
        13 => "internal device error",
        _ => "unrecognized device error",
    }
}
