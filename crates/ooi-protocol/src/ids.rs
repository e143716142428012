//! OOI protocol identity, routing hints, opcodes and EEPROM slot numbers.

use specbus_core::{Protocol, ProtocolHint};

pub const OOI_PROTOCOL: Protocol = Protocol::new(1, "OOI");

/// Trailing byte of every complete spectrum readout.
pub const SYNC_BYTE: u8 = 0x69;

/// Length of an EEPROM query reply: echoed opcode, echoed slot, 15 data bytes.
pub const EEPROM_REPLY_LEN: usize = 17;

/// Number of addressable EEPROM slots.
pub const EEPROM_SLOT_COUNT: u16 = 32;

/// Pixels carried by one 128-byte packet of a packet-interleaved readout.
pub const PACKET_PIXELS: usize = 64;

pub mod hints {
    use specbus_core::ProtocolHint;

    pub const CONTROL: ProtocolHint = ProtocolHint::new(0x0100, "OOI control");
    pub const SPECTRUM: ProtocolHint = ProtocolHint::new(0x0101, "OOI spectrum");
}

pub mod opcodes {
    pub const RESET: u8 = 0x01;
    pub const SET_INTEGRATION_TIME: u8 = 0x02;
    pub const SET_STROBE_ENABLE: u8 = 0x03;
    pub const QUERY_INFO: u8 = 0x05;
    pub const REQUEST_SPECTRUM: u8 = 0x09;
    pub const SET_TRIGGER_MODE: u8 = 0x0A;
    pub const READ_PCB_TEMPERATURE: u8 = 0x6C;
    pub const QUERY_STATUS: u8 = 0xFE;
}

pub mod eeprom_slots {
    pub const SERIAL_NUMBER: u8 = 0x00;
    /// Wavelength calibration coefficients 0..=3.
    pub const WAVELENGTH_FIRST: u8 = 0x01;
    pub const WAVELENGTH_LAST: u8 = 0x04;
    /// Nonlinearity correction coefficients 0..=7.
    pub const NONLINEARITY_FIRST: u8 = 0x06;
    pub const NONLINEARITY_LAST: u8 = 0x0D;
    pub const NONLINEARITY_ORDER: u8 = 0x0E;
    pub const SATURATION: u8 = 0x11;
}

/// Every hint OOI exchanges route by, for bus setup.
pub const ALL_HINTS: [ProtocolHint; 2] = [hints::CONTROL, hints::SPECTRUM];
