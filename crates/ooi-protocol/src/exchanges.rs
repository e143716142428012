//! OOI command exchanges.
//!
//! Commands are a single opcode byte followed by little-endian arguments.
//! Queries are transactions: the command write, then a fixed-length read
//! from the same endpoint.

use specbus_core::interfaces::TriggerMode;
use specbus_core::{
    Bus, ByteReader, ByteWriter, IntegrationTimeLimits, ProtocolError, ProtocolResult, Transaction,
    Transfer, query,
};

use crate::ids::{EEPROM_REPLY_LEN, hints, opcodes};

/// Width of the integration-time argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationWord {
    U16,
    U32,
}

/// Encoder for the set-integration-time command.
///
/// The wire value is `micros / limits.base_us`; older devices take a 16-bit
/// count of milliseconds, newer ones a 32-bit count of microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrationTimeExchange {
    limits: IntegrationTimeLimits,
    word: IntegrationWord,
}

impl IntegrationTimeExchange {
    pub const fn new(limits: IntegrationTimeLimits, word: IntegrationWord) -> Self {
        Self { limits, word }
    }

    pub const fn limits(&self) -> IntegrationTimeLimits {
        self.limits
    }

    pub fn encode(&self, micros: u64) -> ProtocolResult<Vec<u8>> {
        let units = micros / self.limits.base_us.max(1);
        let mut writer = ByteWriter::with_capacity(5);
        writer.write_u8(opcodes::SET_INTEGRATION_TIME);
        match self.word {
            IntegrationWord::U16 => {
                let value = u16::try_from(units).map_err(|e| {
                    ProtocolError::encoding(format!("integration time {micros} us: {e}"))
                })?;
                writer.write_u16_le(value);
            }
            IntegrationWord::U32 => {
                let value = u32::try_from(units).map_err(|e| {
                    ProtocolError::encoding(format!("integration time {micros} us: {e}"))
                })?;
                writer.write_u32_le(value);
            }
        }
        Ok(writer.into_inner())
    }

    /// Inverse of [`encode`](Self::encode), in microseconds.
    pub fn decode(&self, bytes: &[u8]) -> ProtocolResult<u64> {
        let mut reader = ByteReader::new(bytes);
        let opcode = reader.read_u8()?;
        if opcode != opcodes::SET_INTEGRATION_TIME {
            return Err(ProtocolError::format(format!(
                "expected integration time command, found opcode 0x{opcode:02X}"
            )));
        }
        let units = match self.word {
            IntegrationWord::U16 => u64::from(reader.read_u16_le()?),
            IntegrationWord::U32 => u64::from(reader.read_u32_le()?),
        };
        Ok(units.saturating_mul(self.limits.base_us.max(1)))
    }

    pub fn transfer(&self, micros: u64) -> ProtocolResult<Transfer> {
        Ok(Transfer::to_device(hints::CONTROL, self.encode(micros)?))
    }
}

pub fn reset() -> Transfer {
    Transfer::to_device(hints::CONTROL, vec![opcodes::RESET])
}

pub fn request_spectrum() -> Transfer {
    Transfer::to_device(hints::CONTROL, vec![opcodes::REQUEST_SPECTRUM])
}

/// Raw readout of `length` bytes from the spectrum endpoint.
pub fn read_spectrum(length: usize) -> Transfer {
    Transfer::from_device(hints::SPECTRUM, length)
}

pub fn trigger_mode(mode: TriggerMode) -> Transfer {
    let mut writer = ByteWriter::with_capacity(3);
    writer.write_u8(opcodes::SET_TRIGGER_MODE);
    writer.write_u16_le(u16::from(mode.code()));
    Transfer::to_device(hints::CONTROL, writer.into_inner())
}

pub fn strobe_enable(enable: bool) -> Transfer {
    let mut writer = ByteWriter::with_capacity(3);
    writer.write_u8(opcodes::SET_STROBE_ENABLE);
    writer.write_u16_le(u16::from(enable));
    Transfer::to_device(hints::CONTROL, writer.into_inner())
}

pub fn read_eeprom_slot(slot: u8) -> Transaction {
    Transaction::with_transfers([
        Transfer::to_device(hints::CONTROL, vec![opcodes::QUERY_INFO, slot]),
        Transfer::from_device(hints::CONTROL, EEPROM_REPLY_LEN),
    ])
}

/// Check the echoed opcode and slot of an EEPROM reply and return its data.
pub fn parse_eeprom_reply(slot: u8, reply: &[u8]) -> ProtocolResult<Vec<u8>> {
    let mut reader = ByteReader::new(reply);
    let opcode = reader.read_u8()?;
    let echoed = reader.read_u8()?;
    if opcode != opcodes::QUERY_INFO || echoed != slot {
        return Err(ProtocolError::format(format!(
            "EEPROM reply for slot {slot} echoed opcode 0x{opcode:02X} slot {echoed}"
        )));
    }
    Ok(reader.rest().to_vec())
}

/// Interpret EEPROM slot data as NUL-terminated ASCII.
pub fn eeprom_ascii(data: &[u8]) -> ProtocolResult<String> {
    let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    let text = data.get(..end).unwrap_or_default();
    core::str::from_utf8(text)
        .map(|s| s.trim().to_string())
        .map_err(|e| ProtocolError::format(format!("EEPROM slot is not ASCII: {e}")))
}

pub fn eeprom_number(data: &[u8]) -> ProtocolResult<f64> {
    let text = eeprom_ascii(data)?;
    text.parse::<f64>()
        .map_err(|e| ProtocolError::format(format!("EEPROM value {text:?} is not a number: {e}")))
}

pub fn query_eeprom_slot(bus: &mut dyn Bus, slot: u8) -> ProtocolResult<Vec<u8>> {
    let mut transaction = read_eeprom_slot(slot);
    let reply = query(&mut transaction, bus)?;
    let bytes = reply
        .as_bytes()
        .ok_or_else(|| ProtocolError::format("EEPROM reply is not a byte vector"))?;
    parse_eeprom_reply(slot, bytes)
}

/// Degrees Celsius per ADC count of the board temperature sensor.
pub const PCB_TEMPERATURE_SCALE: f64 = 0.003906;

/// First byte of a successful temperature reply.
const PCB_TEMPERATURE_OK: u8 = 0x08;

pub fn read_pcb_temperature() -> Transaction {
    Transaction::with_transfers([
        Transfer::to_device(hints::CONTROL, vec![opcodes::READ_PCB_TEMPERATURE]),
        Transfer::from_device(hints::CONTROL, 3),
    ])
}

pub fn parse_pcb_temperature(reply: &[u8]) -> ProtocolResult<f64> {
    let mut reader = ByteReader::new(reply);
    let status = reader.read_u8()?;
    if status != PCB_TEMPERATURE_OK {
        return Err(ProtocolError::format(format!(
            "temperature read failed with status 0x{status:02X}"
        )));
    }
    Ok(f64::from(reader.read_i16_le()?) * PCB_TEMPERATURE_SCALE)
}

/// Fields of the 16-byte status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OoiStatus {
    pub pixels: u16,
    pub integration_time: u32,
    pub lamp_enabled: bool,
    pub trigger_mode: u8,
    pub spectrum_requested: bool,
    pub packets_per_spectrum: u8,
    pub power_down: bool,
}

pub const STATUS_LEN: usize = 16;

pub fn query_status() -> Transaction {
    Transaction::with_transfers([
        Transfer::to_device(hints::CONTROL, vec![opcodes::QUERY_STATUS]),
        Transfer::from_device(hints::CONTROL, STATUS_LEN),
    ])
}

pub fn parse_status(reply: &[u8]) -> ProtocolResult<OoiStatus> {
    let mut reader = ByteReader::new(reply);
    let pixels = reader.read_u16_le()?;
    let integration_time = reader.read_u32_le()?;
    let lamp_enabled = reader.read_u8()? != 0;
    let trigger_mode = reader.read_u8()?;
    let spectrum_requested = reader.read_u8()? != 0;
    reader.skip(1)?;
    let packets_per_spectrum = reader.read_u8()?;
    let power_down = reader.read_u8()? != 0;
    Ok(OoiStatus {
        pixels,
        integration_time,
        lamp_enabled,
        trigger_mode,
        spectrum_requested,
        packets_per_spectrum,
        power_down,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> IntegrationTimeLimits {
        IntegrationTimeLimits::new(1_000, 65_535_000, 1_000, 1_000)
    }

    #[test]
    fn test_integration_time_u16_millis() -> ProtocolResult<()> {
        let exchange = IntegrationTimeExchange::new(limits(), IntegrationWord::U16);
        assert_eq!(exchange.encode(100_000)?, vec![0x02, 100, 0]);
        assert_eq!(exchange.decode(&[0x02, 100, 0])?, 100_000);
        assert!(exchange.encode(70_000_000).is_err());
        Ok(())
    }

    #[test]
    fn test_integration_time_u32_micros() -> ProtocolResult<()> {
        let exchange = IntegrationTimeExchange::new(
            IntegrationTimeLimits::new(10, 65_000_000, 1, 1),
            IntegrationWord::U32,
        );
        assert_eq!(exchange.encode(0x0102_0304)?, vec![0x02, 0x04, 0x03, 0x02, 0x01]);
        Ok(())
    }

    #[test]
    fn test_eeprom_reply_echo() -> ProtocolResult<()> {
        let mut reply = vec![0x05, 0x11];
        reply.extend_from_slice(b"65535\0\0\0\0\0\0\0\0\0\0");
        let data = parse_eeprom_reply(0x11, &reply)?;
        assert!((eeprom_number(&data)? - 65535.0).abs() < f64::EPSILON);
        assert!(parse_eeprom_reply(0x12, &reply).is_err());
        Ok(())
    }

    #[test]
    fn test_eeprom_number_rejects_text() {
        assert!(eeprom_number(b"not a number\0").is_err());
    }

    #[test]
    fn test_pcb_temperature() -> ProtocolResult<()> {
        // 0x1900 counts = 6400 * 0.003906
        let celsius = parse_pcb_temperature(&[0x08, 0x00, 0x19])?;
        assert!((celsius - 24.9984).abs() < 1e-9);
        assert!(parse_pcb_temperature(&[0x00, 0x00, 0x19]).is_err());
        Ok(())
    }

    #[test]
    fn test_status_block() -> ProtocolResult<()> {
        let reply = [
            0x00, 0x08, 0x64, 0x00, 0x00, 0x00, 0x01, 0x03, 0x00, 0x00, 0x20, 0x00, 0, 0, 0, 0,
        ];
        let status = parse_status(&reply)?;
        assert_eq!(status.pixels, 2048);
        assert_eq!(status.integration_time, 100);
        assert!(status.lamp_enabled);
        assert_eq!(status.trigger_mode, 3);
        assert_eq!(status.packets_per_spectrum, 32);
        Ok(())
    }
}
