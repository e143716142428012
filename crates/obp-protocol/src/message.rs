//! OBP message framing.
//!
//! ```text
//! offset  len  field
//!      0    2  start bytes C1 C0
//!      2    2  protocol version (LE)
//!      4    2  flags
//!      6    2  error number
//!      8    4  message type
//!     12    4  regarding (echoed by replies)
//!     16    6  reserved
//!     22    1  checksum type
//!     23    1  immediate data length
//!     24   16  immediate data
//!     40    4  bytes remaining: payload + checksum + footer
//!     44    n  payload
//!   44+n   16  checksum
//!   60+n    4  footer C5 C4 C3 C2
//! ```

use specbus_core::{ByteReader, ByteWriter, ProtocolError, ProtocolResult};

use crate::ids::{
    CHECKSUM_LEN, FOOTER, FOOTER_LEN, HEADER_LEN, MAX_IMMEDIATE_LEN, MAX_MESSAGE_LEN,
    MIN_MESSAGE_LEN, PROTOCOL_VERSION, START_BYTES, checksum_types, error_text, flags,
};

/// Offset of the immediate data field.
pub const IMMEDIATE_OFFSET: usize = 24;
/// Offset of the bytes-remaining field.
pub const BYTES_REMAINING_OFFSET: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObpMessage {
    pub flags: u16,
    pub error: u16,
    pub message_type: u32,
    pub regarding: u32,
    pub checksum_type: u8,
    immediate: Vec<u8>,
    payload: Vec<u8>,
}

impl ObpMessage {
    pub fn new(message_type: u32) -> Self {
        Self {
            flags: 0,
            error: 0,
            message_type,
            regarding: 0,
            checksum_type: checksum_types::NONE,
            immediate: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Data of up to 16 bytes carried inside the header.
    pub fn with_immediate(mut self, data: &[u8]) -> ProtocolResult<Self> {
        if data.len() > MAX_IMMEDIATE_LEN {
            return Err(ProtocolError::encoding(format!(
                "immediate data of {} bytes exceeds {MAX_IMMEDIATE_LEN}",
                data.len()
            )));
        }
        self.immediate = data.to_vec();
        Ok(self)
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags |= flags;
        self
    }

    pub fn immediate(&self) -> &[u8] {
        &self.immediate
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Immediate data when present, otherwise the payload.
    pub fn data(&self) -> &[u8] {
        if self.immediate.is_empty() {
            &self.payload
        } else {
            &self.immediate
        }
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }

    pub fn is_nack(&self) -> bool {
        self.has_flag(flags::NACK)
    }

    /// The device rejected the request or reported an error number.
    pub fn check_error(&self) -> ProtocolResult<()> {
        if self.is_nack() || self.error != 0 {
            return Err(ProtocolError::Device {
                code: self.error,
                message: error_text(self.error).to_string(),
            });
        }
        if self.has_flag(flags::EXCEPTION) {
            return Err(ProtocolError::Device {
                code: self.error,
                message: "device raised an exception".to_string(),
            });
        }
        Ok(())
    }

    pub fn bytes_remaining(&self) -> usize {
        self.payload.len() + CHECKSUM_LEN + FOOTER_LEN
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.bytes_remaining()
    }

    pub fn to_bytes(&self) -> ProtocolResult<Vec<u8>> {
        let immediate_len = u8::try_from(self.immediate.len())
            .ok()
            .filter(|len| usize::from(*len) <= MAX_IMMEDIATE_LEN)
            .ok_or_else(|| ProtocolError::encoding("immediate data exceeds 16 bytes"))?;
        let remaining = u32::try_from(self.bytes_remaining())
            .map_err(|e| ProtocolError::encoding(format!("payload too large: {e}")))?;

        let mut writer = ByteWriter::with_capacity(self.encoded_len());
        writer
            .write_bytes(&START_BYTES)
            .write_u16_le(PROTOCOL_VERSION)
            .write_u16_le(self.flags)
            .write_u16_le(self.error)
            .write_u32_le(self.message_type)
            .write_u32_le(self.regarding)
            .write_zeros(6)
            .write_u8(self.checksum_type)
            .write_u8(immediate_len)
            .write_bytes(&self.immediate)
            .write_zeros(MAX_IMMEDIATE_LEN - self.immediate.len())
            .write_u32_le(remaining)
            .write_bytes(&self.payload)
            .write_zeros(CHECKSUM_LEN)
            .write_u32_le(FOOTER);
        Ok(writer.into_inner())
    }

    pub fn parse(bytes: &[u8]) -> ProtocolResult<Self> {
        if bytes.len() < MIN_MESSAGE_LEN {
            return Err(ProtocolError::format(format!(
                "OBP message of {} bytes is shorter than {MIN_MESSAGE_LEN}",
                bytes.len()
            )));
        }
        let mut reader = ByteReader::new(bytes);
        check_preamble(&mut reader)?;
        let message_flags = reader.read_u16_le()?;
        let error = reader.read_u16_le()?;
        let message_type = reader.read_u32_le()?;
        let regarding = reader.read_u32_le()?;
        reader.skip(6)?;
        let checksum_type = reader.read_u8()?;
        let immediate_len = usize::from(reader.read_u8()?);
        if immediate_len > MAX_IMMEDIATE_LEN {
            return Err(ProtocolError::format(format!(
                "immediate length {immediate_len} exceeds {MAX_IMMEDIATE_LEN}"
            )));
        }
        let immediate_field = reader.read_bytes(MAX_IMMEDIATE_LEN)?;
        let immediate = immediate_field.get(..immediate_len).unwrap_or_default().to_vec();
        let remaining = reader.read_u32_le()? as usize;

        if HEADER_LEN + remaining != bytes.len() {
            return Err(ProtocolError::format(format!(
                "OBP message is {} bytes, header announces {}",
                bytes.len(),
                HEADER_LEN + remaining
            )));
        }
        let payload_len = remaining.checked_sub(CHECKSUM_LEN + FOOTER_LEN).ok_or_else(|| {
            ProtocolError::format(format!("bytes remaining {remaining} below trailer size"))
        })?;
        let payload = reader.read_bytes(payload_len)?.to_vec();
        reader.skip(CHECKSUM_LEN)?;
        let footer = u32::from_le_bytes(
            reader
                .read_bytes(FOOTER_LEN)?
                .try_into()
                .map_err(|e| ProtocolError::format(format!("footer: {e}")))?,
        );
        if footer != FOOTER {
            return Err(ProtocolError::format(format!(
                "OBP footer 0x{footer:08X} does not match"
            )));
        }

        Ok(Self {
            flags: message_flags,
            error,
            message_type,
            regarding,
            checksum_type,
            immediate,
            payload,
        })
    }

    /// Bytes still to be read after the 64-byte minimum message,
    /// taken from the bytes-remaining field of `base`.
    ///
    /// The start bytes and version are checked first, and a total above
    /// [`MAX_MESSAGE_LEN`] is rejected before anything is allocated for it.
    pub fn pending_after_base(base: &[u8]) -> ProtocolResult<usize> {
        let mut reader = ByteReader::new(base);
        check_preamble(&mut reader)?;
        reader.skip(BYTES_REMAINING_OFFSET - reader.position())?;
        let remaining = reader.read_u32_le()? as usize;
        if remaining > MAX_MESSAGE_LEN - HEADER_LEN {
            return Err(ProtocolError::format(format!(
                "OBP header announces {remaining} more bytes, limit is {MAX_MESSAGE_LEN}"
            )));
        }
        Ok(remaining.saturating_sub(CHECKSUM_LEN + FOOTER_LEN))
    }
}

fn check_preamble(reader: &mut ByteReader<'_>) -> ProtocolResult<()> {
    if reader.read_bytes(2)? != START_BYTES {
        return Err(ProtocolError::format("OBP start bytes missing"));
    }
    let version = reader.read_u16_le()?;
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::format(format!(
            "unsupported OBP version 0x{version:04X}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_message_layout() -> ProtocolResult<()> {
        let bytes = ObpMessage::new(0x0000_0100)
            .with_flags(flags::ACK_REQUESTED)
            .to_bytes()?;
        assert_eq!(bytes.len(), MIN_MESSAGE_LEN);
        assert_eq!(bytes.get(..4), Some(&[0xC1, 0xC0, 0x00, 0x11][..]));
        assert_eq!(bytes.get(4..6), Some(&[0x04, 0x00][..]));
        assert_eq!(bytes.get(8..12), Some(&[0x00, 0x01, 0x00, 0x00][..]));
        assert_eq!(bytes.get(40..44), Some(&[20, 0, 0, 0][..]));
        assert_eq!(bytes.get(60..), Some(&[0xC2, 0xC3, 0xC4, 0xC5][..]));
        Ok(())
    }

    #[test]
    fn test_immediate_is_placed_at_offset_24() -> ProtocolResult<()> {
        let bytes = ObpMessage::new(1).with_immediate(&[0xAA, 0xBB])?.to_bytes()?;
        assert_eq!(bytes.get(23), Some(&2));
        assert_eq!(bytes.get(24..26), Some(&[0xAA, 0xBB][..]));
        Ok(())
    }

    #[test]
    fn test_immediate_too_long() {
        assert!(ObpMessage::new(1).with_immediate(&[0; 17]).is_err());
    }

    #[test]
    fn test_parse_payload_message() -> ProtocolResult<()> {
        let message = ObpMessage::new(0x0010_1000)
            .with_flags(flags::RESPONSE)
            .with_payload(vec![1, 2, 3, 4, 5]);
        let parsed = ObpMessage::parse(&message.to_bytes()?)?;
        assert_eq!(parsed, message);
        assert_eq!(parsed.data(), &[1, 2, 3, 4, 5]);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_bad_footer() -> ProtocolResult<()> {
        let mut bytes = ObpMessage::new(1).to_bytes()?;
        if let Some(last) = bytes.last_mut() {
            *last = 0;
        }
        assert!(ObpMessage::parse(&bytes).is_err());
        Ok(())
    }

    #[test]
    fn test_nack_is_device_error() {
        let mut message = ObpMessage::new(1).with_flags(flags::NACK);
        message.error = 2;
        assert_eq!(
            message.check_error(),
            Err(ProtocolError::Device {
                code: 2,
                message: "unknown message type".into()
            })
        );
    }

    #[test]
    fn test_pending_after_base() -> ProtocolResult<()> {
        let bytes = ObpMessage::new(1).with_payload(vec![0; 100]).to_bytes()?;
        assert_eq!(ObpMessage::pending_after_base(&bytes)?, 100);
        Ok(())
    }

    fn with_bytes_remaining(remaining: u32) -> ProtocolResult<Vec<u8>> {
        let mut bytes = ObpMessage::new(1).to_bytes()?;
        if let Some(field) = bytes.get_mut(BYTES_REMAINING_OFFSET..BYTES_REMAINING_OFFSET + 4) {
            field.copy_from_slice(&remaining.to_le_bytes());
        }
        Ok(bytes)
    }

    #[test]
    fn test_pending_rejects_oversized_message() -> Result<(), Box<dyn std::error::Error>> {
        let bytes = with_bytes_remaining(0x1000_0000 + 20)?;
        assert!(matches!(
            ObpMessage::pending_after_base(&bytes),
            Err(ProtocolError::Format(_))
        ));

        let limit = u32::try_from(MAX_MESSAGE_LEN - HEADER_LEN)?;
        let bytes = with_bytes_remaining(limit)?;
        assert_eq!(
            ObpMessage::pending_after_base(&bytes)?,
            MAX_MESSAGE_LEN - MIN_MESSAGE_LEN
        );
        Ok(())
    }

    #[test]
    fn test_pending_checks_preamble_first() -> ProtocolResult<()> {
        let mut bytes = ObpMessage::new(1).with_payload(vec![0; 8]).to_bytes()?;
        if let Some(start) = bytes.first_mut() {
            *start = 0;
        }
        assert!(ObpMessage::pending_after_base(&bytes).is_err());

        let mut bytes = ObpMessage::new(1).to_bytes()?;
        if let Some(version) = bytes.get_mut(3) {
            *version = 0x10;
        }
        assert!(ObpMessage::pending_after_base(&bytes).is_err());
        Ok(())
    }

    #[test]
    fn test_exception_flag_is_device_error() {
        let message = ObpMessage::new(1).with_flags(flags::RESPONSE | flags::EXCEPTION);
        assert_eq!(
            message.check_error(),
            Err(ProtocolError::Device {
                code: 0,
                message: "device raised an exception".into()
            })
        );
    }
}
