//! Little-endian field readers and writers shared by the protocol codecs.

use specbus_errors::{ProtocolError, ProtocolResult};

/// Convert a two's-complement fixed-point value with `frac_bits` fractional bits.
pub fn fixed_to_f64(raw: i64, frac_bits: u32) -> f64 {
    let scale = (1u64 << frac_bits.min(62)) as f64;
    raw as f64 / scale
}

/// Cursor over a received buffer.
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_bytes(&mut self, count: usize) -> ProtocolResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .ok_or_else(|| ProtocolError::format("field length overflow"))?;
        let bytes = self.buffer.get(self.position..end).ok_or_else(|| {
            ProtocolError::format(format!(
                "unexpected end of data: need {count} bytes at offset {}, have {}",
                self.position,
                self.remaining()
            ))
        })?;
        self.position = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> ProtocolResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> ProtocolResult<u8> {
        Ok(u8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16_le(&mut self) -> ProtocolResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16_le(&mut self) -> ProtocolResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> ProtocolResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32_le(&mut self) -> ProtocolResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Signed 16-bit fixed-point value.
    pub fn read_fixed_i16_le(&mut self, frac_bits: u32) -> ProtocolResult<f64> {
        Ok(fixed_to_f64(i64::from(self.read_i16_le()?), frac_bits))
    }

    pub fn skip(&mut self, count: usize) -> ProtocolResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.buffer.get(self.position..).unwrap_or_default();
        self.position = self.buffer.len();
        rest
    }
}

/// Growable request buffer.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_f32_le(&mut self, value: f32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    pub fn write_zeros(&mut self, count: usize) -> &mut Self {
        self.buffer.resize(self.buffer.len().saturating_add(count), 0);
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}
