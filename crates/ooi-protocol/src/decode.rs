//! Spectrum readout decoders.
//!
//! Two pixel layouts exist: plain little-endian 16-bit pairs, and the
//! packet-interleaved layout of older devices where every 128-byte packet
//! carries the low bytes of 64 pixels followed by their high bytes.

use specbus_core::{ProtocolError, ProtocolResult, SpectrumGeometry};
use tracing::trace;

use crate::ids::{PACKET_PIXELS, SYNC_BYTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    LittleEndianPairs,
    PacketInterleaved,
}

pub fn decode_le_pairs(raw: &[u8], pixels: usize) -> ProtocolResult<Vec<f64>> {
    let needed = pixels.saturating_mul(2);
    let bytes = raw.get(..needed).ok_or_else(|| {
        ProtocolError::format(format!(
            "readout holds {} bytes, {pixels} pixels need {needed}",
            raw.len()
        ))
    })?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| match pair {
            [lsb, msb] => f64::from(u16::from_le_bytes([*lsb, *msb])),
            _ => 0.0,
        })
        .collect())
}

/// Pixel `i` lives in packet `i >> 6`; its low byte at offset `i & 63` and
/// its high byte 64 bytes later.
pub fn decode_packet_interleaved(raw: &[u8], pixels: usize) -> ProtocolResult<Vec<f64>> {
    let packet_len = PACKET_PIXELS * 2;
    let mut out = Vec::with_capacity(pixels);
    for pixel in 0..pixels {
        let base = (pixel >> 6) * packet_len + (pixel & (PACKET_PIXELS - 1));
        let lsb = raw.get(base);
        let msb = raw.get(base + PACKET_PIXELS);
        match (lsb, msb) {
            (Some(lsb), Some(msb)) => out.push(f64::from(u16::from_le_bytes([*lsb, *msb]))),
            _ => {
                return Err(ProtocolError::format(format!(
                    "interleaved readout of {} bytes ends before pixel {pixel}",
                    raw.len()
                )));
            }
        }
    }
    Ok(out)
}

/// The readout must end in [`SYNC_BYTE`].
pub fn check_sync_byte(raw: &[u8]) -> ProtocolResult<()> {
    match raw.last() {
        Some(&SYNC_BYTE) => Ok(()),
        Some(other) => Err(ProtocolError::format(format!(
            "spectrum sync byte missing: expected 0x{SYNC_BYTE:02X}, found 0x{other:02X}"
        ))),
        None => Err(ProtocolError::format("spectrum readout is empty")),
    }
}

/// Validate length and sync byte of a full readout, then decode its pixels.
pub fn decode_with_sync(
    raw: &[u8],
    geometry: &SpectrumGeometry,
    layout: PixelLayout,
) -> ProtocolResult<Vec<f64>> {
    let expected = geometry.unformatted_len();
    if raw.len() != expected {
        return Err(ProtocolError::format(format!(
            "spectrum readout is {} bytes, expected {expected}",
            raw.len()
        )));
    }
    if geometry.trailer_len() > 0 {
        check_sync_byte(raw)?;
    }
    let pixels = raw.get(geometry.metadata_len()..).unwrap_or_default();
    trace!(pixels = geometry.pixels(), ?layout, "decoding spectrum");
    match layout {
        PixelLayout::LittleEndianPairs => decode_le_pairs(pixels, geometry.pixels()),
        PixelLayout::PacketInterleaved => decode_packet_interleaved(pixels, geometry.pixels()),
    }
}
