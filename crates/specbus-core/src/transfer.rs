//! One directional, fixed-length byte transfer.

use core::fmt;
use std::sync::Arc;

use specbus_errors::{ProtocolError, ProtocolResult};
use tracing::{trace, trace_span, warn};

use crate::bus::TransferHelper;
use crate::data::Data;
use crate::exchange::Exchange;
use crate::hint::ProtocolHint;

/// Direction of a [`Transfer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    ToDevice = 0,
    FromDevice = 1,
}

impl TryFrom<u8> for Direction {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::ToDevice),
            1 => Ok(Direction::FromDevice),
            other => Err(ProtocolError::InvalidDirection(other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToDevice => write!(f, "to-device"),
            Direction::FromDevice => write!(f, "from-device"),
        }
    }
}

/// Rewrites part of an outgoing buffer with a value only known at call time.
///
/// The setter receives the first `length` bytes of the transfer buffer.
pub type ParameterSetter = Arc<dyn Fn(&mut [u8], u64) -> ProtocolResult<()> + Send + Sync>;

/// Moves exactly `length` bytes between an owned buffer and a transport.
///
/// The buffer is always at least `length` bytes long; every setter that could
/// break this grows the buffer again. The buffer is never shrunk.
///
/// A `FromDevice` transfer returns a copy of the received bytes, so callers
/// may keep or mutate the result without touching the buffer reused by the
/// next call.
#[derive(Clone)]
pub struct Transfer {
    hints: Vec<ProtocolHint>,
    buffer: Vec<u8>,
    direction: Direction,
    length: usize,
    parameter_setter: Option<ParameterSetter>,
}

impl Transfer {
    pub fn new(
        hints: Vec<ProtocolHint>,
        buffer: Vec<u8>,
        direction: Direction,
        length: usize,
    ) -> Self {
        let mut transfer = Self {
            hints,
            buffer,
            direction,
            length,
            parameter_setter: None,
        };
        transfer.check_buffer_size();
        transfer
    }

    /// A write of `bytes`, length taken from the buffer.
    pub fn to_device(hint: ProtocolHint, bytes: Vec<u8>) -> Self {
        let length = bytes.len();
        Self::new(vec![hint], bytes, Direction::ToDevice, length)
    }

    /// A read of exactly `length` bytes.
    pub fn from_device(hint: ProtocolHint, length: usize) -> Self {
        Self::new(vec![hint], Vec::new(), Direction::FromDevice, length)
    }

    /// Attach the setter invoked by [`Transfer::set_dynamic_parameter`].
    pub fn with_parameter_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut [u8], u64) -> ProtocolResult<()> + Send + Sync + 'static,
    {
        self.parameter_setter = Some(Arc::new(setter));
        self
    }

    /// Patch the outgoing buffer with `value` before the next `transfer()`.
    pub fn set_dynamic_parameter(&mut self, value: u64) -> ProtocolResult<()> {
        let setter = self
            .parameter_setter
            .clone()
            .ok_or(ProtocolError::MissingParameterSetter)?;
        setter(self.payload_mut(), value)
    }

    pub fn has_parameter_setter(&self) -> bool {
        self.parameter_setter.is_some()
    }

    pub fn set_hints(&mut self, hints: Vec<ProtocolHint>) {
        self.hints = hints;
    }

    pub fn set_buffer(&mut self, buffer: Vec<u8>) {
        self.buffer = buffer;
        self.check_buffer_size();
    }

    pub fn set_length(&mut self, length: usize) {
        self.length = length;
        self.check_buffer_size();
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The bytes that will be sent, or were last received.
    pub fn payload(&self) -> &[u8] {
        self.buffer.get(..self.length).unwrap_or_default()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    fn payload_mut(&mut self) -> &mut [u8] {
        let length = self.length;
        self.buffer.get_mut(..length).unwrap_or_default()
    }

    fn check_buffer_size(&mut self) {
        if self.buffer.len() < self.length {
            self.buffer.resize(self.length, 0);
        }
    }
}

impl Default for Transfer {
    /// An empty transfer to be populated once the request content is known.
    fn default() -> Self {
        Self {
            hints: Vec::new(),
            buffer: Vec::new(),
            direction: Direction::ToDevice,
            length: 0,
            parameter_setter: None,
        }
    }
}

impl fmt::Debug for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transfer")
            .field("hints", &self.hints)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .field("capacity", &self.buffer.len())
            .field("parameter_setter", &self.parameter_setter.is_some())
            .finish()
    }
}

impl Exchange for Transfer {
    fn hints(&self) -> &[ProtocolHint] {
        &self.hints
    }

    fn transfer(&mut self, helper: &mut dyn TransferHelper) -> ProtocolResult<Option<Data>> {
        let span = trace_span!("transfer", direction = %self.direction, length = self.length);
        let _enter = span.enter();

        let expected = self.length;
        match self.direction {
            Direction::ToDevice => {
                let sent = helper.send(self.payload()).map_err(|e| {
                    warn!("send failed: {}", e);
                    ProtocolError::from_write(e)
                })?;
                if sent != expected {
                    return Err(ProtocolError::ShortTransfer {
                        direction: "write",
                        expected,
                        actual: sent,
                    });
                }
                trace!(sent, "sent");
                Ok(None)
            }
            Direction::FromDevice => {
                let received = helper.receive(self.payload_mut()).map_err(|e| {
                    warn!("receive failed: {}", e);
                    ProtocolError::from_read(e)
                })?;
                if received != expected {
                    return Err(ProtocolError::ShortTransfer {
                        direction: "read",
                        expected,
                        actual: received,
                    });
                }
                trace!(received, "received");
                Ok(Some(Data::bytes(self.payload().to_vec())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specbus_errors::{TransportError, TransportResult};

    const HINT: ProtocolHint = ProtocolHint::new(1, "control");

    struct Fixed {
        fill: Vec<u8>,
        sent: Vec<Vec<u8>>,
        short_by: usize,
        fail: Option<TransportError>,
    }

    impl Fixed {
        fn new(fill: Vec<u8>) -> Self {
            Self {
                fill,
                sent: Vec::new(),
                short_by: 0,
                fail: None,
            }
        }
    }

    impl TransferHelper for Fixed {
        fn send(&mut self, buffer: &[u8]) -> TransportResult<usize> {
            if let Some(e) = self.fail.clone() {
                return Err(e);
            }
            self.sent.push(buffer.to_vec());
            Ok(buffer.len().saturating_sub(self.short_by))
        }

        fn receive(&mut self, buffer: &mut [u8]) -> TransportResult<usize> {
            if let Some(e) = self.fail.clone() {
                return Err(e);
            }
            for (dst, src) in buffer.iter_mut().zip(self.fill.iter()) {
                *dst = *src;
            }
            Ok(buffer.len().saturating_sub(self.short_by))
        }
    }

    #[test]
    fn test_buffer_grows_to_length() {
        let transfer = Transfer::new(vec![HINT], vec![1, 2], Direction::FromDevice, 8);
        assert_eq!(transfer.capacity(), 8);
        assert_eq!(transfer.payload(), &[1, 2, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_buffer_never_shrinks() {
        let mut transfer = Transfer::new(vec![HINT], vec![0; 16], Direction::ToDevice, 4);
        transfer.set_length(2);
        assert_eq!(transfer.capacity(), 16);
        assert_eq!(transfer.payload().len(), 2);
    }

    #[test]
    fn test_default_is_populated_later() {
        let mut transfer = Transfer::default();
        transfer.set_hints(vec![HINT]);
        transfer.set_direction(Direction::FromDevice);
        transfer.set_length(3);
        assert_eq!(transfer.capacity(), 3);
        assert_eq!(transfer.hints(), &[HINT]);
    }

    #[test]
    fn test_to_device_returns_none() -> ProtocolResult<()> {
        let mut helper = Fixed::new(Vec::new());
        let mut transfer = Transfer::to_device(HINT, vec![0x09]);
        let result = transfer.transfer(&mut helper)?;
        assert!(result.is_none());
        assert_eq!(helper.sent, vec![vec![0x09]]);
        Ok(())
    }

    #[test]
    fn test_from_device_copies_buffer() -> ProtocolResult<()> {
        let mut helper = Fixed::new(vec![0xAA, 0xBB]);
        let mut transfer = Transfer::from_device(HINT, 2);
        let data = transfer.transfer(&mut helper)?;
        let mut bytes = data.and_then(Data::into_bytes).unwrap_or_default();
        assert_eq!(bytes, vec![0xAA, 0xBB]);

        bytes[0] = 0x00;
        assert_eq!(transfer.payload(), &[0xAA, 0xBB]);
        Ok(())
    }

    #[test]
    fn test_short_write_is_an_error() {
        let mut helper = Fixed::new(Vec::new());
        helper.short_by = 1;
        let mut transfer = Transfer::to_device(HINT, vec![1, 2, 3]);
        let result = transfer.transfer(&mut helper);
        assert_eq!(
            result,
            Err(ProtocolError::ShortTransfer {
                direction: "write",
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_transport_error_is_translated() {
        let mut helper = Fixed::new(Vec::new());
        helper.fail = Some(TransportError::Disconnected);
        let mut transfer = Transfer::from_device(HINT, 4);
        let err = transfer.transfer(&mut helper).err();
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("Failed to read from bus.")
        );
    }

    #[test]
    fn test_timeout_is_translated() {
        let mut helper = Fixed::new(Vec::new());
        helper.fail = Some(TransportError::timeout(100));
        let mut transfer = Transfer::from_device(HINT, 4);
        assert!(matches!(
            transfer.transfer(&mut helper),
            Err(ProtocolError::Timeout {
                direction: "read",
                timeout_ms: 100
            })
        ));
    }

    #[test]
    fn test_invalid_direction_code() {
        assert_eq!(Direction::try_from(1), Ok(Direction::FromDevice));
        assert_eq!(
            Direction::try_from(5),
            Err(ProtocolError::InvalidDirection(5))
        );
    }

    #[test]
    fn test_dynamic_parameter_patches_buffer() -> ProtocolResult<()> {
        let mut transfer = Transfer::to_device(HINT, vec![0x80, 0, 0, 0, 0]).with_parameter_setter(
            |buffer, value| {
                let bytes = u32::try_from(value)
                    .map_err(|e| ProtocolError::encoding(e.to_string()))?
                    .to_le_bytes();
                match buffer.get_mut(1..5) {
                    Some(slot) => {
                        slot.copy_from_slice(&bytes);
                        Ok(())
                    }
                    None => Err(ProtocolError::encoding("buffer too short")),
                }
            },
        );
        transfer.set_dynamic_parameter(0x0102_0304)?;
        assert_eq!(transfer.payload(), &[0x80, 0x04, 0x03, 0x02, 0x01]);
        Ok(())
    }

    #[test]
    fn test_missing_parameter_setter() {
        let mut transfer = Transfer::to_device(HINT, vec![0]);
        assert_eq!(
            transfer.set_dynamic_parameter(1),
            Err(ProtocolError::MissingParameterSetter)
        );
    }
}
