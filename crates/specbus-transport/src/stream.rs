//! Transfer helper over a blocking byte stream.

use std::io::{ErrorKind, Read, Write};

use specbus_core::{HelperRegistry, ProtocolHint, TransferHelper};
use specbus_errors::{TransportError, TransportResult};
use tracing::trace;

/// Moves whole transfers over a `Read + Write` stream.
///
/// `receive` keeps reading until the buffer is full, the peer closes the
/// stream, or the read times out after some bytes arrived; the byte count
/// reports how far it got. A timeout before any byte arrives is an error.
#[derive(Debug)]
pub struct StreamTransferHelper<S> {
    stream: S,
    timeout_ms: u64,
}

impl<S: Read + Write + Send> StreamTransferHelper<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            timeout_ms: 0,
        }
    }

    /// Timeout reported in [`TransportError::Timeout`] when a read stalls.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    fn map_io(&self, error: std::io::Error) -> TransportError {
        match TransportError::from(error) {
            TransportError::Timeout { .. } => TransportError::timeout(self.timeout_ms),
            other => other,
        }
    }
}

impl<S: Read + Write + Send> TransferHelper for StreamTransferHelper<S> {
    fn send(&mut self, buffer: &[u8]) -> TransportResult<usize> {
        self.stream
            .write_all(buffer)
            .and_then(|()| self.stream.flush())
            .map_err(|e| self.map_io(e))?;
        trace!(len = buffer.len(), "sent");
        Ok(buffer.len())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> TransportResult<usize> {
        let mut filled = 0;
        while let Some(rest) = buffer.get_mut(filled..) {
            if rest.is_empty() {
                break;
            }
            match self.stream.read(rest) {
                Ok(0) if filled == 0 => return Err(TransportError::Disconnected),
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if filled > 0 && matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    break;
                }
                Err(e) => return Err(self.map_io(e)),
            }
        }
        trace!(len = filled, wanted = buffer.len(), "received");
        Ok(filled)
    }
}

/// Register one helper per hint, each over its own handle from `open_handle`.
///
/// A failing handle leaves the registry empty, so a later `open` starts
/// from scratch.
pub(crate) fn register_helpers<S, F>(
    registry: &mut HelperRegistry,
    hints: &[ProtocolHint],
    timeout_ms: u64,
    mut open_handle: F,
) -> TransportResult<()>
where
    S: Read + Write + Send + 'static,
    F: FnMut() -> std::io::Result<S>,
{
    for hint in hints {
        match open_handle() {
            Ok(stream) => {
                let helper = StreamTransferHelper::new(stream).with_timeout_ms(timeout_ms);
                registry.add_helper(*hint, Box::new(helper));
            }
            Err(e) => {
                registry.clear_helpers();
                return Err(e.into());
            }
        }
    }
    Ok(())
}
