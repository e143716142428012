//! Scripted transport doubles.
//!
//! [`MockTransferHelper`] is a cheap handle onto shared state, so a test can
//! keep one clone for inspection after moving another into a [`MockBus`].

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use specbus_core::{Bus, DeviceLocator, HelperRegistry, ProtocolHint, TransferHelper};
use specbus_errors::{TransportError, TransportResult};

type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

#[derive(Default)]
struct MockState {
    reads: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    send_error: Option<TransportError>,
    receive_error: Option<TransportError>,
    send_limit: Option<usize>,
    responder: Option<Responder>,
}

/// A transfer helper fed from a queue of scripted reads.
///
/// Reads behave like a byte stream: a queued chunk larger than the caller's
/// buffer is consumed across several `receive` calls, a smaller one yields a
/// short count. An empty queue reports a timeout.
#[derive(Clone, Default)]
pub struct MockTransferHelper {
    state: Arc<Mutex<MockState>>,
}

impl MockTransferHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_read(&self, data: impl Into<Vec<u8>>) {
        self.state.lock().reads.push_back(data.into());
    }

    /// Call `responder` with every successful write and queue what it returns.
    pub fn respond_with<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        self.state.lock().responder = Some(Box::new(responder));
    }

    pub fn fail_sends(&self, error: TransportError) {
        self.state.lock().send_error = Some(error);
    }

    pub fn fail_receives(&self, error: TransportError) {
        self.state.lock().receive_error = Some(error);
    }

    /// Accept at most `limit` bytes per send.
    pub fn limit_sends(&self, limit: usize) {
        self.state.lock().send_limit = Some(limit);
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    pub fn last_write(&self) -> Option<Vec<u8>> {
        self.state.lock().writes.last().cloned()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    pub fn pending_reads(&self) -> usize {
        self.state.lock().reads.iter().map(Vec::len).sum()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.reads.clear();
        state.writes.clear();
    }
}

impl TransferHelper for MockTransferHelper {
    fn send(&mut self, buffer: &[u8]) -> TransportResult<usize> {
        let mut state = self.state.lock();
        if let Some(error) = state.send_error.clone() {
            return Err(error);
        }
        let accepted = state.send_limit.map_or(buffer.len(), |limit| limit.min(buffer.len()));
        let written = buffer.get(..accepted).unwrap_or(buffer).to_vec();
        if let Some(mut responder) = state.responder.take() {
            let replies = responder(&written);
            state.reads.extend(replies);
            state.responder = Some(responder);
        }
        state.writes.push(written);
        Ok(accepted)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> TransportResult<usize> {
        let mut state = self.state.lock();
        if let Some(error) = state.receive_error.clone() {
            return Err(error);
        }
        let Some(mut chunk) = state.reads.pop_front() else {
            return Err(TransportError::timeout(0));
        };
        let count = chunk.len().min(buffer.len());
        let rest = chunk.split_off(count);
        if let Some(target) = buffer.get_mut(..count) {
            target.copy_from_slice(&chunk);
        }
        if !rest.is_empty() {
            state.reads.push_front(rest);
        }
        Ok(count)
    }
}

/// An in-memory bus holding scripted helpers.
#[derive(Debug, Default)]
pub struct MockBus {
    registry: HelperRegistry,
    location: Option<DeviceLocator>,
    open: bool,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus with one shared helper registered under every hint in `hints`.
    pub fn with_hints(hints: &[ProtocolHint]) -> (Self, MockTransferHelper) {
        let helper = MockTransferHelper::new();
        let mut bus = Self::new();
        for hint in hints {
            bus.registry.add_helper(*hint, Box::new(helper.clone()));
        }
        (bus, helper)
    }

    pub fn with_helper(mut self, hint: ProtocolHint, helper: MockTransferHelper) -> Self {
        self.registry.add_helper(hint, Box::new(helper));
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Bus for MockBus {
    fn open(&mut self) -> TransportResult<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn location(&self) -> Option<&DeviceLocator> {
        self.location.as_ref()
    }

    fn set_location(&mut self, location: DeviceLocator) {
        self.location = Some(location);
    }

    fn registry(&self) -> &HelperRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut HelperRegistry {
        &mut self.registry
    }
}
