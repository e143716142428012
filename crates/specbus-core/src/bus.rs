//! Transport attachment and hint-based routing of exchanges to transfer helpers.

use core::fmt;

use serde::{Deserialize, Serialize};
use specbus_errors::TransportResult;
use tracing::debug;

use crate::hint::ProtocolHint;

/// Raw byte mover for one transport endpoint.
///
/// Both methods return the number of bytes actually moved. `receive` must
/// report a read timeout as [`TransportError::Timeout`](specbus_errors::TransportError::Timeout)
/// rather than as a generic I/O error.
pub trait TransferHelper: Send {
    fn send(&mut self, buffer: &[u8]) -> TransportResult<usize>;

    fn receive(&mut self, buffer: &mut [u8]) -> TransportResult<usize>;
}

impl<T: TransferHelper + ?Sized> TransferHelper for Box<T> {
    fn send(&mut self, buffer: &[u8]) -> TransportResult<usize> {
        (**self).send(buffer)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> TransportResult<usize> {
        (**self).receive(buffer)
    }
}

/// Where a device is attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceLocator {
    Tcp { host: String, port: u16 },
    Usb { vendor_id: u16, product_id: u16 },
    Path { path: String },
}

impl fmt::Display for DeviceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceLocator::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            DeviceLocator::Usb {
                vendor_id,
                product_id,
            } => write!(f, "usb:{vendor_id:04x}:{product_id:04x}"),
            DeviceLocator::Path { path } => write!(f, "{path}"),
        }
    }
}

/// Ordered (hint, helper) associations owned by a bus.
#[derive(Default)]
pub struct HelperRegistry {
    entries: Vec<(ProtocolHint, Box<dyn TransferHelper>)>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_helper(&mut self, hint: ProtocolHint, helper: Box<dyn TransferHelper>) {
        debug!(hint = %hint, "registered transfer helper");
        self.entries.push((hint, helper));
    }

    /// Drop every hint and helper.
    pub fn clear_helpers(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hints(&self) -> impl Iterator<Item = &ProtocolHint> {
        self.entries.iter().map(|(hint, _)| hint)
    }

    /// First helper registered under a hint equal to `hints[0]`.
    ///
    /// Only the first hint is consulted: exchanges of this device family map
    /// one-to-one onto helpers.
    pub fn helper_for(&mut self, hints: &[ProtocolHint]) -> Option<&mut dyn TransferHelper> {
        let wanted = hints.first()?;
        for (hint, helper) in self.entries.iter_mut() {
            if hint == wanted {
                let helper: &mut dyn TransferHelper = helper.as_mut();
                return Some(helper);
            }
        }
        None
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hints()).finish()
    }
}

/// A transport attachment plus its routing table.
///
/// Concrete buses differ only in how they open and close the transport and in
/// which helpers they register while opening. A bus is driven by one caller
/// at a time; the `&mut self` receivers make that explicit.
pub trait Bus: Send {
    fn open(&mut self) -> TransportResult<()>;

    fn close(&mut self);

    fn location(&self) -> Option<&DeviceLocator>;

    fn set_location(&mut self, location: DeviceLocator);

    fn registry(&self) -> &HelperRegistry;

    fn registry_mut(&mut self) -> &mut HelperRegistry;

    fn helper(&mut self, hints: &[ProtocolHint]) -> Option<&mut dyn TransferHelper> {
        self.registry_mut().helper_for(hints)
    }
}
