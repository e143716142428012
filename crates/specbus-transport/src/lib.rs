//! Concrete transports for specbus.
//!
//! [`StreamTransferHelper`] adapts any blocking `Read + Write` byte stream to
//! the [`TransferHelper`](specbus_core::TransferHelper) contract. [`TcpBus`]
//! and [`DeviceFileBus`] open a transport for a
//! [`DeviceLocator`](specbus_core::DeviceLocator) and register one helper per
//! protocol hint, each over its own handle to the same connection.

#![deny(static_mut_refs)]

pub mod file;
pub mod stream;
pub mod tcp;

pub use file::DeviceFileBus;
pub use stream::StreamTransferHelper;
pub use tcp::{TcpBus, TcpTimeouts};
