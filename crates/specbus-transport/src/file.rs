//! Bus over a character device or other file-like endpoint.

use std::fs::{File, OpenOptions};

use specbus_core::{Bus, DeviceLocator, HelperRegistry, ProtocolHint};
use specbus_errors::{TransportError, TransportResult};
use tracing::info;

use crate::stream::register_helpers;

/// A device exposed as a read/write node such as `/dev/ttyUSB0`.
#[derive(Debug)]
pub struct DeviceFileBus {
    location: Option<DeviceLocator>,
    hints: Vec<ProtocolHint>,
    file: Option<File>,
    registry: HelperRegistry,
}

impl DeviceFileBus {
    pub fn new(hints: impl Into<Vec<ProtocolHint>>) -> Self {
        Self {
            location: None,
            hints: hints.into(),
            file: None,
            registry: HelperRegistry::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.location = Some(DeviceLocator::Path { path: path.into() });
        self
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl Bus for DeviceFileBus {
    fn open(&mut self) -> TransportResult<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let path = match &self.location {
            Some(DeviceLocator::Path { path }) => path.clone(),
            Some(other) => return Err(TransportError::io(format!("{other} is not a device path"))),
            None => return Err(TransportError::io("no location set")),
        };
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| TransportError::io(format!("cannot open {path}: {e}")))?;
        register_helpers(&mut self.registry, &self.hints, 0, || file.try_clone())?;
        info!(%path, helpers = self.registry.len(), "device file bus open");
        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) {
        self.registry.clear_helpers();
        self.file = None;
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
