//! Bus over a TCP connection to a networked spectrometer.

use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use specbus_core::{Bus, DeviceLocator, HelperRegistry, ProtocolHint};
use specbus_errors::{TransportError, TransportResult};
use tracing::{debug, info, warn};

use crate::stream::register_helpers;

/// Socket timeouts in milliseconds; 0 disables one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpTimeouts {
    pub connect_ms: u64,
    pub read_ms: u64,
    pub write_ms: u64,
}

impl Default for TcpTimeouts {
    fn default() -> Self {
        Self {
            connect_ms: 3_000,
            read_ms: 5_000,
            write_ms: 1_000,
        }
    }
}

fn duration(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// A device reached over TCP.
///
/// Opening connects once and registers a helper for every configured hint,
/// each over a clone of the same socket. Closing drops the helpers and shuts
/// the socket down.
#[derive(Debug)]
pub struct TcpBus {
    location: Option<DeviceLocator>,
    hints: Vec<ProtocolHint>,
    timeouts: TcpTimeouts,
    stream: Option<TcpStream>,
    registry: HelperRegistry,
}

impl TcpBus {
    pub fn new(hints: impl Into<Vec<ProtocolHint>>) -> Self {
        Self {
            location: None,
            hints: hints.into(),
            timeouts: TcpTimeouts::default(),
            stream: None,
            registry: HelperRegistry::new(),
        }
    }

    pub fn with_location(mut self, host: impl Into<String>, port: u16) -> Self {
        self.location = Some(DeviceLocator::Tcp {
            host: host.into(),
            port,
        });
        self
    }

    pub fn with_timeouts(mut self, timeouts: TcpTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn resolve(&self) -> TransportResult<Vec<SocketAddr>> {
        match &self.location {
            Some(DeviceLocator::Tcp { host, port }) => Ok((host.as_str(), *port)
                .to_socket_addrs()
                .map_err(|e| TransportError::io(format!("cannot resolve {host}:{port}: {e}")))?
                .collect()),
            Some(other) => Err(TransportError::io(format!("{other} is not a TCP location"))),
            None => Err(TransportError::io("no location set")),
        }
    }

    fn connect(&self) -> TransportResult<TcpStream> {
        let mut last = TransportError::io("address resolved to nothing");
        for addr in self.resolve()? {
            let attempt = match duration(self.timeouts.connect_ms) {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last = e.into();
                }
            }
        }
        Err(last)
    }
}

impl Bus for TcpBus {
    fn open(&mut self) -> TransportResult<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = self.connect()?;
        stream.set_read_timeout(duration(self.timeouts.read_ms))?;
        stream.set_write_timeout(duration(self.timeouts.write_ms))?;
        stream.set_nodelay(true)?;

        register_helpers(&mut self.registry, &self.hints, self.timeouts.read_ms, || {
            stream.try_clone()
        })?;
        if let Some(location) = &self.location {
            info!(%location, helpers = self.registry.len(), "TCP bus open");
        }
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) {
        self.registry.clear_helpers();
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                warn!(error = %e, "TCP shutdown failed");
            }
        }
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

impl Drop for TcpBus {
    fn drop(&mut self) {
        self.close();
    }
}
