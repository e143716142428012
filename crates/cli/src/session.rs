//! Opening a device described by a config.

use specbus_config::{BusConfig, DeviceConfig, ProtocolKind};
use specbus_core::{Bus, Protocol, ProtocolHint};
use specbus_features::DeviceFeatures;
use specbus_transport::{DeviceFileBus, TcpBus};
use tracing::{debug, info, warn};

use crate::error::CliError;

/// An open bus plus the feature set of the device behind it.
pub struct Session {
    bus: Box<dyn Bus>,
    pub features: DeviceFeatures,
}

impl Session {
    pub fn open(config: &DeviceConfig) -> Result<Self, CliError> {
        let mut bus = bus_for(config);
        bus.open()
            .map_err(|e| CliError::DeviceUnavailable(format!("{}: {e}", config.locator())))?;
        let mut features = features_for(config)?;
        features.spectrometer.set_gain_adjustment(config.gain_adjust);

        if config.load_calibration {
            if let Err(e) = features.load_calibration(bus.as_mut()) {
                warn!(error = %e, "calibration not loaded, using pixel indices");
            }
        }
        if config.binning_factor > 0 {
            features.set_pixel_binning_factor(bus.as_mut(), config.binning_factor)?;
        } else if let Some(factor) = features.sync_pixel_binning(bus.as_mut())? {
            debug!(factor, "binning factor read from device");
        }
        info!(device = %config.name, protocol = %features.protocol(), "session open");
        Ok(Self { bus, features })
    }

    pub fn protocol(&self) -> Protocol {
        self.features.protocol()
    }

    pub fn bus(&mut self) -> &mut dyn Bus {
        self.bus.as_mut()
    }

    /// Split borrow of the feature set and the bus.
    pub fn parts(&mut self) -> (&mut DeviceFeatures, &mut dyn Bus) {
        (&mut self.features, self.bus.as_mut())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.bus.close();
    }
}

pub fn hints_for(protocol: ProtocolKind) -> Vec<ProtocolHint> {
    match protocol {
        ProtocolKind::Ooi => specbus_ooi_protocol::ALL_HINTS.to_vec(),
        ProtocolKind::Obp => specbus_obp_protocol::ALL_HINTS.to_vec(),
    }
}

pub fn bus_for(config: &DeviceConfig) -> Box<dyn Bus> {
    let hints = hints_for(config.protocol);
    match &config.bus {
        BusConfig::Tcp {
            host,
            port,
            timeouts,
        } => Box::new(
            TcpBus::new(hints)
                .with_location(host.clone(), *port)
                .with_timeouts(*timeouts),
        ),
        BusConfig::Path { path } => Box::new(DeviceFileBus::new(hints).with_path(path.clone())),
    }
}

pub fn features_for(config: &DeviceConfig) -> Result<DeviceFeatures, CliError> {
    match config.protocol {
        ProtocolKind::Ooi => Ok(DeviceFeatures::ooi(config.ooi_model()?)?),
        ProtocolKind::Obp => {
            let spectrometer = config.spectrometer.as_ref().ok_or_else(|| {
                CliError::InvalidConfiguration("OBP devices need a `spectrometer` section".into())
            })?;
            Ok(DeviceFeatures::obp(
                spectrometer.geometry(),
                spectrometer.integration,
                spectrometer.max_intensity,
                spectrometer.light_source.into(),
            )?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_for_presets() -> Result<(), Box<dyn std::error::Error>> {
        let ooi = features_for(&specbus_config::preset("usb2000plus")?)?;
        assert_eq!(ooi.protocol(), specbus_ooi_protocol::OOI_PROTOCOL);
        assert!(ooi.gpio.is_none());

        let obp = features_for(&specbus_config::preset("obp-ethernet")?)?;
        assert_eq!(obp.spectrometer.geometry().pixels(), 2136);
        assert_eq!(hints_for(ProtocolKind::Obp).len(), 2);
        Ok(())
    }
}
