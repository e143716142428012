//! Per-device configuration file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use specbus_core::{DeviceLocator, IntegrationTimeLimits, MAX_BINNING_FACTOR, PixelWord, SpectrumGeometry};
use specbus_errors::{Result, SpecbusError};
use specbus_obp_protocol::IntensityMode;
use specbus_ooi_protocol::OoiModel;
use specbus_transport::TcpTimeouts;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    Ooi,
    Obp,
}

/// How the device is attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusConfig {
    Tcp {
        host: String,
        port: u16,
        #[serde(default)]
        timeouts: TcpTimeouts,
    },
    Path {
        path: String,
    },
}

impl BusConfig {
    pub fn locator(&self) -> DeviceLocator {
        match self {
            BusConfig::Tcp { host, port, .. } => DeviceLocator::Tcp {
                host: host.clone(),
                port: *port,
            },
            BusConfig::Path { path } => DeviceLocator::Path { path: path.clone() },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightSourceMode {
    Normalized,
    Counts,
    #[default]
    None,
}

impl From<LightSourceMode> for IntensityMode {
    fn from(mode: LightSourceMode) -> Self {
        match mode {
            LightSourceMode::Normalized => IntensityMode::Normalized,
            LightSourceMode::Counts => IntensityMode::Counts,
            LightSourceMode::None => IntensityMode::None,
        }
    }
}

/// Readout description of an OBP device; OOI models carry their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectrometerConfig {
    pub pixels: usize,
    #[serde(default = "default_word")]
    pub pixel_word: PixelWord,
    #[serde(default)]
    pub metadata_len: usize,
    pub max_intensity: f64,
    #[serde(default)]
    pub integration: IntegrationTimeLimits,
    #[serde(default)]
    pub light_source: LightSourceMode,
}

fn default_word() -> PixelWord {
    PixelWord::U16
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    pub name: String,
    pub protocol: ProtocolKind,
    /// OOI model name such as `USB2000+` or `usb4000`.
    #[serde(default)]
    pub model: Option<String>,
    pub bus: BusConfig,
    #[serde(default)]
    pub spectrometer: Option<SpectrometerConfig>,
    #[serde(default)]
    pub binning_factor: u8,
    #[serde(default = "default_true")]
    pub gain_adjust: bool,
    #[serde(default = "default_true")]
    pub load_calibration: bool,
}

impl DeviceConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| SpecbusError::config(format!("invalid YAML device config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| SpecbusError::config(format!("invalid JSON device config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are JSON, anything else YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading device config");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| SpecbusError::config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SpecbusError::config("device name must not be empty"));
        }
        if self.binning_factor > MAX_BINNING_FACTOR {
            return Err(SpecbusError::config(format!(
                "binning_factor {} exceeds {MAX_BINNING_FACTOR}",
                self.binning_factor
            )));
        }
        if let BusConfig::Tcp { host, port, .. } = &self.bus {
            if host.trim().is_empty() || *port == 0 {
                return Err(SpecbusError::config("TCP bus needs a host and a non-zero port"));
            }
        }
        match self.protocol {
            ProtocolKind::Ooi => {
                self.ooi_model()?;
            }
            ProtocolKind::Obp => {
                let spectrometer = self.spectrometer.as_ref().ok_or_else(|| {
                    SpecbusError::config("OBP devices need a `spectrometer` section")
                })?;
                spectrometer.validate()?;
            }
        }
        Ok(())
    }

    pub fn ooi_model(&self) -> Result<OoiModel> {
        let name = self
            .model
            .as_deref()
            .ok_or_else(|| SpecbusError::config("OOI devices need a `model`"))?;
        OoiModel::from_name(name)
            .ok_or_else(|| SpecbusError::config(format!("unknown OOI model {name:?}")))
    }

    pub fn locator(&self) -> DeviceLocator {
        self.bus.locator()
    }
}

impl SpectrometerConfig {
    fn validate(&self) -> Result<()> {
        if self.pixels == 0 {
            return Err(SpecbusError::config("pixels must be positive"));
        }
        if !self.max_intensity.is_finite() || self.max_intensity <= 0.0 {
            return Err(SpecbusError::config("max_intensity must be a positive number"));
        }
        let limits = &self.integration;
        if limits.min_us > limits.max_us || limits.increment_us == 0 || limits.base_us == 0 {
            return Err(SpecbusError::config(format!(
                "integration limits are inconsistent: {limits:?}"
            )));
        }
        Ok(())
    }

    pub fn geometry(&self) -> SpectrumGeometry {
        SpectrumGeometry::new(self.pixels, self.pixel_word).with_metadata(self.metadata_len)
    }
}
