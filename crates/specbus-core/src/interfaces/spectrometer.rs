//! Spectrum acquisition capabilities.

use core::fmt;

use serde::{Deserialize, Serialize};
use specbus_errors::{ProtocolError, ProtocolResult};

use crate::bus::Bus;
use crate::geometry::{IntegrationTimeLimits, SpectrumGeometry};
use crate::protocol::ProtocolHelper;

/// How acquisitions are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    Normal,
    Software,
    ExternalLevel,
    ExternalSynchronous,
    ExternalEdge,
}

impl TriggerMode {
    pub const fn code(self) -> u8 {
        match self {
            TriggerMode::Normal => 0,
            TriggerMode::Software => 1,
            TriggerMode::ExternalLevel => 2,
            TriggerMode::ExternalSynchronous => 3,
            TriggerMode::ExternalEdge => 4,
        }
    }
}

impl TryFrom<u8> for TriggerMode {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TriggerMode::Normal),
            1 => Ok(TriggerMode::Software),
            2 => Ok(TriggerMode::ExternalLevel),
            3 => Ok(TriggerMode::ExternalSynchronous),
            4 => Ok(TriggerMode::ExternalEdge),
            other => Err(ProtocolError::encoding(format!("unknown trigger mode {other}"))),
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerMode::Normal => "normal",
            TriggerMode::Software => "software",
            TriggerMode::ExternalLevel => "external-level",
            TriggerMode::ExternalSynchronous => "external-synchronous",
            TriggerMode::ExternalEdge => "external-edge",
        };
        f.write_str(name)
    }
}

/// Core acquisition operations of a spectrometer.
///
/// A spectrum is read in two steps: `request_spectrum` starts the
/// acquisition, then `read_unformatted_spectrum` collects the raw readout of
/// `geometry.unformatted_len()` bytes. `decode_spectrum` turns that readout
/// into one intensity per logical pixel.
pub trait SpectrometerProtocol: ProtocolHelper {
    /// Power-on geometry of the device (no binning).
    fn geometry(&self) -> SpectrumGeometry;

    fn integration_time_limits(&self) -> IntegrationTimeLimits;

    /// Largest intensity a pixel can report.
    fn max_intensity(&self) -> f64;

    fn request_spectrum(&self, bus: &mut dyn Bus) -> ProtocolResult<()>;

    fn read_unformatted_spectrum(
        &self,
        bus: &mut dyn Bus,
        geometry: &SpectrumGeometry,
    ) -> ProtocolResult<Vec<u8>>;

    fn decode_spectrum(&self, raw: &[u8], geometry: &SpectrumGeometry) -> ProtocolResult<Vec<f64>>;

    fn read_formatted_spectrum(
        &self,
        bus: &mut dyn Bus,
        geometry: &SpectrumGeometry,
    ) -> ProtocolResult<Vec<f64>> {
        let raw = self.read_unformatted_spectrum(bus, geometry)?;
        self.decode_spectrum(&raw, geometry)
    }

    fn set_integration_time_micros(&self, bus: &mut dyn Bus, micros: u64) -> ProtocolResult<()>;

    fn set_trigger_mode(&self, bus: &mut dyn Bus, mode: TriggerMode) -> ProtocolResult<()>;
}

/// On-device pixel binning.
pub trait PixelBinningProtocol: ProtocolHelper {
    fn binning_factor(&self, bus: &mut dyn Bus) -> ProtocolResult<u8>;

    fn set_binning_factor(&self, bus: &mut dyn Bus, factor: u8) -> ProtocolResult<()>;

    fn default_binning_factor(&self, bus: &mut dyn Bus) -> ProtocolResult<u8>;

    fn max_binning_factor(&self, bus: &mut dyn Bus) -> ProtocolResult<u8>;
}

/// Spectra accumulated in an on-device buffer and read back in bulk.
pub trait BufferedSpectrumProtocol: ProtocolHelper {
    /// Raw bytes of up to `count` buffered samples, each
    /// `geometry.fast_buffer_len()` long.
    fn read_buffered_spectra(
        &self,
        bus: &mut dyn Bus,
        count: u32,
        geometry: &SpectrumGeometry,
    ) -> ProtocolResult<Vec<u8>>;
}

/// Calibration polynomials stored on the device, lowest order first.
pub trait CoefficientsProtocol: ProtocolHelper {
    fn wavelength_coefficients(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>>;

    fn nonlinearity_coefficients(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>>;
}
