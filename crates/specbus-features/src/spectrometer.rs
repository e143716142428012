//! The spectrometer feature: acquisition, integration time, binning and the
//! derived wavelength table.

use specbus_core::interfaces::{SpectrometerProtocol, TriggerMode};
use specbus_core::{Bus, FeatureImpl, IntegrationTimeLimits, Protocol, SpectrumGeometry};
use specbus_errors::{FeatureError, FeatureResult};
use tracing::{debug, warn};

use crate::calibration::{NonlinearityCorrection, WavelengthCalibration};
use crate::gain::adjust_spectrum;
use crate::peripherals::{PixelBinningFeature, SaturationFeature};

const NAME: &str = "spectrometer";

/// Acquisition front end of one device.
///
/// The feature owns the current [`SpectrumGeometry`]; read lengths, the
/// formatted length and the wavelength table all follow its binning factor.
pub struct SpectrometerFeature {
    helpers: FeatureImpl<dyn SpectrometerProtocol>,
    geometry: SpectrumGeometry,
    limits: IntegrationTimeLimits,
    max_intensity: f64,
    unbinned_wavelengths: Vec<f64>,
    wavelengths: Vec<f64>,
    saturation: Option<SaturationFeature>,
    gain_adjust: bool,
    nonlinearity: Option<NonlinearityCorrection>,
}

impl SpectrometerFeature {
    /// Geometry, limits and full scale are taken from the first helper.
    pub fn new(helpers: Vec<Box<dyn SpectrometerProtocol>>) -> FeatureResult<Self> {
        let first = helpers.first().ok_or(FeatureError::CapabilityUnavailable {
            feature: NAME,
            capability: "spectrum acquisition",
        })?;
        let geometry = first.geometry();
        let limits = first.integration_time_limits();
        let max_intensity = first.max_intensity();
        let unbinned_wavelengths = (0..geometry.unbinned_pixels()).map(|p| p as f64).collect();
        let mut feature = Self {
            helpers: FeatureImpl::new(NAME, helpers),
            geometry,
            limits,
            max_intensity,
            unbinned_wavelengths,
            wavelengths: Vec::new(),
            saturation: None,
            gain_adjust: false,
            nonlinearity: None,
        };
        feature.wavelengths = feature.geometry.binned_wavelengths(&feature.unbinned_wavelengths);
        Ok(feature)
    }

    /// Companion feature consulted for the saturation level on every read.
    pub fn with_saturation(mut self, saturation: SaturationFeature) -> Self {
        self.saturation = Some(saturation);
        self
    }

    pub fn set_gain_adjustment(&mut self, enable: bool) {
        self.gain_adjust = enable;
    }

    pub fn set_nonlinearity_correction(&mut self, correction: Option<NonlinearityCorrection>) {
        self.nonlinearity = correction;
    }

    pub fn geometry(&self) -> &SpectrumGeometry {
        &self.geometry
    }

    pub fn integration_time_limits(&self) -> IntegrationTimeLimits {
        self.limits
    }

    pub fn max_intensity(&self) -> f64 {
        self.max_intensity
    }

    pub fn supports(&self, protocol: &Protocol) -> bool {
        self.helpers.supports(protocol)
    }

    pub fn request_spectrum(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<()> {
        self.helpers
            .dispatch(protocol, "request_spectrum", |h| h.request_spectrum(bus))
    }

    pub fn unformatted_spectrum(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<Vec<u8>> {
        let geometry = self.geometry;
        self.helpers.dispatch(protocol, "read_unformatted_spectrum", |h| {
            h.read_unformatted_spectrum(bus, &geometry)
        })
    }

    /// Read and decode one spectrum, applying gain adjustment and
    /// nonlinearity correction when enabled.
    pub fn formatted_spectrum(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<Vec<f64>> {
        let geometry = self.geometry;
        let mut spectrum = self.helpers.dispatch(protocol, "read_formatted_spectrum", |h| {
            h.read_formatted_spectrum(bus, &geometry)
        })?;
        if self.gain_adjust {
            let saturation = self.saturation_level(protocol, bus);
            adjust_spectrum(&mut spectrum, self.max_intensity, saturation);
        }
        if let Some(correction) = &self.nonlinearity {
            correction.apply(&mut spectrum);
        }
        Ok(spectrum)
    }

    /// Request then read, the usual acquisition sequence.
    pub fn acquire(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<Vec<f64>> {
        self.request_spectrum(protocol, bus)?;
        self.formatted_spectrum(protocol, bus)
    }

    fn saturation_level(&self, protocol: &Protocol, bus: &mut dyn Bus) -> f64 {
        let Some(feature) = &self.saturation else {
            return self.max_intensity;
        };
        match feature.saturation_level(protocol, bus) {
            Ok(level) if level > 0 => f64::from(level),
            Ok(_) => self.max_intensity,
            Err(e) => {
                warn!(error = %e, "saturation level unavailable, assuming full scale");
                self.max_intensity
            }
        }
    }

    pub fn set_integration_time_micros(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        micros: u64,
    ) -> FeatureResult<u64> {
        let aligned = self.limits.check(micros)?;
        self.helpers.dispatch(protocol, "set_integration_time", |h| {
            h.set_integration_time_micros(bus, aligned)
        })?;
        Ok(aligned)
    }

    pub fn set_trigger_mode(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        mode: TriggerMode,
    ) -> FeatureResult<()> {
        self.helpers
            .dispatch(protocol, "set_trigger_mode", |h| h.set_trigger_mode(bus, mode))
    }

    /// Change the on-device binning and keep the geometry and wavelength
    /// table in step with it.
    pub fn set_pixel_binning_factor(
        &mut self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        binning: &PixelBinningFeature,
        factor: u8,
    ) -> FeatureResult<()> {
        let updated = self.geometry.binned(factor)?;
        binning.set_binning_factor(protocol, bus, factor)?;
        self.apply_geometry(updated);
        Ok(())
    }

    /// Adopt the binning factor the device is already using, without
    /// writing it. Returns the factor read.
    pub fn sync_pixel_binning(
        &mut self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        binning: &PixelBinningFeature,
    ) -> FeatureResult<u8> {
        let factor = binning.binning_factor(protocol, bus)?;
        let updated = self.geometry.binned(factor)?;
        self.apply_geometry(updated);
        Ok(factor)
    }

    fn apply_geometry(&mut self, updated: SpectrumGeometry) {
        debug!(
            factor = updated.binning_factor(),
            pixels = updated.pixels(),
            unformatted_len = updated.unformatted_len(),
            "binning factor changed"
        );
        self.geometry = updated;
        self.wavelengths = updated.binned_wavelengths(&self.unbinned_wavelengths);
    }

    pub fn set_wavelength_calibration(&mut self, calibration: &WavelengthCalibration) {
        self.unbinned_wavelengths = calibration.table(self.geometry.unbinned_pixels());
        self.wavelengths = self.geometry.binned_wavelengths(&self.unbinned_wavelengths);
    }

    /// Wavelength of every logical pixel at the current binning.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn unbinned_wavelengths(&self) -> &[f64] {
        &self.unbinned_wavelengths
    }
}

impl core::fmt::Debug for SpectrometerFeature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpectrometerFeature")
            .field("helpers", &self.helpers)
            .field("geometry", &self.geometry)
            .field("gain_adjust", &self.gain_adjust)
            .finish_non_exhaustive()
    }
}
