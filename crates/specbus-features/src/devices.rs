//! Feature sets of the supported device families.

use specbus_core::interfaces::{
    BufferedSpectrumProtocol, CoefficientsProtocol, EepromProtocol, LightSourceProtocol,
    SaturationProtocol, SerialNumberProtocol, SpectrometerProtocol, TemperatureProtocol,
};
use specbus_core::{Bus, IntegrationTimeLimits, Protocol, SpectrumGeometry};
use specbus_errors::{FeatureError, FeatureResult};
use specbus_obp_protocol::{
    IntensityMode, OBP_PROTOCOL, ObpAcquisitionDelayProtocol, ObpBufferedSpectrumProtocol,
    ObpCoefficientsProtocol, ObpGpioProtocol, ObpIpv4Protocol, ObpLightSourceProtocol,
    ObpPixelBinningProtocol, ObpSaturationProtocol, ObpSerialNumberProtocol,
    ObpSpectrometerProtocol, ObpTemperatureProtocol,
};
use specbus_ooi_protocol::{
    OOI_PROTOCOL, OoiCoefficientsProtocol, OoiEepromProtocol, OoiModel, OoiSaturationProtocol,
    OoiSerialNumberProtocol, OoiSpectrometerProtocol, OoiStrobeLampProtocol,
    OoiTemperatureProtocol,
};
use tracing::info;

use crate::buffered::BufferedSpectrumFeature;
use crate::calibration::CoefficientsFeature;
use crate::network::{NetworkConfigurationFeature, SerialNumberFeature};
use crate::peripherals::{
    AcquisitionDelayFeature, EepromFeature, GpioFeature, LightSourceFeature, PixelBinningFeature,
    SaturationFeature, TemperatureFeature,
};
use crate::spectrometer::SpectrometerFeature;

/// Every feature one device offers, bound to the protocol it speaks.
#[derive(Debug)]
pub struct DeviceFeatures {
    protocol: Protocol,
    pub spectrometer: SpectrometerFeature,
    pub serial_number: Option<SerialNumberFeature>,
    pub temperature: Option<TemperatureFeature>,
    pub gpio: Option<GpioFeature>,
    pub light_source: Option<LightSourceFeature>,
    pub eeprom: Option<EepromFeature>,
    pub coefficients: Option<CoefficientsFeature>,
    pub pixel_binning: Option<PixelBinningFeature>,
    pub acquisition_delay: Option<AcquisitionDelayFeature>,
    pub network: Option<NetworkConfigurationFeature>,
    pub buffered: Option<BufferedSpectrumFeature>,
}

impl DeviceFeatures {
    fn empty(protocol: Protocol, spectrometer: SpectrometerFeature) -> Self {
        Self {
            protocol,
            spectrometer,
            serial_number: None,
            temperature: None,
            gpio: None,
            light_source: None,
            eeprom: None,
            coefficients: None,
            pixel_binning: None,
            acquisition_delay: None,
            network: None,
            buffered: None,
        }
    }

    pub fn ooi(model: OoiModel) -> FeatureResult<Self> {
        let helper: Box<dyn SpectrometerProtocol> = Box::new(OoiSpectrometerProtocol::for_model(model));
        let saturation: Box<dyn SaturationProtocol> = Box::new(OoiSaturationProtocol);
        let mut spectrometer =
            SpectrometerFeature::new(vec![helper])?.with_saturation(SaturationFeature::new(vec![saturation]));
        spectrometer.set_gain_adjustment(model == OoiModel::Usb2000Plus);

        let serial: Box<dyn SerialNumberProtocol> = Box::new(OoiSerialNumberProtocol);
        let eeprom: Box<dyn EepromProtocol> = Box::new(OoiEepromProtocol);
        let coefficients: Box<dyn CoefficientsProtocol> = Box::new(OoiCoefficientsProtocol);
        let lamp: Box<dyn LightSourceProtocol> = Box::new(OoiStrobeLampProtocol::default());

        let mut features = Self::empty(OOI_PROTOCOL, spectrometer);
        features.serial_number = Some(SerialNumberFeature::new(vec![serial]));
        features.eeprom = Some(EepromFeature::new(vec![eeprom]));
        features.coefficients = Some(CoefficientsFeature::new(vec![coefficients]));
        features.light_source = Some(LightSourceFeature::new(vec![lamp]));
        if model.has_pcb_temperature() {
            let temperature: Box<dyn TemperatureProtocol> = Box::new(OoiTemperatureProtocol);
            features.temperature = Some(TemperatureFeature::new(vec![temperature]));
        }
        info!(model = model.name(), "assembled OOI feature set");
        Ok(features)
    }

    pub fn obp(
        geometry: SpectrumGeometry,
        limits: IntegrationTimeLimits,
        max_intensity: f64,
        light_source: IntensityMode,
    ) -> FeatureResult<Self> {
        let helper: Box<dyn SpectrometerProtocol> =
            Box::new(ObpSpectrometerProtocol::new(geometry, limits, max_intensity));
        let saturation: Box<dyn SaturationProtocol> = Box::new(ObpSaturationProtocol);
        let mut spectrometer =
            SpectrometerFeature::new(vec![helper])?.with_saturation(SaturationFeature::new(vec![saturation]));
        spectrometer.set_gain_adjustment(true);

        let buffered: Box<dyn BufferedSpectrumProtocol> = Box::new(
            ObpBufferedSpectrumProtocol::new()
                .map_err(|e| FeatureError::control("buffered_spectrum", "encode_request", e))?,
        );

        let mut features = Self::empty(OBP_PROTOCOL, spectrometer);
        features.serial_number = Some(SerialNumberFeature::new(vec![Box::new(ObpSerialNumberProtocol)]));
        features.temperature = Some(TemperatureFeature::new(vec![Box::new(ObpTemperatureProtocol)]));
        features.gpio = Some(GpioFeature::new(vec![Box::new(ObpGpioProtocol)]));
        features.light_source = Some(LightSourceFeature::new(vec![Box::new(
            ObpLightSourceProtocol::new(light_source),
        )]));
        features.coefficients = Some(CoefficientsFeature::new(vec![Box::new(ObpCoefficientsProtocol)]));
        features.pixel_binning = Some(PixelBinningFeature::new(vec![Box::new(ObpPixelBinningProtocol)]));
        features.acquisition_delay = Some(AcquisitionDelayFeature::new(vec![Box::new(
            ObpAcquisitionDelayProtocol,
        )]));
        features.network = Some(NetworkConfigurationFeature::new(vec![Box::new(ObpIpv4Protocol)]));
        features.buffered = Some(BufferedSpectrumFeature::new(vec![buffered]));
        info!(pixels = geometry.unbinned_pixels(), "assembled OBP feature set");
        Ok(features)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Load the wavelength calibration and nonlinearity correction stored
    /// on the device into the spectrometer feature.
    pub fn load_calibration(&mut self, bus: &mut dyn Bus) -> FeatureResult<()> {
        let coefficients = require(self.coefficients.as_ref(), "calibration coefficients")?;
        let calibration = coefficients.wavelength_calibration(&self.protocol, bus)?;
        let correction = coefficients.nonlinearity_correction(&self.protocol, bus)?;
        self.spectrometer.set_wavelength_calibration(&calibration);
        self.spectrometer.set_nonlinearity_correction(Some(correction));
        Ok(())
    }

    pub fn set_pixel_binning_factor(&mut self, bus: &mut dyn Bus, factor: u8) -> FeatureResult<()> {
        let binning = require(self.pixel_binning.as_ref(), "pixel binning")?;
        self.spectrometer
            .set_pixel_binning_factor(&self.protocol, bus, binning, factor)
    }

    /// Bring the spectrometer geometry in line with the binning factor the
    /// device already uses. `None` when the device has no binning.
    pub fn sync_pixel_binning(&mut self, bus: &mut dyn Bus) -> FeatureResult<Option<u8>> {
        let Some(binning) = self.pixel_binning.as_ref() else {
            return Ok(None);
        };
        self.spectrometer
            .sync_pixel_binning(&self.protocol, bus, binning)
            .map(Some)
    }
}

/// Borrow an optional feature or report it as unavailable.
pub fn require<'a, T>(feature: Option<&'a T>, capability: &'static str) -> FeatureResult<&'a T> {
    feature.ok_or(FeatureError::CapabilityUnavailable {
        feature: "device",
        capability,
    })
}
