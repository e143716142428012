//! Features for the capabilities around acquisition.

use specbus_core::interfaces::{
    AcquisitionDelayProtocol, EepromProtocol, GpioProtocol, IntensityControl, LightSourceProtocol,
    PixelBinningProtocol, SaturationProtocol, TemperatureProtocol,
};
use specbus_core::{Bus, FeatureImpl, Protocol};
use specbus_errors::{FeatureError, FeatureResult};
use tracing::debug;

#[derive(Debug)]
pub struct AcquisitionDelayFeature {
    helpers: FeatureImpl<dyn AcquisitionDelayProtocol>,
}

impl AcquisitionDelayFeature {
    pub fn new(helpers: Vec<Box<dyn AcquisitionDelayProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("acquisition_delay", helpers),
        }
    }

    pub fn delay_micros(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u64> {
        self.helpers
            .dispatch(protocol, "delay_micros", |h| h.delay_micros(bus))
    }

    pub fn set_delay_micros(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        micros: u64,
    ) -> FeatureResult<()> {
        self.helpers
            .dispatch(protocol, "set_delay_micros", |h| h.set_delay_micros(bus, micros))
    }
}

#[derive(Debug)]
pub struct TemperatureFeature {
    helpers: FeatureImpl<dyn TemperatureProtocol>,
}

impl TemperatureFeature {
    pub fn new(helpers: Vec<Box<dyn TemperatureProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("temperature", helpers),
        }
    }

    pub fn count(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<usize> {
        self.helpers
            .dispatch(protocol, "temperature_count", |h| h.temperature_count(bus))
    }

    pub fn read(&self, protocol: &Protocol, bus: &mut dyn Bus, index: usize) -> FeatureResult<f64> {
        let count = self.count(protocol, bus)?;
        if index >= count {
            return Err(FeatureError::illegal_argument(
                "index",
                index,
                format!("device has {count} temperature sensors"),
            ));
        }
        self.helpers
            .dispatch(protocol, "read_temperature", |h| h.read_temperature(bus, index))
    }

    pub fn read_all(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<Vec<f64>> {
        self.helpers
            .dispatch(protocol, "read_all_temperatures", |h| h.read_all_temperatures(bus))
    }
}

#[derive(Debug)]
pub struct GpioFeature {
    helpers: FeatureImpl<dyn GpioProtocol>,
}

impl GpioFeature {
    pub fn new(helpers: Vec<Box<dyn GpioProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("gpio", helpers),
        }
    }

    pub fn pin_count(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u8> {
        self.helpers.dispatch(protocol, "pin_count", |h| h.pin_count(bus))
    }

    pub fn output_enable_vector(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u32> {
        self.helpers
            .dispatch(protocol, "output_enable_vector", |h| h.output_enable_vector(bus))
    }

    pub fn set_output_enable_vector(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        bits: u32,
        mask: u32,
    ) -> FeatureResult<()> {
        self.helpers.dispatch(protocol, "set_output_enable_vector", |h| {
            h.set_output_enable_vector(bus, bits, mask)
        })
    }

    pub fn value_vector(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u32> {
        self.helpers.dispatch(protocol, "value_vector", |h| h.value_vector(bus))
    }

    pub fn set_value_vector(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        bits: u32,
        mask: u32,
    ) -> FeatureResult<()> {
        self.helpers
            .dispatch(protocol, "set_value_vector", |h| h.set_value_vector(bus, bits, mask))
    }

    /// Drive a single pin, leaving the others untouched.
    pub fn set_pin(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        pin: u8,
        high: bool,
    ) -> FeatureResult<()> {
        let pins = self.pin_count(protocol, bus)?;
        if pin >= pins || pin >= 32 {
            return Err(FeatureError::illegal_argument(
                "pin",
                pin,
                format!("device has {pins} GPIO pins"),
            ));
        }
        let mask = 1u32 << pin;
        let bits = if high { mask } else { 0 };
        self.set_value_vector(protocol, bus, bits, mask)
    }
}

#[derive(Debug)]
pub struct LightSourceFeature {
    helpers: FeatureImpl<dyn LightSourceProtocol>,
}

impl LightSourceFeature {
    pub fn new(helpers: Vec<Box<dyn LightSourceProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("light_source", helpers),
        }
    }

    pub fn source_count(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u8> {
        self.helpers.dispatch(protocol, "source_count", |h| h.source_count(bus))
    }

    pub fn is_enabled(&self, protocol: &Protocol, bus: &mut dyn Bus, source: u8) -> FeatureResult<bool> {
        self.helpers
            .dispatch(protocol, "is_enabled", |h| h.is_enabled(bus, source))
    }

    pub fn set_enabled(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        source: u8,
        enable: bool,
    ) -> FeatureResult<()> {
        self.helpers
            .dispatch(protocol, "set_enabled", |h| h.set_enabled(bus, source, enable))
    }

    pub fn has_intensity_control(&self, protocol: &Protocol) -> FeatureResult<bool> {
        let helper = self.helpers.lookup_protocol_impl(protocol)?;
        Ok(!matches!(helper.intensity_control(), IntensityControl::Unsupported))
    }

    /// Intensity as a fraction of full output, whichever way the helper
    /// exposes it.
    pub fn intensity(&self, protocol: &Protocol, bus: &mut dyn Bus, source: u8) -> FeatureResult<f64> {
        let helper = self.helpers.lookup_protocol_impl(protocol)?;
        let result = match helper.intensity_control() {
            IntensityControl::Normalized(control) => control.intensity(bus, source),
            IntensityControl::Counts(control) => control.counts_range(bus, source).and_then(|(min, max)| {
                let counts = control.intensity_counts(bus, source)?;
                Ok(counts_to_normalized(counts, min, max))
            }),
            IntensityControl::Unsupported => return Err(self.no_intensity()),
        };
        result.map_err(|e| FeatureError::control(self.helpers.name(), "intensity", e))
    }

    pub fn set_intensity(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        source: u8,
        intensity: f64,
    ) -> FeatureResult<()> {
        if !(0.0..=1.0).contains(&intensity) {
            return Err(FeatureError::illegal_argument(
                "intensity",
                intensity,
                "must be within [0, 1]",
            ));
        }
        let helper = self.helpers.lookup_protocol_impl(protocol)?;
        let result = match helper.intensity_control() {
            IntensityControl::Normalized(control) => control.set_intensity(bus, source, intensity),
            IntensityControl::Counts(control) => control.counts_range(bus, source).and_then(|(min, max)| {
                let counts = normalized_to_counts(intensity, min, max);
                debug!(counts, min, max, "setting light source intensity in counts");
                control.set_intensity_counts(bus, source, counts)
            }),
            IntensityControl::Unsupported => return Err(self.no_intensity()),
        };
        result.map_err(|e| FeatureError::control(self.helpers.name(), "set_intensity", e))
    }

    fn no_intensity(&self) -> FeatureError {
        FeatureError::CapabilityUnavailable {
            feature: self.helpers.name(),
            capability: "intensity control",
        }
    }
}

/// `min + (max - min) * normalized`, rounded to the nearest count.
pub fn normalized_to_counts(normalized: f64, min: u32, max: u32) -> u32 {
    let span = f64::from(max.saturating_sub(min));
    let offset = (span * normalized.clamp(0.0, 1.0)).round();
    min.saturating_add(offset as u32)
}

pub fn counts_to_normalized(counts: u32, min: u32, max: u32) -> f64 {
    let span = max.saturating_sub(min);
    if span == 0 {
        return 0.0;
    }
    (f64::from(counts.clamp(min, max) - min) / f64::from(span)).clamp(0.0, 1.0)
}

#[derive(Debug)]
pub struct EepromFeature {
    helpers: FeatureImpl<dyn EepromProtocol>,
}

impl EepromFeature {
    pub fn new(helpers: Vec<Box<dyn EepromProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("eeprom", helpers),
        }
    }

    pub fn read_slot(&self, protocol: &Protocol, bus: &mut dyn Bus, index: u16) -> FeatureResult<Vec<u8>> {
        let slots = self.helpers.lookup_protocol_impl(protocol)?.slot_count();
        if index >= slots {
            return Err(FeatureError::illegal_argument(
                "slot",
                index,
                format!("device has {slots} EEPROM slots"),
            ));
        }
        self.helpers.dispatch(protocol, "read_slot", |h| h.read_slot(bus, index))
    }
}

#[derive(Debug)]
pub struct SaturationFeature {
    helpers: FeatureImpl<dyn SaturationProtocol>,
}

impl SaturationFeature {
    pub fn new(helpers: Vec<Box<dyn SaturationProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("saturation", helpers),
        }
    }

    pub fn saturation_level(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u32> {
        self.helpers
            .dispatch(protocol, "saturation_level", |h| h.saturation_level(bus))
    }
}

#[derive(Debug)]
pub struct PixelBinningFeature {
    helpers: FeatureImpl<dyn PixelBinningProtocol>,
}

impl PixelBinningFeature {
    pub fn new(helpers: Vec<Box<dyn PixelBinningProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("pixel_binning", helpers),
        }
    }

    pub fn binning_factor(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u8> {
        self.helpers.dispatch(protocol, "binning_factor", |h| h.binning_factor(bus))
    }

    pub fn default_binning_factor(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u8> {
        self.helpers
            .dispatch(protocol, "default_binning_factor", |h| h.default_binning_factor(bus))
    }

    pub fn max_binning_factor(&self, protocol: &Protocol, bus: &mut dyn Bus) -> FeatureResult<u8> {
        self.helpers
            .dispatch(protocol, "max_binning_factor", |h| h.max_binning_factor(bus))
    }

    pub fn set_binning_factor(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        factor: u8,
    ) -> FeatureResult<()> {
        let max = self.max_binning_factor(protocol, bus)?;
        if factor > max {
            return Err(FeatureError::illegal_argument(
                "binning_factor",
                factor,
                format!("device allows at most {max}"),
            ));
        }
        self.helpers
            .dispatch(protocol, "set_binning_factor", |h| h.set_binning_factor(bus, factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_mapping_endpoints() {
        assert_eq!(normalized_to_counts(0.0, 100, 4095), 100);
        assert_eq!(normalized_to_counts(1.0, 100, 4095), 4095);
        assert_eq!(normalized_to_counts(0.5, 0, 100), 50);
        assert!((counts_to_normalized(4095, 100, 4095) - 1.0).abs() < 1e-12);
        assert!(counts_to_normalized(7, 5, 5).abs() < 1e-12);
    }
}
