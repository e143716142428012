//! Capability implementations for the OOI command set.

use specbus_core::interfaces::{
    CoefficientsProtocol, EepromProtocol, IntensityControl, LightSourceProtocol,
    SaturationProtocol, SerialNumberProtocol, SpectrometerProtocol, TemperatureProtocol,
    TriggerMode,
};
use specbus_core::{
    Bus, IntegrationTimeLimits, Protocol, ProtocolError, ProtocolHelper, ProtocolResult,
    SpectrumGeometry, execute, query,
};
use tracing::debug;

use crate::decode::{PixelLayout, decode_with_sync};
use crate::exchanges::{self, IntegrationTimeExchange, OoiStatus};
use crate::ids::{EEPROM_SLOT_COUNT, OOI_PROTOCOL, eeprom_slots};
use crate::models::OoiModel;

#[derive(Debug, Clone)]
pub struct OoiSpectrometerProtocol {
    geometry: SpectrumGeometry,
    layout: PixelLayout,
    max_intensity: f64,
    integration: IntegrationTimeExchange,
}

impl OoiSpectrometerProtocol {
    pub fn new(
        geometry: SpectrumGeometry,
        layout: PixelLayout,
        max_intensity: f64,
        integration: IntegrationTimeExchange,
    ) -> Self {
        Self {
            geometry,
            layout,
            max_intensity,
            integration,
        }
    }

    pub fn for_model(model: OoiModel) -> Self {
        Self::new(
            model.geometry(),
            model.layout(),
            model.max_intensity(),
            IntegrationTimeExchange::new(model.integration_limits(), model.integration_word()),
        )
    }

    pub fn reset(&self, bus: &mut dyn Bus) -> ProtocolResult<()> {
        execute(&mut exchanges::reset(), bus).map(drop)
    }

    pub fn status(&self, bus: &mut dyn Bus) -> ProtocolResult<OoiStatus> {
        let reply = query(&mut exchanges::query_status(), bus)?;
        let bytes = reply
            .as_bytes()
            .ok_or_else(|| ProtocolError::format("status reply is not a byte vector"))?;
        exchanges::parse_status(bytes)
    }
}

impl ProtocolHelper for OoiSpectrometerProtocol {
    fn protocol(&self) -> Protocol {
        OOI_PROTOCOL
    }
}

impl SpectrometerProtocol for OoiSpectrometerProtocol {
    fn geometry(&self) -> SpectrumGeometry {
        self.geometry
    }

    fn integration_time_limits(&self) -> IntegrationTimeLimits {
        self.integration.limits()
    }

    fn max_intensity(&self) -> f64 {
        self.max_intensity
    }

    fn request_spectrum(&self, bus: &mut dyn Bus) -> ProtocolResult<()> {
        execute(&mut exchanges::request_spectrum(), bus).map(drop)
    }

    fn read_unformatted_spectrum(
        &self,
        bus: &mut dyn Bus,
        geometry: &SpectrumGeometry,
    ) -> ProtocolResult<Vec<u8>> {
        let mut read = exchanges::read_spectrum(geometry.unformatted_len());
        query(&mut read, bus)?
            .into_bytes()
            .ok_or_else(|| ProtocolError::format("spectrum readout is not a byte vector"))
    }

    fn decode_spectrum(&self, raw: &[u8], geometry: &SpectrumGeometry) -> ProtocolResult<Vec<f64>> {
        decode_with_sync(raw, geometry, self.layout)
    }

    fn set_integration_time_micros(&self, bus: &mut dyn Bus, micros: u64) -> ProtocolResult<()> {
        debug!(micros, "setting integration time");
        execute(&mut self.integration.transfer(micros)?, bus).map(drop)
    }

    fn set_trigger_mode(&self, bus: &mut dyn Bus, mode: TriggerMode) -> ProtocolResult<()> {
        execute(&mut exchanges::trigger_mode(mode), bus).map(drop)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OoiEepromProtocol;

impl ProtocolHelper for OoiEepromProtocol {
    fn protocol(&self) -> Protocol {
        OOI_PROTOCOL
    }
}

impl EepromProtocol for OoiEepromProtocol {
    fn slot_count(&self) -> u16 {
        EEPROM_SLOT_COUNT
    }

    fn read_slot(&self, bus: &mut dyn Bus, index: u16) -> ProtocolResult<Vec<u8>> {
        let slot = u8::try_from(index)
            .map_err(|e| ProtocolError::encoding(format!("EEPROM slot {index}: {e}")))?;
        exchanges::query_eeprom_slot(bus, slot)
    }
}

/// Saturation level stored as an ASCII integer in EEPROM.
#[derive(Debug, Clone, Copy, Default)]
pub struct OoiSaturationProtocol;

impl ProtocolHelper for OoiSaturationProtocol {
    fn protocol(&self) -> Protocol {
        OOI_PROTOCOL
    }
}

impl SaturationProtocol for OoiSaturationProtocol {
    fn saturation_level(&self, bus: &mut dyn Bus) -> ProtocolResult<u32> {
        let data = exchanges::query_eeprom_slot(bus, eeprom_slots::SATURATION)?;
        let text = exchanges::eeprom_ascii(&data)?;
        text.parse::<u32>()
            .map_err(|e| ProtocolError::format(format!("saturation level {text:?}: {e}")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OoiSerialNumberProtocol;

impl ProtocolHelper for OoiSerialNumberProtocol {
    fn protocol(&self) -> Protocol {
        OOI_PROTOCOL
    }
}

impl SerialNumberProtocol for OoiSerialNumberProtocol {
    fn serial_number(&self, bus: &mut dyn Bus) -> ProtocolResult<String> {
        let data = exchanges::query_eeprom_slot(bus, eeprom_slots::SERIAL_NUMBER)?;
        exchanges::eeprom_ascii(&data)
    }
}

/// Wavelength and nonlinearity polynomials, one ASCII float per EEPROM slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct OoiCoefficientsProtocol;

impl ProtocolHelper for OoiCoefficientsProtocol {
    fn protocol(&self) -> Protocol {
        OOI_PROTOCOL
    }
}

impl CoefficientsProtocol for OoiCoefficientsProtocol {
    fn wavelength_coefficients(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>> {
        (eeprom_slots::WAVELENGTH_FIRST..=eeprom_slots::WAVELENGTH_LAST)
            .map(|slot| exchanges::eeprom_number(&exchanges::query_eeprom_slot(bus, slot)?))
            .collect()
    }

    fn nonlinearity_coefficients(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>> {
        let order_slot = exchanges::query_eeprom_slot(bus, eeprom_slots::NONLINEARITY_ORDER)?;
        let text = exchanges::eeprom_ascii(&order_slot)?;
        let order = text
            .parse::<u8>()
            .map_err(|e| ProtocolError::format(format!("nonlinearity order {text:?}: {e}")))?;
        let available = eeprom_slots::NONLINEARITY_LAST - eeprom_slots::NONLINEARITY_FIRST;
        if order > available {
            return Err(ProtocolError::format(format!(
                "nonlinearity order {order} outside 0..={available}"
            )));
        }
        let last = eeprom_slots::NONLINEARITY_FIRST + order;
        (eeprom_slots::NONLINEARITY_FIRST..=last)
            .map(|slot| exchanges::eeprom_number(&exchanges::query_eeprom_slot(bus, slot)?))
            .collect()
    }
}

/// The board temperature sensor; a single channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct OoiTemperatureProtocol;

impl ProtocolHelper for OoiTemperatureProtocol {
    fn protocol(&self) -> Protocol {
        OOI_PROTOCOL
    }
}

impl TemperatureProtocol for OoiTemperatureProtocol {
    fn temperature_count(&self, _bus: &mut dyn Bus) -> ProtocolResult<usize> {
        Ok(1)
    }

    fn read_temperature(&self, bus: &mut dyn Bus, index: usize) -> ProtocolResult<f64> {
        if index != 0 {
            return Err(ProtocolError::encoding(format!(
                "temperature sensor {index} does not exist"
            )));
        }
        let reply = query(&mut exchanges::read_pcb_temperature(), bus)?;
        let bytes = reply
            .as_bytes()
            .ok_or_else(|| ProtocolError::format("temperature reply is not a byte vector"))?;
        exchanges::parse_pcb_temperature(bytes)
    }
}

/// The strobe/lamp enable line. It has no intensity control and cannot be
/// read back, so the last commanded state is reported.
#[derive(Debug, Default)]
pub struct OoiStrobeLampProtocol {
    enabled: std::sync::atomic::AtomicBool,
}

impl ProtocolHelper for OoiStrobeLampProtocol {
    fn protocol(&self) -> Protocol {
        OOI_PROTOCOL
    }
}

impl LightSourceProtocol for OoiStrobeLampProtocol {
    fn source_count(&self, _bus: &mut dyn Bus) -> ProtocolResult<u8> {
        Ok(1)
    }

    fn is_enabled(&self, _bus: &mut dyn Bus, source: u8) -> ProtocolResult<bool> {
        check_lamp(source)?;
        Ok(self.enabled.load(std::sync::atomic::Ordering::Relaxed))
    }

    fn set_enabled(&self, bus: &mut dyn Bus, source: u8, enable: bool) -> ProtocolResult<()> {
        check_lamp(source)?;
        execute(&mut exchanges::strobe_enable(enable), bus)?;
        self.enabled
            .store(enable, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    fn intensity_control(&self) -> IntensityControl<'_> {
        IntensityControl::Unsupported
    }
}

fn check_lamp(source: u8) -> ProtocolResult<()> {
    if source == 0 {
        Ok(())
    } else {
        Err(ProtocolError::encoding(format!("light source {source} does not exist")))
    }
}
