//! Acquisition helpers: spectra, binning, buffered spectra and calibration.

use specbus_core::interfaces::{
    BufferedSpectrumProtocol, CoefficientsProtocol, PixelBinningProtocol, SpectrometerProtocol,
    TriggerMode,
};
use specbus_core::{
    Bus, ByteReader, Exchange, IntegrationTimeLimits, PixelWord, Protocol, ProtocolError,
    ProtocolHelper, ProtocolResult, SpectrumGeometry, Transfer, execute, query,
};
use tracing::debug;

use crate::ids::{OBP_PROTOCOL, hints, message_types};
use crate::message::{IMMEDIATE_OFFSET, ObpMessage};
use crate::transaction::{ObpRead, ObpTransaction, Reply, query_data, send_command};

/// Decode the pixel words that follow `geometry.metadata_len()` bytes of
/// metadata.
pub fn decode_metadata_spectrum(raw: &[u8], geometry: &SpectrumGeometry) -> ProtocolResult<Vec<f64>> {
    let mut reader = ByteReader::new(raw);
    reader.skip(geometry.metadata_len())?;
    (0..geometry.pixels())
        .map(|_| match geometry.word() {
            PixelWord::U16 => reader.read_u16_le().map(f64::from),
            PixelWord::U32 => reader.read_u32_le().map(f64::from),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ObpSpectrometerProtocol {
    geometry: SpectrumGeometry,
    limits: IntegrationTimeLimits,
    max_intensity: f64,
}

impl ObpSpectrometerProtocol {
    pub fn new(geometry: SpectrumGeometry, limits: IntegrationTimeLimits, max_intensity: f64) -> Self {
        Self {
            geometry,
            limits,
            max_intensity,
        }
    }
}

impl ProtocolHelper for ObpSpectrometerProtocol {
    fn protocol(&self) -> Protocol {
        OBP_PROTOCOL
    }
}

impl SpectrometerProtocol for ObpSpectrometerProtocol {
    fn geometry(&self) -> SpectrumGeometry {
        self.geometry
    }

    fn integration_time_limits(&self) -> IntegrationTimeLimits {
        self.limits
    }

    fn max_intensity(&self) -> f64 {
        self.max_intensity
    }

    fn request_spectrum(&self, bus: &mut dyn Bus) -> ProtocolResult<()> {
        let request = ObpMessage::new(message_types::GET_SPECTRUM).to_bytes()?;
        execute(&mut Transfer::to_device(hints::CONTROL, request), bus).map(drop)
    }

    fn read_unformatted_spectrum(
        &self,
        bus: &mut dyn Bus,
        geometry: &SpectrumGeometry,
    ) -> ProtocolResult<Vec<u8>> {
        let raw = query(&mut ObpRead::new(hints::SPECTRUM), bus)?
            .into_bytes()
            .ok_or_else(|| ProtocolError::format("spectrum reply is not a byte vector"))?;
        if raw.len() != geometry.unformatted_len() {
            return Err(ProtocolError::format(format!(
                "spectrum payload is {} bytes, expected {}",
                raw.len(),
                geometry.unformatted_len()
            )));
        }
        Ok(raw)
    }

    fn decode_spectrum(&self, raw: &[u8], geometry: &SpectrumGeometry) -> ProtocolResult<Vec<f64>> {
        decode_metadata_spectrum(raw, geometry)
    }

    fn set_integration_time_micros(&self, bus: &mut dyn Bus, micros: u64) -> ProtocolResult<()> {
        let units = u32::try_from(micros / self.limits.base_us.max(1))
            .map_err(|e| ProtocolError::encoding(format!("integration time {micros} us: {e}")))?;
        debug!(micros, "setting integration time");
        send_command(
            bus,
            ObpMessage::new(message_types::SET_INTEGRATION_TIME).with_immediate(&units.to_le_bytes())?,
        )
    }

    fn set_trigger_mode(&self, bus: &mut dyn Bus, mode: TriggerMode) -> ProtocolResult<()> {
        send_command(
            bus,
            ObpMessage::new(message_types::SET_TRIGGER_MODE).with_immediate(&[mode.code()])?,
        )
    }
}

fn first_byte(data: &[u8]) -> ProtocolResult<u8> {
    ByteReader::new(data).read_u8()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObpPixelBinningProtocol;

impl ProtocolHelper for ObpPixelBinningProtocol {
    fn protocol(&self) -> Protocol {
        OBP_PROTOCOL
    }
}

impl PixelBinningProtocol for ObpPixelBinningProtocol {
    fn binning_factor(&self, bus: &mut dyn Bus) -> ProtocolResult<u8> {
        first_byte(&query_data(bus, ObpMessage::new(message_types::GET_BINNING_FACTOR))?)
    }

    fn set_binning_factor(&self, bus: &mut dyn Bus, factor: u8) -> ProtocolResult<()> {
        send_command(
            bus,
            ObpMessage::new(message_types::SET_BINNING_FACTOR).with_immediate(&[factor])?,
        )
    }

    fn default_binning_factor(&self, bus: &mut dyn Bus) -> ProtocolResult<u8> {
        first_byte(&query_data(
            bus,
            ObpMessage::new(message_types::GET_DEFAULT_BINNING_FACTOR),
        )?)
    }

    fn max_binning_factor(&self, bus: &mut dyn Bus) -> ProtocolResult<u8> {
        first_byte(&query_data(bus, ObpMessage::new(message_types::GET_MAX_BINNING_FACTOR))?)
    }
}

/// Reads spectra from the device buffer. The request is encoded once; each
/// call patches its sample count through the transfer's parameter setter.
#[derive(Debug, Clone)]
pub struct ObpBufferedSpectrumProtocol {
    template: Transfer,
}

impl ObpBufferedSpectrumProtocol {
    pub fn new() -> ProtocolResult<Self> {
        let request = ObpMessage::new(message_types::GET_BUFFERED_SPECTRA)
            .with_immediate(&[0; 4])?
            .to_bytes()?;
        let template = Transfer::to_device(hints::CONTROL, request).with_parameter_setter(
            |buffer, count| {
                let count = u32::try_from(count)
                    .map_err(|e| ProtocolError::encoding(format!("sample count {count}: {e}")))?;
                buffer
                    .get_mut(IMMEDIATE_OFFSET..IMMEDIATE_OFFSET + 4)
                    .ok_or_else(|| ProtocolError::encoding("request too short for sample count"))?
                    .copy_from_slice(&count.to_le_bytes());
                Ok(())
            },
        );
        Ok(Self { template })
    }
}

impl ProtocolHelper for ObpBufferedSpectrumProtocol {
    fn protocol(&self) -> Protocol {
        OBP_PROTOCOL
    }
}

impl BufferedSpectrumProtocol for ObpBufferedSpectrumProtocol {
    fn read_buffered_spectra(
        &self,
        bus: &mut dyn Bus,
        count: u32,
        geometry: &SpectrumGeometry,
    ) -> ProtocolResult<Vec<u8>> {
        let mut exchange = ObpTransaction::from_request(self.template.clone(), Reply::Response);
        exchange.set_dynamic_parameter(u64::from(count))?;
        debug!(count, hints = exchange.hints().len(), "reading buffered spectra");

        let raw = query(&mut exchange, bus)?
            .into_bytes()
            .ok_or_else(|| ProtocolError::format("buffered spectra reply is not a byte vector"))?;
        let sample = geometry.fast_buffer_len();
        if sample == 0 || raw.len() % sample != 0 || raw.len() / sample > count as usize {
            return Err(ProtocolError::format(format!(
                "buffered reply of {} bytes is not a whole number of {sample}-byte samples",
                raw.len()
            )));
        }
        Ok(raw)
    }
}

/// Calibration coefficients, read one `f32` at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObpCoefficientsProtocol;

impl ObpCoefficientsProtocol {
    fn read_series(bus: &mut dyn Bus, count_type: u32, value_type: u32) -> ProtocolResult<Vec<f64>> {
        let count = first_byte(&query_data(bus, ObpMessage::new(count_type))?)?;
        (0..count)
            .map(|index| {
                let data = query_data(bus, ObpMessage::new(value_type).with_immediate(&[index])?)?;
                ByteReader::new(&data).read_f32_le().map(f64::from)
            })
            .collect()
    }
}

impl ProtocolHelper for ObpCoefficientsProtocol {
    fn protocol(&self) -> Protocol {
        OBP_PROTOCOL
    }
}

impl CoefficientsProtocol for ObpCoefficientsProtocol {
    fn wavelength_coefficients(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>> {
        Self::read_series(
            bus,
            message_types::GET_WAVELENGTH_COEFFICIENT_COUNT,
            message_types::GET_WAVELENGTH_COEFFICIENT,
        )
    }

    fn nonlinearity_coefficients(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>> {
        Self::read_series(
            bus,
            message_types::GET_NONLINEARITY_COEFFICIENT_COUNT,
            message_types::GET_NONLINEARITY_COEFFICIENT,
        )
    }
}
