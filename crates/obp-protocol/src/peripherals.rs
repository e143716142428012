//! Helpers for everything around acquisition.

use std::net::Ipv4Addr;

use specbus_core::interfaces::{
    AcquisitionDelayProtocol, CountsIntensity, GpioProtocol, IntensityControl, Ipv4Protocol,
    LightSourceProtocol, NormalizedIntensity, SaturationProtocol, SerialNumberProtocol,
    TemperatureProtocol,
};
use specbus_core::{
    Bus, ByteReader, ByteWriter, Protocol, ProtocolError, ProtocolHelper, ProtocolResult,
};

use crate::ids::{OBP_PROTOCOL, message_types};
use crate::message::ObpMessage;
use crate::transaction::{query_data, send_command};

macro_rules! obp_helper {
    ($($name:ident),+ $(,)?) => {
        $(
            impl ProtocolHelper for $name {
                fn protocol(&self) -> Protocol {
                    OBP_PROTOCOL
                }
            }
        )+
    };
}

obp_helper!(
    ObpAcquisitionDelayProtocol,
    ObpTemperatureProtocol,
    ObpGpioProtocol,
    ObpLightSourceProtocol,
    ObpSaturationProtocol,
    ObpIpv4Protocol,
    ObpSerialNumberProtocol,
);

fn get(bus: &mut dyn Bus, message_type: u32, immediate: &[u8]) -> ProtocolResult<Vec<u8>> {
    query_data(bus, ObpMessage::new(message_type).with_immediate(immediate)?)
}

fn set(bus: &mut dyn Bus, message_type: u32, immediate: &[u8]) -> ProtocolResult<()> {
    send_command(bus, ObpMessage::new(message_type).with_immediate(immediate)?)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObpAcquisitionDelayProtocol;

impl AcquisitionDelayProtocol for ObpAcquisitionDelayProtocol {
    fn delay_micros(&self, bus: &mut dyn Bus) -> ProtocolResult<u64> {
        let data = get(bus, message_types::GET_ACQUISITION_DELAY, &[])?;
        ByteReader::new(&data).read_u32_le().map(u64::from)
    }

    fn set_delay_micros(&self, bus: &mut dyn Bus, micros: u64) -> ProtocolResult<()> {
        let micros = u32::try_from(micros)
            .map_err(|e| ProtocolError::encoding(format!("acquisition delay {micros} us: {e}")))?;
        set(bus, message_types::SET_ACQUISITION_DELAY, &micros.to_le_bytes())
    }
}

/// Temperatures reported as little-endian `f32` degrees Celsius.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObpTemperatureProtocol;

impl TemperatureProtocol for ObpTemperatureProtocol {
    fn temperature_count(&self, bus: &mut dyn Bus) -> ProtocolResult<usize> {
        let data = get(bus, message_types::GET_TEMPERATURE_COUNT, &[])?;
        ByteReader::new(&data).read_u8().map(usize::from)
    }

    fn read_temperature(&self, bus: &mut dyn Bus, index: usize) -> ProtocolResult<f64> {
        let index = u8::try_from(index)
            .map_err(|e| ProtocolError::encoding(format!("temperature sensor {index}: {e}")))?;
        let data = get(bus, message_types::GET_TEMPERATURE, &[index])?;
        ByteReader::new(&data).read_f32_le().map(f64::from)
    }

    fn read_all_temperatures(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>> {
        let data = get(bus, message_types::GET_ALL_TEMPERATURES, &[])?;
        let mut reader = ByteReader::new(&data);
        let mut temperatures = Vec::with_capacity(data.len() / 4);
        while reader.remaining() >= 4 {
            temperatures.push(f64::from(reader.read_f32_le()?));
        }
        Ok(temperatures)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObpGpioProtocol;

fn bits_and_mask(bits: u32, mask: u32) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(8);
    writer.write_u32_le(bits).write_u32_le(mask);
    writer.into_inner()
}

impl GpioProtocol for ObpGpioProtocol {
    fn pin_count(&self, bus: &mut dyn Bus) -> ProtocolResult<u8> {
        ByteReader::new(&get(bus, message_types::GET_GPIO_PIN_COUNT, &[])?).read_u8()
    }

    fn output_enable_vector(&self, bus: &mut dyn Bus) -> ProtocolResult<u32> {
        ByteReader::new(&get(bus, message_types::GET_GPIO_OUTPUT_ENABLE, &[])?).read_u32_le()
    }

    fn set_output_enable_vector(
        &self,
        bus: &mut dyn Bus,
        bits: u32,
        mask: u32,
    ) -> ProtocolResult<()> {
        set(bus, message_types::SET_GPIO_OUTPUT_ENABLE, &bits_and_mask(bits, mask))
    }

    fn value_vector(&self, bus: &mut dyn Bus) -> ProtocolResult<u32> {
        ByteReader::new(&get(bus, message_types::GET_GPIO_VALUE, &[])?).read_u32_le()
    }

    fn set_value_vector(&self, bus: &mut dyn Bus, bits: u32, mask: u32) -> ProtocolResult<()> {
        set(bus, message_types::SET_GPIO_VALUE, &bits_and_mask(bits, mask))
    }
}

/// How a light source module exposes its intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityMode {
    Normalized,
    Counts,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct ObpLightSourceProtocol {
    mode: IntensityMode,
}

impl ObpLightSourceProtocol {
    pub const fn new(mode: IntensityMode) -> Self {
        Self { mode }
    }
}

impl LightSourceProtocol for ObpLightSourceProtocol {
    fn source_count(&self, bus: &mut dyn Bus) -> ProtocolResult<u8> {
        ByteReader::new(&get(bus, message_types::GET_LIGHT_SOURCE_COUNT, &[])?).read_u8()
    }

    fn is_enabled(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<bool> {
        let data = get(bus, message_types::GET_LIGHT_SOURCE_ENABLE, &[source])?;
        Ok(ByteReader::new(&data).read_u8()? != 0)
    }

    fn set_enabled(&self, bus: &mut dyn Bus, source: u8, enable: bool) -> ProtocolResult<()> {
        set(bus, message_types::SET_LIGHT_SOURCE_ENABLE, &[source, u8::from(enable)])
    }

    fn intensity_control(&self) -> IntensityControl<'_> {
        match self.mode {
            IntensityMode::Normalized => IntensityControl::Normalized(self),
            IntensityMode::Counts => IntensityControl::Counts(self),
            IntensityMode::None => IntensityControl::Unsupported,
        }
    }
}

impl NormalizedIntensity for ObpLightSourceProtocol {
    fn intensity(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<f64> {
        let data = get(bus, message_types::GET_LIGHT_SOURCE_INTENSITY, &[source])?;
        ByteReader::new(&data).read_f32_le().map(f64::from)
    }

    fn set_intensity(&self, bus: &mut dyn Bus, source: u8, intensity: f64) -> ProtocolResult<()> {
        let mut writer = ByteWriter::with_capacity(5);
        writer.write_u8(source).write_f32_le(intensity as f32);
        set(bus, message_types::SET_LIGHT_SOURCE_INTENSITY, writer.as_slice())
    }
}

impl CountsIntensity for ObpLightSourceProtocol {
    fn intensity_counts(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<u32> {
        let data = get(bus, message_types::GET_LIGHT_SOURCE_COUNTS, &[source])?;
        ByteReader::new(&data).read_u32_le()
    }

    fn set_intensity_counts(&self, bus: &mut dyn Bus, source: u8, counts: u32) -> ProtocolResult<()> {
        let mut writer = ByteWriter::with_capacity(5);
        writer.write_u8(source).write_u32_le(counts);
        set(bus, message_types::SET_LIGHT_SOURCE_COUNTS, writer.as_slice())
    }

    fn counts_range(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<(u32, u32)> {
        let min = get(bus, message_types::GET_LIGHT_SOURCE_COUNTS_MIN, &[source])?;
        let max = get(bus, message_types::GET_LIGHT_SOURCE_COUNTS_MAX, &[source])?;
        Ok((
            ByteReader::new(&min).read_u32_le()?,
            ByteReader::new(&max).read_u32_le()?,
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObpSaturationProtocol;

impl SaturationProtocol for ObpSaturationProtocol {
    fn saturation_level(&self, bus: &mut dyn Bus) -> ProtocolResult<u32> {
        ByteReader::new(&get(bus, message_types::GET_SATURATION_LEVEL, &[])?).read_u32_le()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObpIpv4Protocol;

impl Ipv4Protocol for ObpIpv4Protocol {
    fn dhcp_enabled(&self, bus: &mut dyn Bus, interface: u8) -> ProtocolResult<bool> {
        let data = get(bus, message_types::GET_DHCP_ENABLE, &[interface])?;
        Ok(ByteReader::new(&data).read_u8()? != 0)
    }

    fn set_dhcp_enabled(&self, bus: &mut dyn Bus, interface: u8, enable: bool) -> ProtocolResult<()> {
        set(bus, message_types::SET_DHCP_ENABLE, &[interface, u8::from(enable)])
    }

    fn address(&self, bus: &mut dyn Bus, interface: u8) -> ProtocolResult<(Ipv4Addr, u8)> {
        let data = get(bus, message_types::GET_IPV4_ADDRESS, &[interface])?;
        let mut reader = ByteReader::new(&data);
        let octets: [u8; 4] = reader
            .read_bytes(4)?
            .try_into()
            .map_err(|e| ProtocolError::format(format!("IPv4 address: {e}")))?;
        let prefix = reader.read_u8()?;
        if prefix > 32 {
            return Err(ProtocolError::format(format!("IPv4 prefix length {prefix}")));
        }
        Ok((Ipv4Addr::from(octets), prefix))
    }

    fn set_address(
        &self,
        bus: &mut dyn Bus,
        interface: u8,
        address: Ipv4Addr,
        prefix: u8,
    ) -> ProtocolResult<()> {
        let mut writer = ByteWriter::with_capacity(6);
        writer
            .write_u8(interface)
            .write_bytes(&address.octets())
            .write_u8(prefix);
        set(bus, message_types::SET_IPV4_ADDRESS, writer.as_slice())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObpSerialNumberProtocol;

impl SerialNumberProtocol for ObpSerialNumberProtocol {
    fn serial_number(&self, bus: &mut dyn Bus) -> ProtocolResult<String> {
        let data = get(bus, message_types::GET_SERIAL_NUMBER, &[])?;
        let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
        let text = data.get(..end).unwrap_or_default();
        String::from_utf8(text.to_vec())
            .map(|s| s.trim().to_string())
            .map_err(|e| ProtocolError::format(format!("serial number: {e}")))
    }
}
