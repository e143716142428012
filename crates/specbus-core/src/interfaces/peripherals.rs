//! Timing, thermal, GPIO and storage capabilities.

use specbus_errors::ProtocolResult;

use crate::bus::Bus;
use crate::protocol::ProtocolHelper;

/// Delay between a trigger and the start of integration.
pub trait AcquisitionDelayProtocol: ProtocolHelper {
    fn delay_micros(&self, bus: &mut dyn Bus) -> ProtocolResult<u64>;

    fn set_delay_micros(&self, bus: &mut dyn Bus, micros: u64) -> ProtocolResult<()>;
}

pub trait TemperatureProtocol: ProtocolHelper {
    fn temperature_count(&self, bus: &mut dyn Bus) -> ProtocolResult<usize>;

    /// Degrees Celsius.
    fn read_temperature(&self, bus: &mut dyn Bus, index: usize) -> ProtocolResult<f64>;

    fn read_all_temperatures(&self, bus: &mut dyn Bus) -> ProtocolResult<Vec<f64>> {
        let count = self.temperature_count(bus)?;
        (0..count)
            .map(|index| self.read_temperature(bus, index))
            .collect()
    }
}

/// General purpose I/O. Bit `n` of every vector is pin `n`; setters only
/// touch the pins selected by `mask`.
pub trait GpioProtocol: ProtocolHelper {
    fn pin_count(&self, bus: &mut dyn Bus) -> ProtocolResult<u8>;

    fn output_enable_vector(&self, bus: &mut dyn Bus) -> ProtocolResult<u32>;

    fn set_output_enable_vector(&self, bus: &mut dyn Bus, bits: u32, mask: u32)
    -> ProtocolResult<()>;

    fn value_vector(&self, bus: &mut dyn Bus) -> ProtocolResult<u32>;

    fn set_value_vector(&self, bus: &mut dyn Bus, bits: u32, mask: u32) -> ProtocolResult<()>;
}

/// Fixed-size configuration slots in non-volatile memory.
pub trait EepromProtocol: ProtocolHelper {
    fn slot_count(&self) -> u16;

    fn read_slot(&self, bus: &mut dyn Bus, index: u16) -> ProtocolResult<Vec<u8>>;
}

pub trait SaturationProtocol: ProtocolHelper {
    /// Raw count at which the detector saturates.
    fn saturation_level(&self, bus: &mut dyn Bus) -> ProtocolResult<u32>;
}
