//! Capability interfaces implemented by protocol helpers.
//!
//! Every trait extends [`ProtocolHelper`](crate::ProtocolHelper) and takes the
//! [`Bus`](crate::Bus) the device is attached to as an argument, so one helper
//! instance can serve any number of devices speaking its protocol.

pub mod light_source;
pub mod network;
pub mod peripherals;
pub mod spectrometer;

pub use light_source::{CountsIntensity, IntensityControl, LightSourceProtocol, NormalizedIntensity};
pub use network::{Ipv4Protocol, SerialNumberProtocol};
pub use peripherals::{
    AcquisitionDelayProtocol, EepromProtocol, GpioProtocol, SaturationProtocol, TemperatureProtocol,
};
pub use spectrometer::{
    BufferedSpectrumProtocol, CoefficientsProtocol, PixelBinningProtocol, SpectrometerProtocol,
    TriggerMode,
};
