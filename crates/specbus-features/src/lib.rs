//! Application-facing spectrometer features.
//!
//! Each feature wraps a [`FeatureImpl`](specbus_core::FeatureImpl) over one
//! capability trait and adds the logic that does not belong to any wire
//! format: argument validation, gain adjustment, nonlinearity correction,
//! binning bookkeeping and wavelength tables. [`DeviceFeatures`] assembles
//! the full set for the OOI and OBP device families.

#![deny(static_mut_refs)]

pub mod buffered;
pub mod calibration;
pub mod devices;
pub mod gain;
pub mod network;
pub mod peripherals;
pub mod spectrometer;

pub use buffered::BufferedSpectrumFeature;
pub use calibration::{
    CoefficientsFeature, NonlinearityCorrection, WavelengthCalibration, evaluate_polynomial,
};
pub use devices::{DeviceFeatures, require};
pub use gain::{adjust_gain, adjust_spectrum};
pub use network::{NetworkConfigurationFeature, SerialNumberFeature};
pub use peripherals::{
    AcquisitionDelayFeature, EepromFeature, GpioFeature, LightSourceFeature, PixelBinningFeature,
    SaturationFeature, TemperatureFeature, counts_to_normalized, normalized_to_counts,
};
pub use spectrometer::SpectrometerFeature;
