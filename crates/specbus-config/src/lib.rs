//! Device configuration for specbus.
//!
//! This crate combines:
//! - The [`DeviceConfig`] file format (YAML or JSON) and its validation
//! - Built-in presets for the known device families

pub mod device;
pub mod presets;

pub use device::{BusConfig, DeviceConfig, LightSourceMode, ProtocolKind, SpectrometerConfig};
pub use presets::{DEVICE_PRESETS_YAML, load_presets, preset, preset_names};
