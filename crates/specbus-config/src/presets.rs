//! Built-in device presets.

use serde::Deserialize;
use specbus_errors::{Result, SpecbusError};

use crate::device::DeviceConfig;

pub const DEVICE_PRESETS_YAML: &str = include_str!("device_presets.yaml");

#[derive(Debug, Deserialize)]
struct PresetFile {
    presets: Vec<DeviceConfig>,
}

/// Parse and validate every built-in preset.
pub fn load_presets() -> Result<Vec<DeviceConfig>> {
    let file: PresetFile = serde_yaml::from_str(DEVICE_PRESETS_YAML)
        .map_err(|e| SpecbusError::config(format!("built-in presets: {e}")))?;
    for preset in &file.presets {
        preset.validate()?;
    }
    Ok(file.presets)
}

pub fn preset_names() -> Result<Vec<String>> {
    let mut names: Vec<String> = load_presets()?.into_iter().map(|p| p.name).collect();
    names.sort_unstable();
    Ok(names)
}

/// Look up a preset by name, ignoring case.
pub fn preset(name: &str) -> Result<DeviceConfig> {
    load_presets()?
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| SpecbusError::config(format!("no preset named {name:?}")))
}
