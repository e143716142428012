//! Config file and preset commands

use anyhow::Result;
use serde_json::json;
use specbus_config::{DeviceConfig, preset_names};

use crate::commands::ConfigCommands;
use crate::error::CliError;
use crate::output;

pub fn execute(cmd: &ConfigCommands, effective: Option<&DeviceConfig>, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Validate { path } => {
            let config = DeviceConfig::load(path).map_err(CliError::from)?;
            output::print_value("valid", config.name, json);
        }
        ConfigCommands::Presets => {
            let names = preset_names().map_err(CliError::from)?;
            if json {
                println!("{}", json!({ "success": true, "presets": names }));
            } else {
                for name in names {
                    println!("  {name}");
                }
            }
        }
        ConfigCommands::Show => {
            let config = effective.ok_or_else(|| {
                CliError::InvalidConfiguration("pass --config or --preset".into())
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(config).map_err(CliError::from)?);
            } else {
                print!("{}", config.to_yaml_string().map_err(CliError::from)?);
            }
        }
    }
    Ok(())
}
