//! Peripheral and identity commands

use anyhow::Result;
use specbus_features::require;

use crate::commands::DeviceCommands;
use crate::error::CliError;
use crate::output;
use crate::session::Session;

pub fn execute(cmd: &DeviceCommands, session: &mut Session, json: bool) -> Result<()> {
    let protocol = session.protocol();
    let (features, bus) = session.parts();

    match cmd {
        DeviceCommands::Serial => {
            let serial = require(features.serial_number.as_ref(), "serial number")
                .and_then(|f| f.serial_number(&protocol, bus))
                .map_err(CliError::from)?;
            output::print_value("serial_number", serial, json);
        }
        DeviceCommands::Temperatures => {
            let temperatures = require(features.temperature.as_ref(), "temperature")
                .and_then(|f| f.read_all(&protocol, bus))
                .map_err(CliError::from)?;
            output::print_temperatures(&temperatures, json);
        }
        DeviceCommands::Gpio => {
            let gpio = require(features.gpio.as_ref(), "gpio").map_err(CliError::from)?;
            let pins = gpio.pin_count(&protocol, bus).map_err(CliError::from)?;
            let outputs = gpio.output_enable_vector(&protocol, bus).map_err(CliError::from)?;
            let values = gpio.value_vector(&protocol, bus).map_err(CliError::from)?;
            output::print_gpio(pins, outputs, values, json);
        }
        DeviceCommands::GpioSet { pin, level } => {
            require(features.gpio.as_ref(), "gpio")
                .and_then(|f| f.set_pin(&protocol, bus, *pin, level.is_high()))
                .map_err(CliError::from)?;
            output::print_value("pin", *pin, json);
        }
        DeviceCommands::Lamp { source, state } => {
            require(features.light_source.as_ref(), "light source")
                .and_then(|f| f.set_enabled(&protocol, bus, *source, state.is_high()))
                .map_err(CliError::from)?;
            output::print_value("enabled", state.is_high(), json);
        }
        DeviceCommands::Intensity { source, value } => {
            require(features.light_source.as_ref(), "light source")
                .and_then(|f| f.set_intensity(&protocol, bus, *source, *value))
                .map_err(CliError::from)?;
            output::print_value("intensity", *value, json);
        }
        DeviceCommands::Eeprom { slot } => {
            let data = require(features.eeprom.as_ref(), "eeprom")
                .and_then(|f| f.read_slot(&protocol, bus, *slot))
                .map_err(CliError::from)?;
            output::print_bytes(*slot, &data, json);
        }
        DeviceCommands::Delay { micros } => {
            let delay = require(features.acquisition_delay.as_ref(), "acquisition delay")
                .map_err(CliError::from)?;
            if let Some(micros) = micros {
                delay
                    .set_delay_micros(&protocol, bus, *micros)
                    .map_err(CliError::from)?;
            }
            let current = delay.delay_micros(&protocol, bus).map_err(CliError::from)?;
            output::print_value("acquisition_delay_us", current, json);
        }
        DeviceCommands::Network { interface } => {
            let network = require(features.network.as_ref(), "network configuration")
                .map_err(CliError::from)?;
            let dhcp = network
                .dhcp_enabled(&protocol, bus, *interface)
                .map_err(CliError::from)?;
            let (address, prefix) = network
                .address(&protocol, bus, *interface)
                .map_err(CliError::from)?;
            output::print_network(*interface, dhcp, &format!("{address}/{prefix}"), json);
        }
    }
    Ok(())
}
