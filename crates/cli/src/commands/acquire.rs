//! Acquisition commands

use anyhow::Result;

use crate::commands::AcquireCommands;
use crate::error::CliError;
use crate::output;
use crate::session::Session;

pub fn execute(cmd: &AcquireCommands, session: &mut Session, json: bool) -> Result<()> {
    let protocol = session.protocol();
    let (features, bus) = session.parts();

    match cmd {
        AcquireCommands::Spectrum {
            integration_us,
            full,
        } => {
            if let Some(micros) = integration_us {
                features
                    .spectrometer
                    .set_integration_time_micros(&protocol, bus, *micros)
                    .map_err(CliError::from)?;
            }
            let intensities = features
                .spectrometer
                .acquire(&protocol, bus)
                .map_err(CliError::from)?;
            output::print_spectrum(features.spectrometer.wavelengths(), &intensities, json, *full);
        }
        AcquireCommands::IntegrationTime { micros } => {
            let applied = features
                .spectrometer
                .set_integration_time_micros(&protocol, bus, *micros)
                .map_err(CliError::from)?;
            output::print_value("integration_time_us", applied, json);
        }
        AcquireCommands::TriggerMode { mode } => {
            features
                .spectrometer
                .set_trigger_mode(&protocol, bus, (*mode).into())
                .map_err(CliError::from)?;
            output::print_value("trigger_mode", specbus_core::interfaces::TriggerMode::from(*mode), json);
        }
        AcquireCommands::Binning { factor } => {
            features
                .set_pixel_binning_factor(bus, *factor)
                .map_err(CliError::from)?;
            output::print_value("pixels", features.spectrometer.geometry().pixels(), json);
        }
        AcquireCommands::Buffered { count } => {
            let buffered = features
                .buffered
                .as_ref()
                .ok_or_else(|| CliError::Unsupported("buffered spectra".into()))?;
            let geometry = *features.spectrometer.geometry();
            let samples = buffered
                .read_spectra(&protocol, bus, *count, &geometry)
                .map_err(CliError::from)?;
            output::print_value("samples", samples.len(), json);
        }
    }
    Ok(())
}
