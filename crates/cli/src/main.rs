//! specctl - spectrometer control CLI
//!
//! Acquires spectra and drives the peripherals of OOI and OBP spectrometers
//! described by a device config file or a built-in preset.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use specbus_config::DeviceConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{AcquireCommands, ConfigCommands, DeviceCommands};
use crate::error::CliError;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "specctl")]
#[command(about = "Spectrometer control CLI - acquire spectra and drive device peripherals")]
#[command(version)]
struct Cli {
    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Device config file (YAML or JSON)
    #[arg(short, long, global = true, env = "SPECCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Built-in device preset, used when no config file is given
    #[arg(short, long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Acquisition commands
    #[command(flatten)]
    Acquire(AcquireCommands),

    /// Peripheral and identity commands
    #[command(subcommand)]
    Device(DeviceCommands),

    /// Config file and preset commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("specctl={log_level},specbus={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn effective_config(cli: &Cli) -> Result<Option<DeviceConfig>, CliError> {
    if let Some(path) = &cli.config {
        return Ok(Some(DeviceConfig::load(path)?));
    }
    match &cli.preset {
        Some(name) => Ok(Some(specbus_config::preset(name)?)),
        None => Ok(None),
    }
}

fn required_config(cli: &Cli) -> Result<DeviceConfig, CliError> {
    effective_config(cli)?
        .ok_or_else(|| CliError::InvalidConfiguration("pass --config or --preset".into()))
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Acquire(cmd) => {
            let mut session = Session::open(&required_config(cli)?)?;
            commands::acquire::execute(cmd, &mut session, cli.json)
        }
        Commands::Device(cmd) => {
            let mut session = Session::open(&required_config(cli)?)?;
            commands::device::execute(cmd, &mut session, cli.json)
        }
        Commands::Config(cmd) => {
            let effective = match cmd {
                ConfigCommands::Show => effective_config(cli)?,
                _ => None,
            };
            commands::config::execute(cmd, effective.as_ref(), cli.json)
        }
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Level, TriggerArg};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_spectrum_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["specctl", "--preset", "usb4000", "spectrum"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.preset.as_deref(), Some("usb4000"));
        assert!(matches!(
            cli.command,
            Commands::Acquire(AcquireCommands::Spectrum {
                integration_us: None,
                full: false
            })
        ));
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["specctl", "spectrum", "--json", "-vv", "-i", "5000"])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Acquire(AcquireCommands::Spectrum {
                integration_us: Some(5000),
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn parse_trigger_mode() -> TestResult {
        let cli = Cli::try_parse_from(["specctl", "trigger-mode", "edge"])?;
        match cli.command {
            Commands::Acquire(AcquireCommands::TriggerMode { mode }) => {
                assert_eq!(mode, TriggerArg::Edge);
            }
            other => return Err(format!("unexpected command {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn parse_lamp_aliases() -> TestResult {
        let cli = Cli::try_parse_from(["specctl", "device", "lamp", "on", "--source", "1"])?;
        match cli.command {
            Commands::Device(DeviceCommands::Lamp { source, state }) => {
                assert_eq!(source, 1);
                assert_eq!(state, Level::High);
            }
            other => return Err(format!("unexpected command {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn parse_rejects_non_numeric_integration_time() {
        assert!(Cli::try_parse_from(["specctl", "integration-time", "fast"]).is_err());
    }

    #[test]
    fn missing_config_is_configuration_error() {
        let cli = Cli {
            json: false,
            verbose: 0,
            config: None,
            preset: None,
            command: Commands::Config(ConfigCommands::Presets),
        };
        let error = required_config(&cli);
        assert!(matches!(error, Err(CliError::InvalidConfiguration(_))));
    }
}
