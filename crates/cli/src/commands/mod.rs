//! Command implementations for specctl

pub mod acquire;
pub mod config;
pub mod device;

use clap::{Subcommand, ValueEnum};
use specbus_core::interfaces::TriggerMode;

#[derive(Subcommand, Debug)]
pub enum AcquireCommands {
    /// Acquire one spectrum
    Spectrum {
        /// Set the integration time first (microseconds)
        #[arg(short, long)]
        integration_us: Option<u64>,
        /// Print every pixel instead of a summary
        #[arg(short, long)]
        full: bool,
    },

    /// Set the integration time in microseconds
    IntegrationTime {
        micros: u64,
    },

    /// Select the trigger mode
    TriggerMode {
        #[arg(value_enum)]
        mode: TriggerArg,
    },

    /// Set the on-device pixel binning factor
    Binning {
        factor: u8,
    },

    /// Read spectra buffered on the device
    Buffered {
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommands {
    /// Print the serial number
    Serial,

    /// Read every temperature sensor
    Temperatures,

    /// Show the GPIO direction and value vectors
    Gpio,

    /// Drive one GPIO pin
    GpioSet {
        pin: u8,
        #[arg(value_enum)]
        level: Level,
    },

    /// Switch a light source on or off
    Lamp {
        #[arg(value_enum)]
        state: Level,
        #[arg(short, long, default_value_t = 0)]
        source: u8,
    },

    /// Set a light source intensity in [0, 1]
    Intensity {
        source: u8,
        value: f64,
    },

    /// Dump one EEPROM slot
    Eeprom {
        slot: u16,
    },

    /// Show or set the acquisition delay
    Delay {
        micros: Option<u64>,
    },

    /// Show the IPv4 configuration of a network interface
    Network {
        #[arg(default_value_t = 0)]
        interface: u8,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a device config file
    Validate {
        path: std::path::PathBuf,
    },

    /// List built-in presets
    Presets,

    /// Print the effective config
    Show,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    #[value(alias = "on")]
    High,
    #[value(alias = "off")]
    Low,
}

impl Level {
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerArg {
    Normal,
    Software,
    Level,
    Synchronous,
    Edge,
}

impl From<TriggerArg> for TriggerMode {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::Normal => TriggerMode::Normal,
            TriggerArg::Software => TriggerMode::Software,
            TriggerArg::Level => TriggerMode::ExternalLevel,
            TriggerArg::Synchronous => TriggerMode::ExternalSynchronous,
            TriggerArg::Edge => TriggerMode::ExternalEdge,
        }
    }
}
