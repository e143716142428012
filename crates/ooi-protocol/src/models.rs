//! Readout and timing parameters of the OOI device families.

use specbus_core::{IntegrationTimeLimits, PixelWord, SpectrumGeometry};

use crate::decode::PixelLayout;
use crate::exchanges::IntegrationWord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OoiModel {
    Usb2000,
    Usb2000Plus,
    Usb4000,
    Hr4000,
}

impl OoiModel {
    pub const ALL: [OoiModel; 4] = [
        OoiModel::Usb2000,
        OoiModel::Usb2000Plus,
        OoiModel::Usb4000,
        OoiModel::Hr4000,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            OoiModel::Usb2000 => "USB2000",
            OoiModel::Usb2000Plus => "USB2000+",
            OoiModel::Usb4000 => "USB4000",
            OoiModel::Hr4000 => "HR4000",
        }
    }

    /// Case-insensitive lookup by marketing name; `+` may be spelled `plus`.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_uppercase().replace("PLUS", "+");
        Self::ALL.into_iter().find(|model| model.name() == wanted)
    }

    pub const fn pixels(self) -> usize {
        match self {
            OoiModel::Usb2000 | OoiModel::Usb2000Plus => 2048,
            OoiModel::Usb4000 => 3840,
            OoiModel::Hr4000 => 3648,
        }
    }

    /// Every readout ends in one sync byte.
    pub const fn geometry(self) -> SpectrumGeometry {
        SpectrumGeometry::new(self.pixels(), PixelWord::U16).with_trailer(1)
    }

    pub const fn layout(self) -> PixelLayout {
        match self {
            OoiModel::Usb2000 => PixelLayout::PacketInterleaved,
            _ => PixelLayout::LittleEndianPairs,
        }
    }

    pub const fn max_intensity(self) -> f64 {
        match self {
            OoiModel::Usb2000 => 4095.0,
            OoiModel::Hr4000 => 16383.0,
            OoiModel::Usb2000Plus | OoiModel::Usb4000 => 65535.0,
        }
    }

    pub const fn integration_limits(self) -> IntegrationTimeLimits {
        match self {
            OoiModel::Usb2000 => IntegrationTimeLimits::new(3_000, 65_535_000, 1_000, 1_000),
            OoiModel::Usb2000Plus => IntegrationTimeLimits::new(1_000, 655_350_000, 1, 1),
            OoiModel::Usb4000 => IntegrationTimeLimits::new(10, 65_535_000, 1, 1),
            OoiModel::Hr4000 => IntegrationTimeLimits::new(10, 655_350_000, 1, 1),
        }
    }

    pub const fn integration_word(self) -> IntegrationWord {
        match self {
            OoiModel::Usb2000 => IntegrationWord::U16,
            _ => IntegrationWord::U32,
        }
    }

    /// Whether the board carries the temperature sensor read by opcode 0x6C.
    pub const fn has_pcb_temperature(self) -> bool {
        matches!(self, OoiModel::Usb2000Plus | OoiModel::Usb4000)
    }
}
