//! Light sources and their intensity refinements.

use specbus_errors::ProtocolResult;

use crate::bus::Bus;
use crate::protocol::ProtocolHelper;

/// Intensity expressed as a fraction of full output.
pub trait NormalizedIntensity: Send + Sync {
    fn intensity(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<f64>;

    /// `intensity` is within `[0, 1]`.
    fn set_intensity(&self, bus: &mut dyn Bus, source: u8, intensity: f64) -> ProtocolResult<()>;
}

/// Intensity expressed in raw device counts.
pub trait CountsIntensity: Send + Sync {
    fn intensity_counts(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<u32>;

    fn set_intensity_counts(&self, bus: &mut dyn Bus, source: u8, counts: u32) -> ProtocolResult<()>;

    /// Inclusive `(minimum, maximum)` count range.
    fn counts_range(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<(u32, u32)>;
}

/// The intensity refinement a light-source helper declares.
#[derive(Clone, Copy)]
pub enum IntensityControl<'a> {
    Normalized(&'a dyn NormalizedIntensity),
    Counts(&'a dyn CountsIntensity),
    Unsupported,
}

impl IntensityControl<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            IntensityControl::Normalized(_) => "normalized",
            IntensityControl::Counts(_) => "counts",
            IntensityControl::Unsupported => "unsupported",
        }
    }
}

impl core::fmt::Debug for IntensityControl<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.kind())
    }
}

pub trait LightSourceProtocol: ProtocolHelper {
    fn source_count(&self, bus: &mut dyn Bus) -> ProtocolResult<u8>;

    fn is_enabled(&self, bus: &mut dyn Bus, source: u8) -> ProtocolResult<bool>;

    fn set_enabled(&self, bus: &mut dyn Bus, source: u8, enable: bool) -> ProtocolResult<()>;

    fn intensity_control(&self) -> IntensityControl<'_>;
}
