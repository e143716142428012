//! Spectrum readout geometry and integration-time limits.
//!
//! Read lengths and the logical pixel count are derived from one
//! [`SpectrumGeometry`], so changing the binning factor updates all of them at
//! once.

use serde::{Deserialize, Serialize};
use specbus_errors::{FeatureError, FeatureResult};

/// Width of one pixel word on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelWord {
    U16,
    U32,
}

impl PixelWord {
    pub const fn bytes(self) -> usize {
        match self {
            PixelWord::U16 => 2,
            PixelWord::U32 => 4,
        }
    }
}

/// Largest binning factor accepted by any device family.
pub const MAX_BINNING_FACTOR: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrumGeometry {
    unbinned_pixels: usize,
    word: PixelWord,
    metadata_len: usize,
    trailer_len: usize,
    binning_factor: u8,
}

impl SpectrumGeometry {
    pub const fn new(unbinned_pixels: usize, word: PixelWord) -> Self {
        Self {
            unbinned_pixels,
            word,
            metadata_len: 0,
            trailer_len: 0,
            binning_factor: 0,
        }
    }

    /// Bytes preceding the pixel words of every readout.
    pub const fn with_metadata(mut self, metadata_len: usize) -> Self {
        self.metadata_len = metadata_len;
        self
    }

    /// Bytes following the pixel words, e.g. a synchronization byte.
    pub const fn with_trailer(mut self, trailer_len: usize) -> Self {
        self.trailer_len = trailer_len;
        self
    }

    pub const fn unbinned_pixels(&self) -> usize {
        self.unbinned_pixels
    }

    pub const fn word(&self) -> PixelWord {
        self.word
    }

    pub const fn metadata_len(&self) -> usize {
        self.metadata_len
    }

    pub const fn trailer_len(&self) -> usize {
        self.trailer_len
    }

    pub const fn binning_factor(&self) -> u8 {
        self.binning_factor
    }

    /// Logical pixels after binning.
    pub const fn pixels(&self) -> usize {
        self.unbinned_pixels >> self.binning_factor
    }

    /// Bytes of pixel data, without metadata or trailer.
    pub fn pixel_bytes(&self) -> usize {
        self.pixels().saturating_mul(self.word.bytes())
    }

    /// Length of one raw spectrum readout.
    pub fn unformatted_len(&self) -> usize {
        self.metadata_len
            .saturating_add(self.pixel_bytes())
            .saturating_add(self.trailer_len)
    }

    /// Length of one spectrum sample inside a buffered (fast) readout.
    pub fn fast_buffer_len(&self) -> usize {
        self.metadata_len.saturating_add(self.pixel_bytes())
    }

    /// Number of values in a formatted spectrum.
    pub const fn formatted_len(&self) -> usize {
        self.pixels()
    }

    /// Largest factor that still leaves at least one logical pixel.
    pub fn max_binning_factor(&self) -> u8 {
        let mut factor = 0u8;
        while factor < MAX_BINNING_FACTOR && (self.unbinned_pixels >> (factor + 1)) > 0 {
            factor += 1;
        }
        factor
    }

    pub fn set_binning_factor(&mut self, factor: u8) -> FeatureResult<()> {
        let max = self.max_binning_factor();
        if factor > max {
            return Err(FeatureError::illegal_argument(
                "binning_factor",
                factor,
                format!("must be at most {max}"),
            ));
        }
        self.binning_factor = factor;
        Ok(())
    }

    pub fn binned(mut self, factor: u8) -> FeatureResult<Self> {
        self.set_binning_factor(factor)?;
        Ok(self)
    }

    /// Average each group of `2^factor` unbinned wavelengths.
    pub fn binned_wavelengths(&self, unbinned: &[f64]) -> Vec<f64> {
        let group = 1usize << self.binning_factor;
        unbinned
            .chunks_exact(group)
            .take(self.pixels())
            .map(|chunk| chunk.iter().sum::<f64>() / group as f64)
            .collect()
    }
}

/// Integration-time constraints of one device, all in microseconds.
///
/// `base_us` is the unit the device encodes the time in on the wire;
/// requested times are aligned down to `increment_us` steps above `min_us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationTimeLimits {
    pub min_us: u64,
    pub max_us: u64,
    pub increment_us: u64,
    pub base_us: u64,
}

impl IntegrationTimeLimits {
    pub const fn new(min_us: u64, max_us: u64, increment_us: u64, base_us: u64) -> Self {
        Self {
            min_us,
            max_us,
            increment_us,
            base_us,
        }
    }

    /// Validate `micros` and align it to the increment grid.
    pub fn check(&self, micros: u64) -> FeatureResult<u64> {
        if micros < self.min_us || micros > self.max_us {
            return Err(FeatureError::illegal_argument(
                "integration_time_us",
                micros,
                format!("must be within [{}, {}]", self.min_us, self.max_us),
            ));
        }
        let increment = self.increment_us.max(1);
        let steps = (micros - self.min_us) / increment;
        Ok(self.min_us.saturating_add(steps.saturating_mul(increment)))
    }
}

impl Default for IntegrationTimeLimits {
    fn default() -> Self {
        Self::new(1_000, 65_535_000, 1_000, 1)
    }
}
