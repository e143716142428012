//! Bulk readout of spectra buffered on the device.

use specbus_core::interfaces::BufferedSpectrumProtocol;
use specbus_core::{Bus, FeatureImpl, Protocol, SpectrumGeometry};
use specbus_errors::{FeatureError, FeatureResult};

#[derive(Debug)]
pub struct BufferedSpectrumFeature {
    helpers: FeatureImpl<dyn BufferedSpectrumProtocol>,
}

impl BufferedSpectrumFeature {
    pub fn new(helpers: Vec<Box<dyn BufferedSpectrumProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("buffered_spectrum", helpers),
        }
    }

    /// Up to `count` raw samples, each `geometry.fast_buffer_len()` bytes.
    pub fn read_spectra(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
        count: u32,
        geometry: &SpectrumGeometry,
    ) -> FeatureResult<Vec<Vec<u8>>> {
        if count == 0 {
            return Err(FeatureError::illegal_argument("count", count, "must be at least 1"));
        }
        let raw = self.helpers.dispatch(protocol, "read_buffered_spectra", |h| {
            h.read_buffered_spectra(bus, count, geometry)
        })?;
        Ok(raw
            .chunks_exact(geometry.fast_buffer_len().max(1))
            .map(<[u8]>::to_vec)
            .collect())
    }
}
