//! Wavelength calibration and nonlinearity correction polynomials.

use serde::{Deserialize, Serialize};
use specbus_core::interfaces::CoefficientsProtocol;
use specbus_core::{Bus, FeatureImpl, Protocol, ProtocolError};
use specbus_errors::{FeatureError, FeatureResult};
use tracing::warn;

/// Evaluate `c0 + c1*x + c2*x^2 + ...` by Horner's rule.
pub fn evaluate_polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| acc * x + coefficient)
}

/// Pixel index to wavelength in nanometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthCalibration {
    coefficients: Vec<f64>,
}

impl WavelengthCalibration {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn wavelength(&self, pixel: usize) -> f64 {
        evaluate_polynomial(&self.coefficients, pixel as f64)
    }

    /// Wavelengths of the first `pixels` unbinned pixels.
    pub fn table(&self, pixels: usize) -> Vec<f64> {
        (0..pixels).map(|pixel| self.wavelength(pixel)).collect()
    }
}

/// Detector response linearization.
///
/// Corrected counts are `raw / p(raw)` where `p` is the stored polynomial;
/// the identity polynomial `[1.0]` leaves the spectrum untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonlinearityCorrection {
    coefficients: Vec<f64>,
}

impl NonlinearityCorrection {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn identity() -> Self {
        Self::new(vec![1.0])
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.coefficients.as_slice(), [c] if (c - 1.0).abs() < f64::EPSILON)
    }

    pub fn correct(&self, raw: f64) -> f64 {
        let factor = evaluate_polynomial(&self.coefficients, raw);
        if factor.is_finite() && factor.abs() > f64::EPSILON {
            raw / factor
        } else {
            raw
        }
    }

    pub fn apply(&self, spectrum: &mut [f64]) {
        if self.is_identity() {
            return;
        }
        for value in spectrum.iter_mut() {
            *value = self.correct(*value);
        }
    }
}

impl Default for NonlinearityCorrection {
    fn default() -> Self {
        Self::identity()
    }
}

/// Reads calibration polynomials stored on the device.
#[derive(Debug)]
pub struct CoefficientsFeature {
    helpers: FeatureImpl<dyn CoefficientsProtocol>,
}

impl CoefficientsFeature {
    pub fn new(helpers: Vec<Box<dyn CoefficientsProtocol>>) -> Self {
        Self {
            helpers: FeatureImpl::new("coefficients", helpers),
        }
    }

    pub fn wavelength_calibration(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
    ) -> FeatureResult<WavelengthCalibration> {
        self.helpers
            .dispatch(protocol, "wavelength_coefficients", |h| {
                h.wavelength_coefficients(bus)
            })
            .map(WavelengthCalibration::new)
    }

    /// Unparseable or empty coefficient sets fall back to the identity
    /// polynomial; transport failures are still reported.
    pub fn nonlinearity_correction(
        &self,
        protocol: &Protocol,
        bus: &mut dyn Bus,
    ) -> FeatureResult<NonlinearityCorrection> {
        let helper = self.helpers.lookup_protocol_impl(protocol)?;
        match helper.nonlinearity_coefficients(bus) {
            Ok(coefficients) if !coefficients.is_empty() => {
                Ok(NonlinearityCorrection::new(coefficients))
            }
            Ok(_) => {
                warn!("device stores no nonlinearity coefficients, using identity");
                Ok(NonlinearityCorrection::identity())
            }
            Err(ProtocolError::Format(reason)) => {
                warn!(%reason, "nonlinearity coefficients unreadable, using identity");
                Ok(NonlinearityCorrection::identity())
            }
            Err(e) => Err(FeatureError::control(
                self.helpers.name(),
                "nonlinearity_coefficients",
                e,
            )),
        }
    }
}
