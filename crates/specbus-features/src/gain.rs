//! Saturation-based gain adjustment.

/// Scale a raw intensity so that `saturation` maps onto `max`.
///
/// Results are clamped to `max`. A non-positive or non-finite saturation
/// leaves the value unchanged.
pub fn adjust_gain(raw: f64, max: f64, saturation: f64) -> f64 {
    if !saturation.is_finite() || saturation <= 0.0 {
        return raw;
    }
    (raw * max / saturation).min(max)
}

pub fn adjust_spectrum(spectrum: &mut [f64], max: f64, saturation: f64) {
    for value in spectrum.iter_mut() {
        *value = adjust_gain(*value, max, saturation);
    }
}
