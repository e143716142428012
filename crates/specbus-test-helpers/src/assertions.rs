//! Assertion macros for spectra and other floating-point data.

/// Assert that two floating-point values are approximately equal.
///
/// ```rust
/// use specbus_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(500.0_f64, 500.0004, 0.001);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
}

/// Assert element-wise approximate equality of two slices of `f64`.
///
/// ```rust
/// use specbus_test_helpers::assert_spectrum_eq;
///
/// assert_spectrum_eq!(&[1.0, 2.0], &[1.0, 2.00001], 1e-3);
/// ```
#[macro_export]
macro_rules! assert_spectrum_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left: &[f64] = $left;
        let right: &[f64] = $right;
        let tolerance: f64 = $tolerance;
        if left.len() != right.len() {
            panic!(
                "assertion failed: spectra differ in length\n  left: {}\n right: {}",
                left.len(),
                right.len()
            );
        }
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            if (l - r).abs() > tolerance {
                panic!(
                    "assertion failed: spectra differ at pixel {}\n  left: `{:?}`,\n right: `{:?}`,\n  tolerance: `{:?}`",
                    i, l, r, tolerance
                );
            }
        }
    };
}

/// Assert that a sequence never decreases.
#[macro_export]
macro_rules! assert_non_decreasing {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev > curr {
                    panic!(
                        "assertion failed: sequence decreases at index {}: {:?} > {:?}",
                        i + 1,
                        prev,
                        curr
                    );
                }
                prev = curr;
            }
        }
    };
}
