//! Convenience re-exports for common test utilities.

pub use crate::must::{must, must_some, must_with};

#[cfg(feature = "mock")]
pub use crate::mock::{MockBus, MockTransferHelper};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;
