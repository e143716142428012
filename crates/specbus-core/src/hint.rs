//! Routing tags attached to transfers.

use core::fmt;
use core::hash::{Hash, Hasher};

/// Describes what kind of transport endpoint a transfer needs.
///
/// Two hints are equal when their ids are equal; the description is only
/// used for diagnostics.
#[derive(Debug, Clone, Copy, Eq)]
pub struct ProtocolHint {
    id: u32,
    description: &'static str,
}

impl ProtocolHint {
    pub const fn new(id: u32, description: &'static str) -> Self {
        Self { id, description }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn description(&self) -> &'static str {
        self.description
    }
}

impl PartialEq for ProtocolHint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Hash for ProtocolHint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ProtocolHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.description, self.id)
    }
}
