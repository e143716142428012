//! Wire-protocol identities and the helper binding trait.

use core::fmt;
use core::hash::{Hash, Hasher};

/// A named wire format, used only as a lookup key.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Protocol {
    id: u16,
    name: &'static str,
}

impl Protocol {
    pub const fn new(id: u16, name: &'static str) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> u16 {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Protocol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Hash for Protocol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A concrete implementation of one capability for one protocol.
///
/// Capability traits in [`crate::interfaces`] extend this trait, so a feature
/// holding `Box<dyn SomeCapability>` can select helpers by protocol.
pub trait ProtocolHelper: Send + Sync {
    fn protocol(&self) -> Protocol;
}
