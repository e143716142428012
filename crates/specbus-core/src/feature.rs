//! Protocol lookup and the uniform error-translation boundary of features.

use specbus_errors::{FeatureError, FeatureResult, ProtocolResult};
use tracing::{debug, debug_span};

use crate::protocol::{Protocol, ProtocolHelper};

/// The protocol helpers registered for one feature of one device.
///
/// `H` is usually a capability trait object such as
/// `dyn SpectrometerProtocol`. The helper list is fixed at construction, so
/// dispatch only needs `&self`.
pub struct FeatureImpl<H: ?Sized + ProtocolHelper> {
    name: &'static str,
    helpers: Vec<Box<H>>,
}

impl<H: ?Sized + ProtocolHelper> FeatureImpl<H> {
    pub fn new(name: &'static str, helpers: Vec<Box<H>>) -> Self {
        Self { name, helpers }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn protocols(&self) -> impl Iterator<Item = Protocol> + '_ {
        self.helpers.iter().map(|helper| helper.protocol())
    }

    pub fn supports(&self, protocol: &Protocol) -> bool {
        self.protocols().any(|p| p == *protocol)
    }

    /// First registered helper speaking `protocol`.
    pub fn lookup_protocol_impl(&self, protocol: &Protocol) -> FeatureResult<&H> {
        self.helpers
            .iter()
            .find(|helper| helper.protocol() == *protocol)
            .map(|helper| &**helper)
            .ok_or_else(|| FeatureError::ProtocolNotFound {
                feature: self.name,
                protocol: protocol.name().to_string(),
            })
    }

    /// Look up the helper for `protocol` and run `op` with it.
    ///
    /// Any protocol error from `op` is reported as [`FeatureError::Control`]
    /// carrying the feature and operation names.
    pub fn dispatch<T>(
        &self,
        protocol: &Protocol,
        operation: &'static str,
        op: impl FnOnce(&H) -> ProtocolResult<T>,
    ) -> FeatureResult<T> {
        let span = debug_span!("feature", feature = self.name, protocol = %protocol, operation);
        let _enter = span.enter();

        let helper = self.lookup_protocol_impl(protocol)?;
        op(helper).map_err(|e| {
            debug!(error = %e, "protocol operation failed");
            FeatureError::control(self.name, operation, e)
        })
    }
}

impl<H: ?Sized + ProtocolHelper> core::fmt::Debug for FeatureImpl<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeatureImpl")
            .field("name", &self.name)
            .field("protocols", &self.protocols().collect::<Vec<_>>())
            .finish()
    }
}
