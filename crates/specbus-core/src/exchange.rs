//! The common interface of transfers, transactions and protocol round trips.

use specbus_errors::{ProtocolError, ProtocolResult};
use tracing::debug;

use crate::bus::{Bus, TransferHelper};
use crate::data::Data;
use crate::hint::ProtocolHint;

/// A unit of protocol-level interaction.
pub trait Exchange {
    /// Routing requirements; the bus resolves a helper from the first one.
    fn hints(&self) -> &[ProtocolHint];

    /// Run the exchange. Writes yield `None`, reads yield the received data.
    fn transfer(&mut self, helper: &mut dyn TransferHelper) -> ProtocolResult<Option<Data>>;
}

/// Resolve the helper for `exchange` on `bus` and run it.
pub fn execute(exchange: &mut dyn Exchange, bus: &mut dyn Bus) -> ProtocolResult<Option<Data>> {
    let Some(helper) = bus.helper(exchange.hints()) else {
        let hint = exchange
            .hints()
            .first()
            .map_or_else(|| "<none>".to_string(), ToString::to_string);
        debug!(hint = %hint, "no transfer helper for exchange");
        return Err(ProtocolError::bus_mismatch(hint));
    };
    exchange.transfer(helper)
}

/// Like [`execute`], but the exchange must produce data.
pub fn query(exchange: &mut dyn Exchange, bus: &mut dyn Bus) -> ProtocolResult<Data> {
    execute(exchange, bus)?.ok_or_else(|| ProtocolError::format("exchange produced no response"))
}
