//! Ordered composite of transfers executed as one logical operation.

use specbus_errors::{ProtocolError, ProtocolResult};
use tracing::{debug, trace_span};

use crate::bus::TransferHelper;
use crate::data::Data;
use crate::exchange::Exchange;
use crate::hint::ProtocolHint;
use crate::transfer::Transfer;

/// Transfers run strictly in the order they were added.
///
/// The hint list is the union of the member hints and is rebuilt from the
/// members on every [`Transaction::add_transfer`].
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    transfers: Vec<Transfer>,
    hints: Vec<ProtocolHint>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transfers(transfers: impl IntoIterator<Item = Transfer>) -> Self {
        let mut transaction = Self::new();
        for transfer in transfers {
            transaction.add_transfer(transfer);
        }
        transaction
    }

    pub fn add_transfer(&mut self, transfer: Transfer) {
        self.transfers.push(transfer);
        self.update_hints();
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Patch the dynamic parameter of the member at `index`.
    ///
    /// Only the member's buffer changes, so the hint union stays valid.
    pub fn set_dynamic_parameter(&mut self, index: usize, value: u64) -> ProtocolResult<()> {
        let len = self.transfers.len();
        self.transfers
            .get_mut(index)
            .ok_or_else(|| {
                ProtocolError::encoding(format!("transaction has no member {index} of {len}"))
            })?
            .set_dynamic_parameter(value)
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    fn update_hints(&mut self) {
        self.hints.clear();
        for transfer in &self.transfers {
            for hint in transfer.hints() {
                if !self.hints.contains(hint) {
                    self.hints.push(*hint);
                }
            }
        }
    }
}

impl Exchange for Transaction {
    fn hints(&self) -> &[ProtocolHint] {
        &self.hints
    }

    /// Returns the data of the last member; earlier results are dropped.
    /// The first failing member aborts the remaining ones.
    fn transfer(&mut self, helper: &mut dyn TransferHelper) -> ProtocolResult<Option<Data>> {
        let span = trace_span!("transaction", members = self.transfers.len());
        let _enter = span.enter();

        let mut last = None;
        for (index, transfer) in self.transfers.iter_mut().enumerate() {
            last = transfer.transfer(helper).inspect_err(|e| {
                debug!(index, error = %e, "transaction aborted");
            })?;
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specbus_errors::{TransportError, TransportResult};

    const CONTROL: ProtocolHint = ProtocolHint::new(1, "control");
    const SPECTRUM: ProtocolHint = ProtocolHint::new(2, "spectrum");

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        fail_on_call: Option<usize>,
    }

    impl TransferHelper for Recorder {
        fn send(&mut self, buffer: &[u8]) -> TransportResult<usize> {
            if self.fail_on_call == Some(self.calls.len()) {
                return Err(TransportError::Disconnected);
            }
            self.calls.push("send");
            Ok(buffer.len())
        }

        fn receive(&mut self, buffer: &mut [u8]) -> TransportResult<usize> {
            if self.fail_on_call == Some(self.calls.len()) {
                return Err(TransportError::Disconnected);
            }
            self.calls.push("receive");
            let len = u8::try_from(buffer.len()).unwrap_or(u8::MAX);
            buffer.fill(len);
            Ok(buffer.len())
        }
    }

    #[test]
    fn test_hints_are_union() {
        let mut transaction = Transaction::new();
        transaction.add_transfer(Transfer::to_device(CONTROL, vec![0x6B, 0x04]));
        transaction.add_transfer(Transfer::from_device(CONTROL, 3));
        assert_eq!(transaction.hints(), &[CONTROL]);

        transaction.add_transfer(Transfer::from_device(SPECTRUM, 3));
        assert_eq!(transaction.hints(), &[CONTROL, SPECTRUM]);
    }

    #[test]
    fn test_patching_a_member_keeps_hint_union() -> ProtocolResult<()> {
        let template = Transfer::to_device(SPECTRUM, vec![0x09, 0x00]).with_parameter_setter(
            |buffer, value| {
                if let Some(byte) = buffer.get_mut(1) {
                    *byte = u8::try_from(value).unwrap_or(u8::MAX);
                }
                Ok(())
            },
        );
        let mut transaction =
            Transaction::with_transfers([Transfer::to_device(CONTROL, vec![0x01]), template]);

        transaction.set_dynamic_parameter(1, 7)?;
        assert_eq!(
            transaction.transfers().get(1).map(|t| t.payload().to_vec()),
            Some(vec![0x09, 0x07])
        );
        let members: Vec<ProtocolHint> = transaction
            .transfers()
            .iter()
            .flat_map(|t| t.hints().iter().copied())
            .collect();
        assert_eq!(transaction.hints(), members.as_slice());
        assert!(matches!(
            transaction.set_dynamic_parameter(0, 7),
            Err(ProtocolError::MissingParameterSetter)
        ));
        assert!(transaction.set_dynamic_parameter(2, 7).is_err());
        Ok(())
    }

    #[test]
    fn test_runs_in_order_and_returns_last() -> ProtocolResult<()> {
        let mut helper = Recorder::default();
        let mut transaction = Transaction::with_transfers([
            Transfer::to_device(CONTROL, vec![0x05, 0x01]),
            Transfer::from_device(CONTROL, 2),
            Transfer::from_device(CONTROL, 3),
        ]);
        let data = transaction.transfer(&mut helper)?;
        assert_eq!(helper.calls, vec!["send", "receive", "receive"]);
        assert_eq!(data.and_then(Data::into_bytes), Some(vec![3, 3, 3]));
        Ok(())
    }

    #[test]
    fn test_failure_aborts_remaining() {
        let mut helper = Recorder {
            fail_on_call: Some(1),
            ..Recorder::default()
        };
        let mut transaction = Transaction::with_transfers([
            Transfer::to_device(CONTROL, vec![0x05, 0x01]),
            Transfer::from_device(CONTROL, 17),
            Transfer::to_device(CONTROL, vec![0x01]),
        ]);
        let result = transaction.transfer(&mut helper);
        assert!(matches!(result, Err(ProtocolError::ReadFailed { .. })));
        assert_eq!(helper.calls, vec!["send"]);
    }

    #[test]
    fn test_empty_transaction_returns_none() -> ProtocolResult<()> {
        let mut helper = Recorder::default();
        let mut transaction = Transaction::new();
        assert!(transaction.transfer(&mut helper)?.is_none());
        assert!(transaction.hints().is_empty());
        Ok(())
    }
}
