//! Request/response round trips.

use specbus_core::{
    Bus, Data, Exchange, ProtocolError, ProtocolHint, ProtocolResult, Transfer, TransferHelper,
    execute, query,
};
use tracing::{trace, trace_span, warn};

use crate::ids::{MIN_MESSAGE_LEN, flags, hints};
use crate::message::ObpMessage;

/// What the device sends back for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// A bare acknowledgement; the exchange yields no data.
    Ack,
    /// A response whose immediate data or payload is returned.
    Response,
}

/// One OBP request and its reply.
///
/// The reply is read as the 64-byte minimum message first; when its
/// bytes-remaining field announces a payload, the rest follows in a second
/// read. NACKs and non-zero error numbers fail with
/// [`ProtocolError::Device`](specbus_core::ProtocolError::Device).
#[derive(Debug, Clone)]
pub struct ObpTransaction {
    hints: Vec<ProtocolHint>,
    request: Transfer,
    reply: Reply,
}

impl ObpTransaction {
    /// A request answered with data.
    pub fn query(message: ObpMessage) -> ProtocolResult<Self> {
        Self::with_hint(hints::CONTROL, message, Reply::Response)
    }

    /// A request answered with an acknowledgement only.
    pub fn command(message: ObpMessage) -> ProtocolResult<Self> {
        Self::with_hint(hints::CONTROL, message.with_flags(flags::ACK_REQUESTED), Reply::Ack)
    }

    pub fn with_hint(hint: ProtocolHint, message: ObpMessage, reply: Reply) -> ProtocolResult<Self> {
        Ok(Self::from_request(Transfer::to_device(hint, message.to_bytes()?), reply))
    }

    /// Wrap an already encoded request, e.g. a template carrying a dynamic
    /// parameter.
    pub fn from_request(request: Transfer, reply: Reply) -> Self {
        Self {
            hints: request.hints().to_vec(),
            request,
            reply,
        }
    }

    /// Patch the request's dynamic parameter before the next round trip.
    pub fn set_dynamic_parameter(&mut self, value: u64) -> ProtocolResult<()> {
        self.request.set_dynamic_parameter(value)
    }

    /// Read one complete message from `helper`.
    pub fn read_message(
        hint: ProtocolHint,
        helper: &mut dyn TransferHelper,
    ) -> ProtocolResult<ObpMessage> {
        let mut bytes = read_exact(hint, MIN_MESSAGE_LEN, helper)?;
        let pending = ObpMessage::pending_after_base(&bytes)?;
        if pending > 0 {
            trace!(pending, "reading OBP payload");
            bytes.extend(read_exact(hint, pending, helper)?);
        }
        ObpMessage::parse(&bytes)
    }
}

fn read_exact(
    hint: ProtocolHint,
    length: usize,
    helper: &mut dyn TransferHelper,
) -> ProtocolResult<Vec<u8>> {
    let mut read = Transfer::from_device(hint, length);
    Ok(read
        .transfer(helper)?
        .and_then(Data::into_bytes)
        .unwrap_or_default())
}

impl Exchange for ObpTransaction {
    fn hints(&self) -> &[ProtocolHint] {
        &self.hints
    }

    fn transfer(&mut self, helper: &mut dyn TransferHelper) -> ProtocolResult<Option<Data>> {
        let span = trace_span!("obp", reply = ?self.reply);
        let _enter = span.enter();

        self.request.transfer(helper)?;
        let hint = self.hints.first().copied().unwrap_or(hints::CONTROL);
        let response = Self::read_message(hint, helper)?;
        response.check_error()?;
        if response.has_flag(flags::DEPRECATED) {
            warn!(
                message_type = format_args!("0x{:08X}", response.message_type),
                "device marks this OBP message as deprecated"
            );
        }
        match self.reply {
            Reply::Ack => Ok(None),
            Reply::Response => Ok(Some(Data::bytes(response.data().to_vec()))),
        }
    }
}

/// Collects one unsolicited message, e.g. the spectrum answering an earlier
/// request.
#[derive(Debug, Clone)]
pub struct ObpRead {
    hints: Vec<ProtocolHint>,
}

impl ObpRead {
    pub fn new(hint: ProtocolHint) -> Self {
        Self { hints: vec![hint] }
    }
}

impl Exchange for ObpRead {
    fn hints(&self) -> &[ProtocolHint] {
        &self.hints
    }

    fn transfer(&mut self, helper: &mut dyn TransferHelper) -> ProtocolResult<Option<Data>> {
        let hint = self.hints.first().copied().unwrap_or(hints::SPECTRUM);
        let message = ObpTransaction::read_message(hint, helper)?;
        message.check_error()?;
        Ok(Some(Data::bytes(message.data().to_vec())))
    }
}

/// Run a query on `bus` and return the reply data.
pub fn query_data(bus: &mut dyn Bus, message: ObpMessage) -> ProtocolResult<Vec<u8>> {
    query(&mut ObpTransaction::query(message)?, bus)?
        .into_bytes()
        .ok_or_else(|| ProtocolError::format("OBP reply is not a byte vector"))
}

/// Run a command on `bus` and wait for its acknowledgement.
pub fn send_command(bus: &mut dyn Bus, message: ObpMessage) -> ProtocolResult<()> {
    execute(&mut ObpTransaction::command(message)?, bus).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use specbus_core::{ProtocolError, TransportResult};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        reads: VecDeque<u8>,
        writes: Vec<Vec<u8>>,
        requested: Vec<usize>,
    }

    impl TransferHelper for Scripted {
        fn send(&mut self, buffer: &[u8]) -> TransportResult<usize> {
            self.writes.push(buffer.to_vec());
            Ok(buffer.len())
        }

        fn receive(&mut self, buffer: &mut [u8]) -> TransportResult<usize> {
            self.requested.push(buffer.len());
            let mut count = 0;
            for slot in buffer.iter_mut() {
                match self.reads.pop_front() {
                    Some(byte) => *slot = byte,
                    None => break,
                }
                count += 1;
            }
            Ok(count)
        }
    }

    fn respond(message: &ObpMessage) -> ProtocolResult<Scripted> {
        Ok(Scripted {
            reads: message.to_bytes()?.into(),
            ..Scripted::default()
        })
    }

    #[test]
    fn test_query_reads_payload_in_two_steps() -> ProtocolResult<()> {
        let reply = ObpMessage::new(1)
            .with_flags(flags::RESPONSE)
            .with_payload((0..200).map(|b| b as u8).collect());
        let mut helper = respond(&reply)?;
        let mut exchange = ObpTransaction::query(ObpMessage::new(1))?;

        let data = exchange.transfer(&mut helper)?.and_then(Data::into_bytes);
        assert_eq!(data.map(|d| d.len()), Some(200));
        assert_eq!(helper.writes.len(), 1);
        Ok(())
    }

    #[test]
    fn test_command_sets_ack_requested() -> ProtocolResult<()> {
        let mut helper = respond(&ObpMessage::new(1).with_flags(flags::ACK))?;
        let mut exchange = ObpTransaction::command(ObpMessage::new(1))?;
        assert_eq!(exchange.transfer(&mut helper)?, None);
        let sent = helper.writes.first().cloned().unwrap_or_default();
        assert_eq!(sent.get(4), Some(&(flags::ACK_REQUESTED as u8)));
        Ok(())
    }

    #[test]
    fn test_nack_fails() -> ProtocolResult<()> {
        let mut nack = ObpMessage::new(1).with_flags(flags::NACK);
        nack.error = 7;
        let mut helper = respond(&nack)?;
        let mut exchange = ObpTransaction::command(ObpMessage::new(1))?;
        assert!(matches!(
            exchange.transfer(&mut helper),
            Err(ProtocolError::Device { code: 7, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_oversized_header_is_not_read_further() -> ProtocolResult<()> {
        let mut helper = respond(&ObpMessage::new(1).with_flags(flags::RESPONSE))?;
        let mut base: Vec<u8> = helper.reads.drain(..).collect();
        if let Some(field) = base.get_mut(40..44) {
            field.copy_from_slice(&(0x1000_0000u32 + 20).to_le_bytes());
        }
        helper.reads = base.into();

        let mut exchange = ObpTransaction::query(ObpMessage::new(1))?;
        assert!(matches!(
            exchange.transfer(&mut helper),
            Err(ProtocolError::Format(_))
        ));
        assert_eq!(helper.requested, vec![64]);
        Ok(())
    }
}
