//! Properties of OBP message framing.

use proptest::prelude::*;
use specbus_obp_protocol::ObpMessage;

proptest! {
    #[test]
    fn prop_header_round_trip(
        message_type in any::<u32>(),
        regarding in any::<u32>(),
        flag_bits in 0u16..0x40,
        immediate in prop::collection::vec(any::<u8>(), 0..=16),
        payload in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut message = ObpMessage::new(message_type)
            .with_flags(flag_bits)
            .with_payload(payload.clone());
        message.regarding = regarding;
        let message = message.with_immediate(&immediate);
        prop_assert!(message.is_ok());
        if let Ok(message) = message {
            let bytes = message.to_bytes();
            prop_assert_eq!(bytes.as_ref().map(Vec::len).ok(), Some(64 + payload.len()));
            let parsed = bytes.and_then(|b| ObpMessage::parse(&b));
            prop_assert_eq!(parsed, Ok(message));
        }
    }

    #[test]
    fn prop_truncated_messages_are_rejected(payload in prop::collection::vec(any::<u8>(), 0..64), cut in 1usize..64) {
        let bytes = ObpMessage::new(1).with_payload(payload).to_bytes();
        prop_assert!(bytes.is_ok());
        if let Ok(bytes) = bytes {
            let truncated = &bytes[..bytes.len().saturating_sub(cut)];
            prop_assert!(ObpMessage::parse(truncated).is_err());
        }
    }
}
