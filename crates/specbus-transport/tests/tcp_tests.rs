//! TCP bus against a device simulated on a loopback listener.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use specbus_core::interfaces::SerialNumberProtocol;
use specbus_core::{Bus, DeviceLocator, TransportError};
use specbus_obp_protocol::{ALL_HINTS, ObpMessage, ObpSerialNumberProtocol, flags};
use specbus_test_helpers::prelude::*;
use specbus_transport::{DeviceFileBus, TcpBus, TcpTimeouts};

type ServerResult = Result<u32, Box<dyn std::error::Error + Send + Sync>>;

/// Answer one OBP request with `immediate` as the reply data.
fn serve_once(listener: TcpListener, immediate: &'static [u8]) -> thread::JoinHandle<ServerResult> {
    thread::spawn(move || {
        let (mut socket, _) = listener.accept()?;
        let mut request = [0u8; 64];
        socket.read_exact(&mut request)?;
        let request = ObpMessage::parse(&request)?;
        let reply = ObpMessage::new(request.message_type)
            .with_flags(flags::RESPONSE)
            .with_immediate(immediate)?
            .to_bytes()?;
        socket.write_all(&reply)?;
        Ok(request.message_type)
    })
}

#[test]
fn test_serial_number_over_tcp() -> TestResult {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let server = serve_once(listener, b"FLMS12345");

    let mut bus = TcpBus::new(ALL_HINTS).with_location("127.0.0.1", port);
    bus.open()?;
    assert!(bus.is_open());
    assert_eq!(bus.registry().len(), ALL_HINTS.len());

    let serial = ObpSerialNumberProtocol.serial_number(&mut bus)?;
    assert_eq!(serial, "FLMS12345");

    let served = server
        .join()
        .map_err(|_panic| "server thread panicked")?
        .map_err(|e| e.to_string())?;
    assert_eq!(served, specbus_obp_protocol::message_types::GET_SERIAL_NUMBER);

    bus.close();
    assert!(!bus.is_open());
    assert!(bus.registry().is_empty());
    Ok(())
}

#[test]
fn test_open_without_location_fails() {
    let mut bus = TcpBus::new(ALL_HINTS);
    assert!(matches!(bus.open(), Err(TransportError::Io { .. })));
    assert!(bus.location().is_none());
}

#[test]
fn test_open_with_wrong_locator_kind_fails() {
    let mut bus = TcpBus::new(ALL_HINTS);
    bus.set_location(DeviceLocator::Usb {
        vendor_id: 0x2457,
        product_id: 0x1022,
    });
    assert!(matches!(bus.open(), Err(TransportError::Io { .. })));
    assert!(bus.registry().is_empty());
}

#[test]
fn test_silent_device_times_out() -> TestResult {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let holder = thread::spawn(move || listener.accept().map(|(socket, _)| socket));

    let timeouts = TcpTimeouts {
        read_ms: 100,
        ..TcpTimeouts::default()
    };
    let mut bus = TcpBus::new(ALL_HINTS)
        .with_location("127.0.0.1", port)
        .with_timeouts(timeouts);
    bus.open()?;

    let result = ObpSerialNumberProtocol.serial_number(&mut bus);
    assert!(matches!(result, Err(specbus_core::ProtocolError::Timeout { .. })));

    bus.close();
    drop(holder.join());
    Ok(())
}

#[test]
fn test_missing_device_file_fails_to_open() {
    let mut bus = DeviceFileBus::new(ALL_HINTS).with_path("/nonexistent/specbus-device");
    assert!(matches!(bus.open(), Err(TransportError::Io { .. })));
    assert!(!bus.is_open());
}
