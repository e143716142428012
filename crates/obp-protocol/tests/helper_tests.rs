//! OBP helpers against a simulated device on the mock bus.

use std::net::Ipv4Addr;

use specbus_core::interfaces::{
    AcquisitionDelayProtocol, BufferedSpectrumProtocol, CoefficientsProtocol, CountsIntensity,
    GpioProtocol, IntensityControl, Ipv4Protocol, LightSourceProtocol, PixelBinningProtocol,
    SaturationProtocol, SerialNumberProtocol, SpectrometerProtocol, TemperatureProtocol,
    TriggerMode,
};
use specbus_core::{IntegrationTimeLimits, PixelWord, ProtocolError, SpectrumGeometry};
use specbus_obp_protocol::{
    ALL_HINTS, IntensityMode, ObpAcquisitionDelayProtocol, ObpBufferedSpectrumProtocol,
    ObpCoefficientsProtocol, ObpGpioProtocol, ObpIpv4Protocol, ObpLightSourceProtocol,
    ObpMessage, ObpPixelBinningProtocol, ObpSaturationProtocol, ObpSerialNumberProtocol,
    ObpSpectrometerProtocol, ObpTemperatureProtocol, flags, message_types,
};
use specbus_test_helpers::prelude::*;
use specbus_test_helpers::{assert_approx_eq, assert_spectrum_eq};

fn reply(request: &ObpMessage, immediate: &[u8], payload: Vec<u8>) -> Vec<Vec<u8>> {
    let mut message = ObpMessage::new(request.message_type).with_flags(flags::RESPONSE);
    if !immediate.is_empty() {
        message = must(message.with_immediate(immediate));
    }
    vec![must(message.with_payload(payload).to_bytes())]
}

fn ack(request: &ObpMessage) -> Vec<Vec<u8>> {
    vec![must(ObpMessage::new(request.message_type).with_flags(flags::ACK).to_bytes())]
}

/// A device answering every request through `answer`; commands are acked.
fn device<F>(answer: F) -> (MockBus, MockTransferHelper)
where
    F: Fn(&ObpMessage) -> Option<Vec<Vec<u8>>> + Send + 'static,
{
    let (bus, helper) = MockBus::with_hints(&ALL_HINTS);
    helper.respond_with(move |written| {
        let Ok(request) = ObpMessage::parse(written) else {
            return Vec::new();
        };
        match answer(&request) {
            Some(replies) => replies,
            None if request.has_flag(flags::ACK_REQUESTED) => ack(&request),
            None => Vec::new(),
        }
    });
    (bus, helper)
}

fn sent(helper: &MockTransferHelper) -> Vec<ObpMessage> {
    helper
        .writes()
        .iter()
        .filter_map(|bytes| ObpMessage::parse(bytes).ok())
        .collect()
}

#[test]
fn test_spectrum_with_metadata() -> TestResult {
    let geometry = SpectrumGeometry::new(4, PixelWord::U16).with_metadata(8);
    let (mut bus, helper) = device(|_| None);
    let protocol = ObpSpectrometerProtocol::new(
        geometry,
        IntegrationTimeLimits::new(10, 10_000_000, 1, 1),
        65535.0,
    );

    protocol.request_spectrum(&mut bus)?;
    let mut payload = vec![0xEE; 8];
    for value in [10u16, 20, 30, 65535] {
        payload.extend_from_slice(&value.to_le_bytes());
    }
    helper.queue_read(must(ObpMessage::new(message_types::GET_SPECTRUM).with_payload(payload).to_bytes()));

    let spectrum = protocol.read_formatted_spectrum(&mut bus, &geometry)?;
    assert_spectrum_eq!(&spectrum, &[10.0, 20.0, 30.0, 65535.0], 0.0);
    assert_eq!(sent(&helper).len(), 1);
    Ok(())
}

#[test]
fn test_spectrum_length_mismatch() {
    let geometry = SpectrumGeometry::new(4, PixelWord::U16);
    let (mut bus, helper) = device(|_| None);
    let protocol = ObpSpectrometerProtocol::new(geometry, IntegrationTimeLimits::default(), 65535.0);
    helper.queue_read(must(ObpMessage::new(1).with_payload(vec![0; 6]).to_bytes()));
    assert!(matches!(
        protocol.read_unformatted_spectrum(&mut bus, &geometry),
        Err(ProtocolError::Format(_))
    ));
}

#[test]
fn test_integration_time_and_trigger_are_acked_commands() -> TestResult {
    let (mut bus, helper) = device(|_| None);
    let protocol = ObpSpectrometerProtocol::new(
        SpectrumGeometry::new(1024, PixelWord::U16),
        IntegrationTimeLimits::new(10, 10_000_000, 1, 1),
        65535.0,
    );
    protocol.set_integration_time_micros(&mut bus, 123_456)?;
    protocol.set_trigger_mode(&mut bus, TriggerMode::ExternalEdge)?;

    let requests = sent(&helper);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].immediate(), &123_456u32.to_le_bytes());
    assert!(requests[0].has_flag(flags::ACK_REQUESTED));
    assert_eq!(requests[1].immediate(), &[4]);
    Ok(())
}

#[test]
fn test_nack_surfaces_device_error() {
    let (mut bus, _helper) = device(|request| {
        let mut nack = ObpMessage::new(request.message_type).with_flags(flags::NACK);
        nack.error = 2;
        Some(vec![must(nack.to_bytes())])
    });
    let result = ObpSaturationProtocol.saturation_level(&mut bus);
    assert!(matches!(result, Err(ProtocolError::Device { code: 2, .. })));
    let message = result.err().map(|e| e.to_string()).unwrap_or_default();
    insta::assert_snapshot!(message, @"Device reported error 0x0002: unknown message type");
}

#[test]
fn test_serial_saturation_and_delay() -> TestResult {
    let (mut bus, _helper) = device(|request| match request.message_type {
        message_types::GET_SERIAL_NUMBER => Some(reply(request, b"FLMS01234\0", Vec::new())),
        message_types::GET_SATURATION_LEVEL => Some(reply(request, &62_000u32.to_le_bytes(), Vec::new())),
        message_types::GET_ACQUISITION_DELAY => Some(reply(request, &35u32.to_le_bytes(), Vec::new())),
        _ => None,
    });
    assert_eq!(ObpSerialNumberProtocol.serial_number(&mut bus)?, "FLMS01234");
    assert_eq!(ObpSaturationProtocol.saturation_level(&mut bus)?, 62_000);
    assert_eq!(ObpAcquisitionDelayProtocol.delay_micros(&mut bus)?, 35);
    ObpAcquisitionDelayProtocol.set_delay_micros(&mut bus, 500)?;
    assert!(ObpAcquisitionDelayProtocol.set_delay_micros(&mut bus, u64::MAX).is_err());
    Ok(())
}

#[test]
fn test_temperatures() -> TestResult {
    let (mut bus, _helper) = device(|request| match request.message_type {
        message_types::GET_TEMPERATURE_COUNT => Some(reply(request, &[2], Vec::new())),
        message_types::GET_TEMPERATURE => {
            let value = if request.immediate() == [0] { 21.5f32 } else { -5.25 };
            Some(reply(request, &value.to_le_bytes(), Vec::new()))
        }
        message_types::GET_ALL_TEMPERATURES => {
            let payload = [21.5f32, -5.25].iter().flat_map(|t| t.to_le_bytes()).collect();
            Some(reply(request, &[], payload))
        }
        _ => None,
    });
    assert_eq!(ObpTemperatureProtocol.temperature_count(&mut bus)?, 2);
    assert_approx_eq!(ObpTemperatureProtocol.read_temperature(&mut bus, 1)?, -5.25, 1e-6);
    let all = ObpTemperatureProtocol.read_all_temperatures(&mut bus)?;
    assert_spectrum_eq!(&all, &[21.5, -5.25], 1e-6);
    Ok(())
}

#[test]
fn test_gpio_mask_encoding() -> TestResult {
    let (mut bus, helper) = device(|request| match request.message_type {
        message_types::GET_GPIO_PIN_COUNT => Some(reply(request, &[10], Vec::new())),
        message_types::GET_GPIO_VALUE => Some(reply(request, &0b101u32.to_le_bytes(), Vec::new())),
        _ => None,
    });
    assert_eq!(ObpGpioProtocol.pin_count(&mut bus)?, 10);
    assert_eq!(ObpGpioProtocol.value_vector(&mut bus)?, 0b101);
    ObpGpioProtocol.set_value_vector(&mut bus, 0b10, 0b11)?;

    let last = must_some(sent(&helper).pop(), "gpio command");
    assert_eq!(last.message_type, message_types::SET_GPIO_VALUE);
    assert_eq!(last.immediate(), &[2, 0, 0, 0, 3, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_light_source_declares_its_refinement() -> TestResult {
    let (mut bus, _helper) = device(|request| match request.message_type {
        message_types::GET_LIGHT_SOURCE_COUNTS_MIN => Some(reply(request, &100u32.to_le_bytes(), Vec::new())),
        message_types::GET_LIGHT_SOURCE_COUNTS_MAX => Some(reply(request, &4095u32.to_le_bytes(), Vec::new())),
        message_types::GET_LIGHT_SOURCE_ENABLE => Some(reply(request, &[1], Vec::new())),
        _ => None,
    });
    let counts = ObpLightSourceProtocol::new(IntensityMode::Counts);
    match counts.intensity_control() {
        IntensityControl::Counts(control) => {
            assert_eq!(control.counts_range(&mut bus, 0)?, (100, 4095));
        }
        other => panic!("unexpected refinement {other:?}"),
    }
    assert!(counts.is_enabled(&mut bus, 0)?);

    let normalized = ObpLightSourceProtocol::new(IntensityMode::Normalized);
    assert!(matches!(normalized.intensity_control(), IntensityControl::Normalized(_)));
    let plain = ObpLightSourceProtocol::new(IntensityMode::None);
    assert!(matches!(plain.intensity_control(), IntensityControl::Unsupported));
    Ok(())
}

#[test]
fn test_ipv4_address() -> TestResult {
    let (mut bus, helper) = device(|request| match request.message_type {
        message_types::GET_IPV4_ADDRESS => Some(reply(request, &[192, 168, 254, 254, 24], Vec::new())),
        message_types::GET_DHCP_ENABLE => Some(reply(request, &[0], Vec::new())),
        _ => None,
    });
    assert_eq!(
        ObpIpv4Protocol.address(&mut bus, 0)?,
        (Ipv4Addr::new(192, 168, 254, 254), 24)
    );
    assert!(!ObpIpv4Protocol.dhcp_enabled(&mut bus, 0)?);
    ObpIpv4Protocol.set_address(&mut bus, 0, Ipv4Addr::new(10, 0, 0, 2), 16)?;
    let last = must_some(sent(&helper).pop(), "address command");
    assert_eq!(last.immediate(), &[0, 10, 0, 0, 2, 16]);
    Ok(())
}

#[test]
fn test_binning_queries() -> TestResult {
    let (mut bus, _helper) = device(|request| match request.message_type {
        message_types::GET_BINNING_FACTOR => Some(reply(request, &[1], Vec::new())),
        message_types::GET_MAX_BINNING_FACTOR => Some(reply(request, &[3], Vec::new())),
        message_types::GET_DEFAULT_BINNING_FACTOR => Some(reply(request, &[0], Vec::new())),
        _ => None,
    });
    assert_eq!(ObpPixelBinningProtocol.binning_factor(&mut bus)?, 1);
    assert_eq!(ObpPixelBinningProtocol.max_binning_factor(&mut bus)?, 3);
    assert_eq!(ObpPixelBinningProtocol.default_binning_factor(&mut bus)?, 0);
    ObpPixelBinningProtocol.set_binning_factor(&mut bus, 2)?;
    Ok(())
}

#[test]
fn test_coefficients_series() -> TestResult {
    let (mut bus, _helper) = device(|request| match request.message_type {
        message_types::GET_WAVELENGTH_COEFFICIENT_COUNT => Some(reply(request, &[3], Vec::new())),
        message_types::GET_WAVELENGTH_COEFFICIENT => {
            let value = match request.immediate() {
                [0] => 350.0f32,
                [1] => 0.5,
                _ => 0.0,
            };
            Some(reply(request, &value.to_le_bytes(), Vec::new()))
        }
        _ => None,
    });
    let coefficients = ObpCoefficientsProtocol.wavelength_coefficients(&mut bus)?;
    assert_spectrum_eq!(&coefficients, &[350.0, 0.5, 0.0], 1e-6);
    Ok(())
}

#[test]
fn test_buffered_spectra_patch_sample_count() -> TestResult {
    let geometry = SpectrumGeometry::new(2, PixelWord::U16).with_metadata(2);
    let (mut bus, helper) = device(|request| match request.message_type {
        message_types::GET_BUFFERED_SPECTRA => {
            let count = request.immediate().first().copied().unwrap_or(0);
            Some(reply(request, &[], vec![0xAB; 6 * usize::from(count)]))
        }
        _ => None,
    });
    let protocol = ObpBufferedSpectrumProtocol::new()?;

    let raw = protocol.read_buffered_spectra(&mut bus, 3, &geometry)?;
    assert_eq!(raw.len(), 18);
    let raw = protocol.read_buffered_spectra(&mut bus, 1, &geometry)?;
    assert_eq!(raw.len(), 6);

    let counts: Vec<Vec<u8>> = sent(&helper).iter().map(|m| m.immediate().to_vec()).collect();
    assert_eq!(counts, vec![vec![3, 0, 0, 0], vec![1, 0, 0, 0]]);
    Ok(())
}
