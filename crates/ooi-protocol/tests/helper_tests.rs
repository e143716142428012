//! OOI helpers driven through the scripted mock bus.

use specbus_core::interfaces::{
    CoefficientsProtocol, EepromProtocol, IntensityControl, LightSourceProtocol,
    SaturationProtocol, SerialNumberProtocol, SpectrometerProtocol, TemperatureProtocol,
    TriggerMode,
};
use specbus_core::{IntegrationTimeLimits, ProtocolError};
use specbus_ooi_protocol::{
    ALL_HINTS, IntegrationTimeExchange, IntegrationWord, OoiCoefficientsProtocol,
    OoiEepromProtocol, OoiModel, OoiSaturationProtocol, OoiSerialNumberProtocol,
    OoiSpectrometerProtocol, OoiStrobeLampProtocol, OoiTemperatureProtocol, SYNC_BYTE,
};
use specbus_test_helpers::prelude::*;
use specbus_test_helpers::{assert_approx_eq, assert_spectrum_eq};

fn eeprom_reply(slot: u8, text: &str) -> Vec<u8> {
    let mut reply = vec![0x05, slot];
    reply.extend_from_slice(text.as_bytes());
    reply.resize(17, 0);
    reply
}

/// Answer EEPROM queries from a fixed slot table.
fn eeprom_device(helper: &MockTransferHelper, slots: &'static [(u8, &'static str)]) {
    helper.respond_with(move |written| match written {
        [0x05, slot] => slots
            .iter()
            .find(|(s, _)| s == slot)
            .map(|(s, text)| vec![eeprom_reply(*s, text)])
            .unwrap_or_default(),
        _ => Vec::new(),
    });
}

#[test]
fn test_request_then_read_spectrum() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    let protocol = OoiSpectrometerProtocol::for_model(OoiModel::Usb4000);
    let geometry = protocol.geometry();

    let mut readout = Vec::with_capacity(geometry.unformatted_len());
    for pixel in 0..geometry.pixels() {
        readout.extend_from_slice(&u16::try_from(pixel)?.to_le_bytes());
    }
    readout.push(SYNC_BYTE);
    helper.queue_read(readout);

    protocol.request_spectrum(&mut bus)?;
    let spectrum = protocol.read_formatted_spectrum(&mut bus, &geometry)?;

    assert_eq!(helper.writes(), vec![vec![0x09]]);
    assert_eq!(spectrum.len(), 3840);
    assert_spectrum_eq!(&spectrum[..3], &[0.0, 1.0, 2.0], 0.0);
    Ok(())
}

#[test]
fn test_missing_sync_byte_is_format_error() {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    let protocol = OoiSpectrometerProtocol::for_model(OoiModel::Usb2000Plus);
    let geometry = protocol.geometry();
    helper.queue_read(vec![0u8; geometry.unformatted_len()]);

    let result = protocol.read_formatted_spectrum(&mut bus, &geometry);
    assert!(matches!(result, Err(ProtocolError::Format(_))));
}

#[test]
fn test_integration_time_round_trip_on_mock_device() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    let exchange = IntegrationTimeExchange::new(
        IntegrationTimeLimits::new(3_000, 65_535_000, 1_000, 1_000),
        IntegrationWord::U16,
    );
    let protocol = OoiSpectrometerProtocol::new(
        OoiModel::Usb2000.geometry(),
        OoiModel::Usb2000.layout(),
        OoiModel::Usb2000.max_intensity(),
        exchange,
    );

    protocol.set_integration_time_micros(&mut bus, 250_000)?;
    let written = must_some(helper.last_write(), "integration command");
    assert_eq!(exchange.decode(&written)?, 250_000);
    Ok(())
}

#[test]
fn test_trigger_mode_command() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    let protocol = OoiSpectrometerProtocol::for_model(OoiModel::Hr4000);
    protocol.set_trigger_mode(&mut bus, TriggerMode::ExternalSynchronous)?;
    assert_eq!(helper.last_write(), Some(vec![0x0A, 0x03, 0x00]));
    Ok(())
}

#[test]
fn test_saturation_from_eeprom() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    eeprom_device(&helper, &[(0x11, "62500")]);
    assert_eq!(OoiSaturationProtocol.saturation_level(&mut bus)?, 62500);
    Ok(())
}

#[test]
fn test_serial_number_and_raw_slot() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    eeprom_device(&helper, &[(0x00, "USB4F01234")]);
    assert_eq!(OoiSerialNumberProtocol.serial_number(&mut bus)?, "USB4F01234");
    assert_eq!(OoiEepromProtocol.read_slot(&mut bus, 0)?.len(), 15);
    assert!(OoiEepromProtocol.read_slot(&mut bus, 300).is_err());
    Ok(())
}

#[test]
fn test_wavelength_and_nonlinearity_coefficients() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    eeprom_device(
        &helper,
        &[
            (0x01, "339.5"),
            (0x02, "0.38"),
            (0x03, "-1.5e-5"),
            (0x04, "0"),
            (0x06, "0.9"),
            (0x07, "1.2e-6"),
            (0x08, "-3e-11"),
            (0x0E, "2"),
        ],
    );
    let wavelength = OoiCoefficientsProtocol.wavelength_coefficients(&mut bus)?;
    assert_spectrum_eq!(&wavelength, &[339.5, 0.38, -1.5e-5, 0.0], 1e-12);
    let nonlinearity = OoiCoefficientsProtocol.nonlinearity_coefficients(&mut bus)?;
    assert_spectrum_eq!(&nonlinearity, &[0.9, 1.2e-6, -3e-11], 1e-15);
    Ok(())
}

#[test]
fn test_corrupt_nonlinearity_slot_is_format_error() {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    eeprom_device(&helper, &[(0x0E, "1"), (0x06, "garbage"), (0x07, "1.0")]);
    assert!(matches!(
        OoiCoefficientsProtocol.nonlinearity_coefficients(&mut bus),
        Err(ProtocolError::Format(_))
    ));
}

#[test]
fn test_pcb_temperature() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    helper.queue_read(vec![0x08, 0x00, 0x19]);
    let temperatures = OoiTemperatureProtocol.read_all_temperatures(&mut bus)?;
    assert_eq!(temperatures.len(), 1);
    assert_approx_eq!(temperatures[0], 24.9984, 1e-9);
    assert!(OoiTemperatureProtocol.read_temperature(&mut bus, 1).is_err());
    Ok(())
}

#[test]
fn test_strobe_lamp_has_no_intensity() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    let lamp = OoiStrobeLampProtocol::default();
    lamp.set_enabled(&mut bus, 0, true)?;
    assert!(lamp.is_enabled(&mut bus, 0)?);
    assert_eq!(helper.last_write(), Some(vec![0x03, 0x01, 0x00]));
    assert!(matches!(lamp.intensity_control(), IntensityControl::Unsupported));
    Ok(())
}

#[test]
fn test_status_query() -> TestResult {
    let (mut bus, helper) = MockBus::with_hints(&ALL_HINTS);
    helper.queue_read(vec![
        0x00, 0x08, 0x10, 0x27, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0, 0, 0, 0,
    ]);
    let protocol = OoiSpectrometerProtocol::for_model(OoiModel::Usb2000);
    let status = protocol.status(&mut bus)?;
    assert_eq!(status.pixels, 2048);
    assert_eq!(status.integration_time, 10_000);
    assert_eq!(helper.writes(), vec![vec![0xFE]]);
    Ok(())
}
