//! Output formatting for CLI responses

use std::fmt::Display;

use anyhow::Error;
use colored::*;
use serde::Serialize;
use serde_json::{Value, json};

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

pub fn print_value<T: Serialize + Display>(name: &str, value: T, json: bool) {
    if json {
        let mut object = serde_json::Map::new();
        object.insert("success".into(), Value::Bool(true));
        match serde_json::to_value(&value) {
            Ok(v) => {
                object.insert(name.into(), v);
            }
            Err(e) => eprintln!("Failed to format {name} as JSON: {e}"),
        }
        print_json(&Value::Object(object));
    } else {
        println!("{} {}", format!("{name}:").bold(), value);
    }
}

/// Peak pixel as (wavelength, intensity).
pub fn peak(wavelengths: &[f64], intensities: &[f64]) -> Option<(f64, f64)> {
    wavelengths
        .iter()
        .zip(intensities)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(w, i)| (*w, *i))
}

pub fn spectrum_json(wavelengths: &[f64], intensities: &[f64]) -> Value {
    json!({
        "success": true,
        "pixels": intensities.len(),
        "wavelengths": wavelengths,
        "intensities": intensities,
    })
}

pub fn print_spectrum(wavelengths: &[f64], intensities: &[f64], json: bool, full: bool) {
    if json {
        print_json(&spectrum_json(wavelengths, intensities));
        return;
    }
    if full {
        for (wavelength, intensity) in wavelengths.iter().zip(intensities) {
            println!("{wavelength:.3}\t{intensity:.1}");
        }
        return;
    }
    println!("{} {}", "Pixels:".bold(), intensities.len());
    if let (Some(first), Some(last)) = (wavelengths.first(), wavelengths.last()) {
        println!("{} {first:.2} - {last:.2}", "Range:".bold());
    }
    if let Some((wavelength, intensity)) = peak(wavelengths, intensities) {
        println!(
            "{} {} at {wavelength:.2}",
            "Peak:".bold(),
            format!("{intensity:.1}").green()
        );
    }
}

pub fn print_temperatures(temperatures: &[f64], json: bool) {
    if json {
        print_json(&json!({ "success": true, "temperatures": temperatures }));
        return;
    }
    if temperatures.is_empty() {
        println!("{}", "No temperature sensors".yellow());
    }
    for (index, value) in temperatures.iter().enumerate() {
        println!("  {} {value:.2} °C", format!("sensor {index}:").bold());
    }
}

pub fn print_gpio(pins: u8, outputs: u32, values: u32, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "pins": pins,
            "output_enable": outputs,
            "values": values,
        }));
        return;
    }
    for pin in 0..pins.min(32) {
        let mask = 1u32 << pin;
        let direction = if outputs & mask != 0 { "out" } else { "in" };
        let level = if values & mask != 0 { "high".green() } else { "low".dimmed() };
        println!("  pin {pin:>2} {direction:<3} {level}");
    }
}

pub fn print_bytes(slot: u16, data: &[u8], json: bool) {
    if json {
        print_json(&json!({ "success": true, "slot": slot, "data": data }));
        return;
    }
    let hex: Vec<String> = data.iter().map(|b| format!("{b:02x}")).collect();
    println!("{} {}", format!("slot {slot}:").bold(), hex.join(" "));
}

pub fn print_network(interface: u8, dhcp: bool, address: &str, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "interface": interface,
            "dhcp": dhcp,
            "address": address,
        }));
        return;
    }
    println!("{} {}", "Interface:".bold(), interface);
    println!("{} {}", "DHCP:".bold(), if dhcp { "on" } else { "off" });
    println!("{} {}", "Address:".bold(), address);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_json_shape() {
        let value = spectrum_json(&[500.0, 501.0], &[10.0, 20.5]);
        assert_eq!(value["pixels"], 2);
        assert_eq!(value["success"], true);
        assert_eq!(value["wavelengths"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["intensities"][1].as_f64(), Some(20.5));
    }

    #[test]
    fn test_peak_picks_largest_intensity() {
        assert_eq!(peak(&[500.0, 501.0, 502.0], &[1.0, 9.0, 3.0]), Some((501.0, 9.0)));
        assert_eq!(peak(&[], &[]), None);
    }
}
