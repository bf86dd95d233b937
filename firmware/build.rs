//! Build script for the scanner firmware.
//!
//! Resolves the CPU clock from the `F_CPU` environment variable and exposes it
//! to the crate as a constant, so the ADC prescaler is chosen (and validated)
//! while compiling.

use std::env;
use std::fs;
use std::path::PathBuf;

/// Arduino Uno crystal, assumed when `F_CPU` is not set.
const DEFAULT_F_CPU: u32 = 16_000_000;

fn main() {
    println!("cargo:rerun-if-env-changed=F_CPU");
    println!("cargo:rerun-if-changed=build.rs");

    let cpu_hz = match env::var("F_CPU") {
        Ok(raw) => parse_hz(&raw)
            .unwrap_or_else(|| panic!("F_CPU=`{raw}` is not a frequency in Hz")),
        Err(_) => {
            println!("cargo:warning=F_CPU not set; assuming {DEFAULT_F_CPU} Hz");
            DEFAULT_F_CPU
        }
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(
        out_dir.join("clock.rs"),
        format!("/// CPU clock in Hz, from `F_CPU`.\npub const F_CPU: u32 = {cpu_hz};\n"),
    )
    .unwrap();
}

/// Accepts plain integers as well as the C spellings `16000000UL` and `16_000_000`.
fn parse_hz(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .trim_end_matches(['U', 'L', 'u', 'l'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    match digits.parse() {
        Ok(0) | Err(_) => None,
        Ok(hz) => Some(hz),
    }
}
