//! Build-time scanner configuration for the target board.
//!
//! `F_CPU` comes from the build script. Everything else is fixed here. The
//! validated [`SCANNER`] configuration is a `const`, so a clock that no
//! prescaler can bring into [`BAND`] fails the build.

use scanner_core::{ConfigError, ConversionBand, Reference, ScannerConfig};

include!(concat!(env!("OUT_DIR"), "/clock.rs"));

/// Inputs scanned, `ADC0` through `ADC5` on a 28-pin package.
pub const CHANNELS: usize = 6;

pub const REFERENCE: Reference = Reference::Avcc;

pub const BAND: ConversionBand = ConversionBand::ATMEGA328P;

pub const SCANNER: ScannerConfig = match ScannerConfig::new(REFERENCE, F_CPU, BAND) {
    Ok(config) => config,
    Err(ConfigError::NoValidPrescaler { .. }) => {
        panic!("no ADC prescaler brings F_CPU into the 50-200 kHz conversion band")
    }
    Err(ConfigError::EmptyBand { .. }) => panic!("ADC conversion band is empty"),
};

// Evaluated on every build, host checks included.
const _: ScannerConfig = SCANNER;
