#![no_std]

// Continuously sampling ADC driver shared by the AVR firmware and host tooling.
//
// Nothing here touches a peripheral directly: the converter is reached through
// the `Converter` trait and shared state goes through `critical-section`, so
// the same scanner runs on the MCU and under the emulator's interrupt thread.

pub mod cache;
pub mod config;
pub mod converter;
pub mod cursor;
pub mod prescaler;
pub mod registers;
pub mod scanner;
pub mod sim;
pub mod telemetry;

pub use config::{ConfigError, Reference, ScannerConfig, TOP};
pub use converter::{Converter, ConverterSettings};
pub use cursor::ScanCursor;
pub use prescaler::{ConversionBand, Prescaler};
pub use scanner::AdcScanner;
pub use telemetry::{Latch, LatchLog};
