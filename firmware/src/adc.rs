//! Board-level scanner instance and its public read API.

use core::cell::RefCell;

use critical_section::Mutex;
use scanner_core::AdcScanner;

use crate::config::{self, CHANNELS};
use crate::hw::AvrAdc;

pub static SCANNER: AdcScanner<CHANNELS> = AdcScanner::new();

/// Peripheral handle borrowed by the completion interrupt.
pub(crate) static CONVERTER: Mutex<RefCell<Option<AvrAdc>>> = Mutex::new(RefCell::new(None));

/// Starts the scan and hands the peripheral to the interrupt handler.
///
/// Interrupts stay masked until the caller enables them globally.
pub fn init(mut adc: AvrAdc) {
    critical_section::with(|cs| {
        SCANNER.init(&mut adc, &config::SCANNER);
        CONVERTER.borrow(cs).replace(Some(adc));
    });
}

#[must_use]
pub fn get(channel: usize) -> u16 {
    SCANNER.get(channel)
}

#[must_use]
pub fn get_scaled(channel: usize) -> f32 {
    SCANNER.get_scaled(channel)
}

pub fn get_all(out: &mut [u16; CHANNELS]) {
    SCANNER.get_all(out);
}

pub fn get_all_scaled(out: &mut [f32; CHANNELS]) {
    SCANNER.get_all_scaled(out);
}

/// Body of the `ADC` completion interrupt.
pub(crate) fn on_conversion_complete() {
    critical_section::with(|cs| {
        if let Some(adc) = CONVERTER.borrow(cs).borrow_mut().as_mut() {
            let _ = SCANNER.on_conversion_complete(adc);
        }
    });
}
