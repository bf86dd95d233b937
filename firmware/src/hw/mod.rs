//! ATmega328P converter binding.
//!
//! Register values come from `scanner_core::registers`. This module only
//! moves them in and out of the peripheral.

use avr_device::atmega328p::ADC;
use scanner_core::{Converter, ConverterSettings, registers};

/// Owns the ADC peripheral while the scan runs.
pub struct AvrAdc {
    adc: ADC,
}

impl AvrAdc {
    pub fn new(adc: ADC) -> Self {
        Self { adc }
    }
}

impl Converter for AvrAdc {
    fn start_free_running(&mut self, settings: &ConverterSettings) {
        // ADTS = 0 must be in place before ADATE arms the trigger.
        self.adc
            .adcsrb
            .write(|w| unsafe { w.bits(registers::ADTS_FREE_RUNNING) });
        let admux = registers::admux_for(settings.reference, settings.first_channel);
        self.adc.admux.write(|w| unsafe { w.bits(admux) });
        let adcsra = registers::adcsra_free_running(settings.prescaler);
        self.adc.adcsra.write(|w| unsafe { w.bits(adcsra) });
    }

    fn read_result(&mut self) -> u16 {
        self.adc.adc.read().bits()
    }

    fn select_channel(&mut self, channel: u8) {
        self.adc
            .admux
            .modify(|r, w| unsafe { w.bits(registers::retarget_admux(r.bits(), channel)) });
    }
}
