use avr_device::interrupt;
use critical_section::{self, RawRestoreState};

use crate::adc;
use crate::config::CHANNELS;
use crate::hw::AvrAdc;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

/// Global interrupt enable flag in `SREG`.
const SREG_I: u8 = 1 << 7;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let sreg = interrupt::disable_save();
        sreg & SREG_I != 0
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[avr_device::interrupt(atmega328p)]
fn ADC() {
    adc::on_conversion_complete();
}

#[avr_device::entry]
fn main() -> ! {
    let Some(peripherals) = avr_device::atmega328p::Peripherals::take() else {
        panic!("peripherals already taken");
    };

    adc::init(AvrAdc::new(peripherals.ADC));
    unsafe {
        interrupt::enable();
    }

    let mut samples = [0_u16; CHANNELS];
    loop {
        adc::get_all(&mut samples);
        core::hint::black_box(&samples);
    }
}
