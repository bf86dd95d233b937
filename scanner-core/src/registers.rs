//! `ATmega328P` ADC register encodings.
//!
//! Pure bit arithmetic for `ADMUX` and `ADCSRA`, kept free of any peripheral
//! access so both the firmware and the host model write identical values.

use crate::config::Reference;
use crate::prescaler::Prescaler;

pub const REFS1: u8 = 1 << 7;
pub const REFS0: u8 = 1 << 6;
pub const ADLAR: u8 = 1 << 5;
/// `MUX[3:0]`.
pub const MUX_MASK: u8 = 0b0000_1111;

pub const ADEN: u8 = 1 << 7;
pub const ADSC: u8 = 1 << 6;
pub const ADATE: u8 = 1 << 5;
pub const ADIF: u8 = 1 << 4;
pub const ADIE: u8 = 1 << 3;
/// `ADPS[2:0]`.
pub const ADPS_MASK: u8 = 0b0000_0111;

/// `ADTS[2:0]` value selecting free-running auto-trigger.
pub const ADTS_FREE_RUNNING: u8 = 0b000;

/// `ADMUX` with `reference` selected, right-adjusted result, multiplexer on `channel`.
#[must_use]
pub const fn admux_for(reference: Reference, channel: u8) -> u8 {
    (reference.refs_bits() << 6) | (channel & MUX_MASK)
}

/// Rewrites the multiplexer field of `admux`, keeping the reference and
/// left-adjust bits untouched.
#[must_use]
pub const fn retarget_admux(admux: u8, channel: u8) -> u8 {
    (admux & (REFS1 | REFS0 | ADLAR)) | (channel & MUX_MASK)
}

/// Channel currently selected by `admux`.
#[must_use]
pub const fn admux_channel(admux: u8) -> u8 {
    admux & MUX_MASK
}

/// `ADCSRA` that enables the converter, auto-triggering and the completion
/// interrupt, applies `prescaler`, and starts the first conversion.
#[must_use]
pub const fn adcsra_free_running(prescaler: Prescaler) -> u8 {
    ADEN | ADSC | ADATE | ADIE | prescaler.adps_bits()
}
