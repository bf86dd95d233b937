//! Conversion clock divider selection.
//!
//! The successive-approximation converter only reaches its rated resolution
//! when its clock sits inside a datasheet band. The clock is derived from the
//! CPU clock through a fixed set of power-of-two dividers, so picking the
//! divider is a pure function of the CPU frequency and the band. Everything
//! here is `const` so firmware can resolve the divider while compiling and
//! refuse to build when no divider fits.

use core::fmt;

/// ADC clock cycles spent on one conversion in free-running mode.
pub const CYCLES_PER_CONVERSION: u32 = 13;

/// Inclusive frequency band the conversion clock must fall into.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConversionBand {
    pub min_hz: u32,
    pub max_hz: u32,
}

impl ConversionBand {
    /// 50 kHz to 200 kHz, required for full 10-bit resolution on the `ATmega328P`.
    pub const ATMEGA328P: Self = Self::new(50_000, 200_000);

    #[must_use]
    pub const fn new(min_hz: u32, max_hz: u32) -> Self {
        Self { min_hz, max_hz }
    }

    /// Returns `true` when `hz` lies inside the band, bounds included.
    #[must_use]
    pub const fn contains(self, hz: u32) -> bool {
        hz >= self.min_hz && hz <= self.max_hz
    }

    /// Returns `true` when no frequency can satisfy the band.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.min_hz > self.max_hz
    }
}

impl fmt::Display for ConversionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} Hz", self.min_hz, self.max_hz)
    }
}

/// Dividers the converter can apply to the CPU clock.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Prescaler {
    Div2 = 2,
    Div4 = 4,
    Div8 = 8,
    Div16 = 16,
    Div32 = 32,
    Div64 = 64,
    Div128 = 128,
}

impl Prescaler {
    /// Every divider, smallest first. Selection walks this order so the
    /// fastest in-band conversion clock wins.
    pub const ALL: [Prescaler; 7] = [
        Prescaler::Div2,
        Prescaler::Div4,
        Prescaler::Div8,
        Prescaler::Div16,
        Prescaler::Div32,
        Prescaler::Div64,
        Prescaler::Div128,
    ];

    /// Division factor applied to the CPU clock.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        self as u32
    }

    /// Value of the `ADPS[2:0]` field selecting this divider.
    #[must_use]
    pub const fn adps_bits(self) -> u8 {
        match self {
            Prescaler::Div2 => 0b000,
            Prescaler::Div4 => 0b010,
            Prescaler::Div8 => 0b011,
            Prescaler::Div16 => 0b100,
            Prescaler::Div32 => 0b101,
            Prescaler::Div64 => 0b110,
            Prescaler::Div128 => 0b111,
        }
    }

    /// Conversion clock produced from `cpu_hz` (integer division).
    #[must_use]
    pub const fn conversion_clock_hz(self, cpu_hz: u32) -> u32 {
        cpu_hz / self.divisor()
    }

    /// Completed conversions per second once free-running.
    #[must_use]
    pub const fn conversion_rate_hz(self, cpu_hz: u32) -> u32 {
        self.conversion_clock_hz(cpu_hz) / CYCLES_PER_CONVERSION
    }

    /// Picks the smallest divider that brings `cpu_hz` into `band`.
    #[must_use]
    pub const fn select(cpu_hz: u32, band: ConversionBand) -> Option<Self> {
        let mut index = 0;
        while index < Self::ALL.len() {
            let candidate = Self::ALL[index];
            if band.contains(candidate.conversion_clock_hz(cpu_hz)) {
                return Some(candidate);
            }
            index += 1;
        }
        None
    }
}

impl fmt::Display for Prescaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.divisor())
    }
}
