//! Validated converter configuration.

use core::fmt;

use crate::converter::ConverterSettings;
use crate::prescaler::{ConversionBand, Prescaler};

/// Single-ended inputs the multiplexer can address (`ADC0`..`ADC7`).
pub const MAX_CHANNELS: usize = 8;

/// Bits produced per conversion.
pub const RESOLUTION_BITS: u32 = 10;

/// Full-scale count. Raw samples are always below this value.
pub const TOP: u16 = 1 << RESOLUTION_BITS;

/// Voltage reference fed to the converter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reference {
    /// External reference on the `AREF` pin.
    Aref,
    /// Analog supply with an external capacitor on `AREF`.
    #[default]
    Avcc,
    /// Internal 1.1 V bandgap.
    Internal1V1,
}

impl Reference {
    /// Value of the `REFS[1:0]` field.
    #[must_use]
    pub const fn refs_bits(self) -> u8 {
        match self {
            Reference::Aref => 0b00,
            Reference::Avcc => 0b01,
            Reference::Internal1V1 => 0b11,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Reference::Aref => "aref",
            Reference::Avcc => "avcc",
            Reference::Internal1V1 => "internal-1v1",
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reasons a configuration cannot be built.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The band's lower bound exceeds its upper bound.
    EmptyBand { band: ConversionBand },
    /// No divider brings the CPU clock into the band.
    NoValidPrescaler { cpu_hz: u32, band: ConversionBand },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyBand { band } => write!(f, "conversion band {band} is empty"),
            ConfigError::NoValidPrescaler { cpu_hz, band } => write!(
                f,
                "no ADC prescaler brings {cpu_hz} Hz into the conversion band {band}"
            ),
        }
    }
}

/// Converter setup resolved from the CPU clock. Immutable once built.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScannerConfig {
    reference: Reference,
    cpu_hz: u32,
    band: ConversionBand,
    prescaler: Prescaler,
}

impl ScannerConfig {
    /// Resolves the prescaler for `cpu_hz`.
    ///
    /// Firmware evaluates this in a `const` item so a clock with no fitting
    /// divider stops the build instead of surfacing at run time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the band is empty or no divider fits.
    pub const fn new(
        reference: Reference,
        cpu_hz: u32,
        band: ConversionBand,
    ) -> Result<Self, ConfigError> {
        if band.is_empty() {
            return Err(ConfigError::EmptyBand { band });
        }

        match Prescaler::select(cpu_hz, band) {
            Some(prescaler) => Ok(Self {
                reference,
                cpu_hz,
                band,
                prescaler,
            }),
            None => Err(ConfigError::NoValidPrescaler { cpu_hz, band }),
        }
    }

    #[must_use]
    pub const fn reference(&self) -> Reference {
        self.reference
    }

    #[must_use]
    pub const fn cpu_hz(&self) -> u32 {
        self.cpu_hz
    }

    #[must_use]
    pub const fn band(&self) -> ConversionBand {
        self.band
    }

    #[must_use]
    pub const fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// Conversion clock after the divider.
    #[must_use]
    pub const fn conversion_clock_hz(&self) -> u32 {
        self.prescaler.conversion_clock_hz(self.cpu_hz)
    }

    /// Completed conversions per second across all channels.
    #[must_use]
    pub const fn conversion_rate_hz(&self) -> u32 {
        self.prescaler.conversion_rate_hz(self.cpu_hz)
    }

    /// Register-level settings handed to a [`Converter`](crate::converter::Converter).
    /// Scanning always starts at channel 0.
    #[must_use]
    pub const fn converter_settings(&self) -> ConverterSettings {
        ConverterSettings {
            reference: self.reference,
            prescaler: self.prescaler,
            first_channel: 0,
        }
    }
}
