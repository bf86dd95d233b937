//! Hardware seam between the scanner and a concrete converter.
//!
//! Firmware implements [`Converter`] on top of the peripheral registers; host
//! tooling uses the pipelined model in [`crate::sim`]. The scanner only ever
//! talks to the converter through these three operations.

use crate::config::Reference;
use crate::prescaler::Prescaler;

/// Register-level settings applied when scanning starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConverterSettings {
    pub reference: Reference,
    pub prescaler: Prescaler,
    pub first_channel: u8,
}

/// Abstraction over a free-running, interrupt-driven converter.
pub trait Converter {
    /// Selects the reference with the multiplexer on `first_channel`, enables
    /// the converter in free-running mode with its completion interrupt, applies
    /// the divider, and starts the first conversion.
    fn start_free_running(&mut self, settings: &ConverterSettings);

    /// Result of the conversion that just completed.
    fn read_result(&mut self) -> u16;

    /// Aims the multiplexer at `channel`.
    ///
    /// The converter is already sampling for the conversion in flight, so this
    /// only takes effect on the conversion after it.
    fn select_channel(&mut self, channel: u8);
}

impl<C: Converter + ?Sized> Converter for &mut C {
    fn start_free_running(&mut self, settings: &ConverterSettings) {
        (**self).start_free_running(settings);
    }

    fn read_result(&mut self) -> u16 {
        (**self).read_result()
    }

    fn select_channel(&mut self, channel: u8) {
        (**self).select_channel(channel);
    }
}
