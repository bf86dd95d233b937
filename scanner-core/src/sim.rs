//! Software model of the free-running converter.
//!
//! [`PipelinedConverter`] reproduces the one behavior the scanner depends on:
//! the multiplexer is sampled when a conversion *starts*, and in free-running
//! mode the next conversion starts the moment the previous one completes. The
//! interrupt therefore always re-aims the multiplexer one conversion ahead.
//! The emulator and the integration tests drive the scanner through it.

use crate::config::{Reference, TOP};
use crate::converter::{Converter, ConverterSettings};
use crate::registers;
use crate::scanner::AdcScanner;
use crate::telemetry::Latch;

/// Analog value presented on each input.
pub trait SignalSource {
    /// Raw count for `channel` at the moment its conversion completes.
    fn sample(&mut self, channel: u8) -> u16;
}

impl<F> SignalSource for F
where
    F: FnMut(u8) -> u16,
{
    fn sample(&mut self, channel: u8) -> u16 {
        self(channel)
    }
}

/// Converter whose conversions are produced on demand by [`complete`](Self::complete).
pub struct PipelinedConverter<S> {
    source: S,
    admux: u8,
    in_flight: Option<u8>,
    result: u16,
    settings: Option<ConverterSettings>,
}

impl<S: SignalSource> PipelinedConverter<S> {
    /// Idle converter fed by `source`.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            admux: registers::admux_for(Reference::Aref, 0),
            in_flight: None,
            result: 0,
            settings: None,
        }
    }

    /// Finishes the conversion in flight and starts the next one on the
    /// channel the multiplexer currently selects.
    ///
    /// Returns the channel that was converted, or `None` before
    /// [`Converter::start_free_running`] has been called. Results are clamped
    /// to the converter's range.
    pub fn complete(&mut self) -> Option<u8> {
        let channel = self.in_flight?;
        self.result = self.source.sample(channel).min(TOP - 1);
        self.in_flight = Some(registers::admux_channel(self.admux));
        Some(channel)
    }

    /// Completes one conversion and runs the scanner's interrupt body, as the
    /// hardware would raise the completion interrupt.
    pub fn step<const N: usize>(&mut self, scanner: &AdcScanner<N>) -> Option<Latch> {
        self.complete()?;
        Some(scanner.on_conversion_complete(self))
    }

    /// Channel being converted right now.
    #[must_use]
    pub fn in_flight(&self) -> Option<u8> {
        self.in_flight
    }

    /// Channel the next conversion will sample.
    #[must_use]
    pub fn selected_channel(&self) -> u8 {
        registers::admux_channel(self.admux)
    }

    #[must_use]
    pub fn admux(&self) -> u8 {
        self.admux
    }

    #[must_use]
    pub fn settings(&self) -> Option<&ConverterSettings> {
        self.settings.as_ref()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: SignalSource> Converter for PipelinedConverter<S> {
    fn start_free_running(&mut self, settings: &ConverterSettings) {
        self.admux = registers::admux_for(settings.reference, settings.first_channel);
        self.in_flight = Some(settings.first_channel);
        self.settings = Some(*settings);
    }

    fn read_result(&mut self) -> u16 {
        self.result
    }

    fn select_channel(&mut self, channel: u8) {
        self.admux = registers::retarget_admux(self.admux, channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prescaler::Prescaler;

    fn settings() -> ConverterSettings {
        ConverterSettings {
            reference: Reference::Avcc,
            prescaler: Prescaler::Div128,
            first_channel: 0,
        }
    }

    #[test]
    fn idle_converter_produces_nothing() {
        let mut converter = PipelinedConverter::new(|_: u8| 1_u16);
        assert_eq!(converter.complete(), None);
        assert!(!converter.is_running());
    }

    #[test]
    fn multiplexer_changes_apply_one_conversion_late() {
        let mut converter = PipelinedConverter::new(|channel: u8| u16::from(channel) * 10);
        converter.start_free_running(&settings());

        // First conversion was started on channel 0 and the next one latches
        // the unchanged multiplexer, so channel 0 is converted twice.
        assert_eq!(converter.complete(), Some(0));
        converter.select_channel(1);
        assert_eq!(converter.complete(), Some(0));
        converter.select_channel(2);
        assert_eq!(converter.complete(), Some(1));
        assert_eq!(converter.read_result(), 10);
        assert_eq!(converter.in_flight(), Some(2));
    }

    #[test]
    fn results_are_clamped_to_the_converter_range() {
        let mut converter = PipelinedConverter::new(|_: u8| u16::MAX);
        converter.start_free_running(&settings());
        let _ = converter.complete();
        assert_eq!(converter.read_result(), TOP - 1);
    }

    #[test]
    fn channel_selection_keeps_the_reference() {
        let mut converter = PipelinedConverter::new(|_: u8| 0_u16);
        converter.start_free_running(&settings());
        converter.select_channel(5);
        assert_eq!(converter.admux(), registers::admux_for(Reference::Avcc, 5));
        assert_eq!(converter.selected_channel(), 5);
    }
}
