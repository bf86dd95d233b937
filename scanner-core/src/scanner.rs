//! Continuously sampling ADC driver.
//!
//! [`AdcScanner`] keeps the most recent sample of `N` contiguous channels. The
//! converter runs free, raising its completion interrupt after every
//! conversion; the interrupt handler calls [`AdcScanner::on_conversion_complete`],
//! which latches the finished sample, advances the [`ScanCursor`] and re-aims
//! the multiplexer. Application code reads the cache at any time without
//! waiting for a conversion.
//!
//! The interrupt handler is the only writer of the cache and the cursor.
//! Readers take a critical section per slot so a 16-bit sample is never seen
//! half updated. Bulk reads repeat that per channel and therefore do not form
//! a snapshot: two channels may come from different scan cycles.
//!
//! ```ignore
//! static SCANNER: AdcScanner<6> = AdcScanner::new();
//!
//! SCANNER.init(&mut converter, &CONFIG);
//! // ...and from the completion interrupt:
//! SCANNER.on_conversion_complete(&mut converter);
//! ```

use core::cell::Cell;

use critical_section::Mutex;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::cache::ChannelCache;
use crate::config::{MAX_CHANNELS, ScannerConfig, TOP};
use crate::converter::Converter;
use crate::cursor::ScanCursor;
use crate::telemetry::{self, Latch};

/// Round-robin scanner over channels `0..N`.
pub struct AdcScanner<const N: usize> {
    cache: ChannelCache<N>,
    cursor: Mutex<Cell<ScanCursor>>,
    conversions: AtomicU32,
    filled: AtomicBool,
}

impl<const N: usize> AdcScanner<N> {
    /// Creates an idle scanner with a zeroed cache, suitable for a `static`.
    ///
    /// A channel count of zero or beyond the multiplexer's reach fails to compile.
    #[must_use]
    pub const fn new() -> Self {
        const {
            assert!(N >= 1 && N <= MAX_CHANNELS, "scanner needs 1 to 8 channels");
        }

        Self {
            cache: ChannelCache::new(),
            cursor: Mutex::new(Cell::new(ScanCursor::PRIMED)),
            conversions: AtomicU32::new(0),
            filled: AtomicBool::new(false),
        }
    }

    /// Number of scanned channels.
    #[must_use]
    pub const fn channels(&self) -> usize {
        N
    }

    /// Starts free-running conversion and arms the completion interrupt.
    ///
    /// Resets the cache and the cursor first, so this may also restart a
    /// scanner. Reads are valid from here on; slots hold zero until their
    /// channel has been converted once.
    pub fn init<C: Converter>(&self, converter: &mut C, config: &ScannerConfig) {
        critical_section::with(|cs| {
            self.cache.clear(cs);
            self.cursor.borrow(cs).set(ScanCursor::PRIMED);
            self.conversions.store(0, Ordering::Relaxed);
            self.filled.store(false, Ordering::Relaxed);
            converter.start_free_running(&config.converter_settings());
        });

        telemetry::log_scan_started(config, N);
    }

    /// Most recent sample of `channel`, in `0..TOP`.
    ///
    /// The value can be up to `N` conversion periods old.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= N`.
    #[must_use]
    pub fn get(&self, channel: usize) -> u16 {
        self.cache.load(channel)
    }

    /// Like [`get`](Self::get), returning `None` for channels outside the scan set.
    #[must_use]
    pub fn try_get(&self, channel: usize) -> Option<u16> {
        self.cache.try_load(channel)
    }

    /// Most recent sample of `channel` normalized to `[0, 1)`.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= N`.
    #[must_use]
    pub fn get_scaled(&self, channel: usize) -> f32 {
        scale(self.get(channel))
    }

    /// Fills `out` with every channel's sample in channel order.
    ///
    /// Each element is read atomically on its own; the array as a whole is not
    /// a consistent snapshot.
    pub fn get_all(&self, out: &mut [u16; N]) {
        for (channel, slot) in out.iter_mut().enumerate() {
            *slot = self.get(channel);
        }
    }

    /// Scaled variant of [`get_all`](Self::get_all).
    pub fn get_all_scaled(&self, out: &mut [f32; N]) {
        for (channel, slot) in out.iter_mut().enumerate() {
            *slot = self.get_scaled(channel);
        }
    }

    /// Completion interrupt body.
    ///
    /// Latches the finished conversion into the slot of the current channel,
    /// advances the cursor, and aims the multiplexer at the channel after the
    /// one the converter is already sampling.
    pub fn on_conversion_complete<C: Converter>(&self, converter: &mut C) -> Latch {
        critical_section::with(|cs| {
            let cursor_cell = self.cursor.borrow(cs);
            let cursor = cursor_cell.get();

            let value = converter.read_result();
            self.cache.store(cs, usize::from(cursor.current()), value);

            let advanced = cursor.advance(N);
            cursor_cell.set(advanced);
            converter.select_channel(advanced.next());

            let sequence = self.conversions.fetch_add(1, Ordering::Relaxed);
            // The primed duplicate of channel 0 plus one conversion per channel.
            if usize::try_from(sequence).ok().is_none_or(|count| count >= N) {
                self.filled.store(true, Ordering::Relaxed);
            }

            Latch {
                sequence,
                channel: cursor.current(),
                value,
            }
        })
    }

    /// Copy of the scan cursor.
    #[must_use]
    pub fn cursor(&self) -> ScanCursor {
        critical_section::with(|cs| self.cursor.borrow(cs).get())
    }

    /// Conversions latched since [`init`](Self::init), wrapping at `u32::MAX`.
    #[must_use]
    pub fn conversions(&self) -> u32 {
        self.conversions.load(Ordering::Relaxed)
    }

    /// Returns `true` once every slot holds a converted sample.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for AdcScanner<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes a raw sample by the full-scale count.
#[must_use]
pub fn scale(raw: u16) -> f32 {
    f32::from(raw) / f32::from(TOP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Reference;
    use crate::converter::ConverterSettings;
    use crate::prescaler::ConversionBand;

    /// Converter that reports a fixed result and remembers the last channel selected.
    struct FixedConverter {
        result: u16,
        selected: Option<u8>,
        started: Option<ConverterSettings>,
    }

    impl FixedConverter {
        fn new(result: u16) -> Self {
            Self {
                result,
                selected: None,
                started: None,
            }
        }
    }

    impl Converter for FixedConverter {
        fn start_free_running(&mut self, settings: &ConverterSettings) {
            self.started = Some(*settings);
        }

        fn read_result(&mut self) -> u16 {
            self.result
        }

        fn select_channel(&mut self, channel: u8) {
            self.selected = Some(channel);
        }
    }

    fn config() -> ScannerConfig {
        ScannerConfig::new(Reference::Avcc, 16_000_000, ConversionBand::ATMEGA328P)
            .expect("valid configuration")
    }

    #[test]
    fn init_starts_the_converter_and_primes_the_cursor() {
        let scanner = AdcScanner::<3>::new();
        let mut converter = FixedConverter::new(0);

        scanner.init(&mut converter, &config());

        assert_eq!(converter.started, Some(config().converter_settings()));
        assert_eq!(scanner.cursor(), ScanCursor::PRIMED);
        assert_eq!(scanner.conversions(), 0);
        assert!(!scanner.is_filled());
    }

    #[test]
    fn first_completion_latches_channel_zero_and_aims_at_one() {
        let scanner = AdcScanner::<3>::new();
        let mut converter = FixedConverter::new(321);
        scanner.init(&mut converter, &config());

        let latch = scanner.on_conversion_complete(&mut converter);

        assert_eq!(
            latch,
            Latch {
                sequence: 0,
                channel: 0,
                value: 321
            }
        );
        assert_eq!(scanner.get(0), 321);
        assert_eq!(converter.selected, Some(1));
        assert_eq!(scanner.cursor(), ScanCursor::at(0, 3));
    }

    #[test]
    fn filled_after_priming_plus_one_pass() {
        let scanner = AdcScanner::<3>::new();
        let mut converter = FixedConverter::new(1);
        scanner.init(&mut converter, &config());

        for _ in 0..3 {
            let _ = scanner.on_conversion_complete(&mut converter);
            assert!(!scanner.is_filled());
        }
        let _ = scanner.on_conversion_complete(&mut converter);
        assert!(scanner.is_filled());
    }

    #[test]
    fn reinit_clears_previous_samples() {
        let scanner = AdcScanner::<2>::new();
        let mut converter = FixedConverter::new(77);
        scanner.init(&mut converter, &config());
        let _ = scanner.on_conversion_complete(&mut converter);
        assert_eq!(scanner.get(0), 77);

        scanner.init(&mut converter, &config());
        assert_eq!(scanner.get(0), 0);
        assert_eq!(scanner.cursor(), ScanCursor::PRIMED);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn scale_divides_by_top() {
        assert_eq!(scale(0), 0.0);
        assert_eq!(scale(512), 0.5);
        assert!(scale(TOP - 1) < 1.0);
    }

    #[test]
    fn try_get_is_none_outside_the_scan_set() {
        let scanner = AdcScanner::<2>::new();
        assert_eq!(scanner.try_get(1), Some(0));
        assert_eq!(scanner.try_get(2), None);
    }

    #[test]
    #[should_panic(expected = "channel outside the scan set")]
    fn get_panics_outside_the_scan_set() {
        let scanner = AdcScanner::<2>::new();
        let _ = scanner.get(5);
    }
}
