use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use scanner_core::{
    AdcScanner, ConversionBand, Converter, ConverterSettings, Reference, ScannerConfig,
};

const CHANNELS: usize = 3;
const FIRINGS: usize = 50_000;

// Patterns that differ in both bytes, so mixing halves yields a third value.
const LOW_BYTE: u16 = 0x00FF;
const HIGH_BYTE: u16 = 0x0300;

/// Converter that alternates between the two patterns on every scan cycle.
struct AlternatingConverter {
    completed: usize,
}

impl Converter for AlternatingConverter {
    fn start_free_running(&mut self, _: &ConverterSettings) {}

    fn read_result(&mut self) -> u16 {
        let cycle = self.completed / CHANNELS;
        self.completed += 1;
        if cycle % 2 == 0 { LOW_BYTE } else { HIGH_BYTE }
    }

    fn select_channel(&mut self, _: u8) {}
}

fn config() -> ScannerConfig {
    ScannerConfig::new(Reference::Avcc, 16_000_000, ConversionBand::ATMEGA328P)
        .expect("16 MHz has a valid prescaler")
}

fn is_valid(value: u16) -> bool {
    matches!(value, 0 | LOW_BYTE | HIGH_BYTE)
}

#[test]
fn concurrent_reads_see_old_or_new_samples_only() {
    let scanner = AdcScanner::<CHANNELS>::new();
    let mut converter = AlternatingConverter { completed: 0 };
    scanner.init(&mut converter, &config());
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let readers: Vec<_> = (0..CHANNELS)
            .map(|channel| {
                let scanner = &scanner;
                let done = &done;
                scope.spawn(move || {
                    let mut observed = 0_usize;
                    loop {
                        let value = scanner.get(channel);
                        assert!(is_valid(value), "torn read {value:#06x} on channel {channel}");
                        observed += 1;
                        if done.load(Ordering::Acquire) {
                            break observed;
                        }
                    }
                })
            })
            .collect();

        for _ in 0..FIRINGS {
            let _ = scanner.on_conversion_complete(&mut converter);
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            let observed = reader.join().expect("reader thread panicked");
            assert!(observed > 0);
        }
    });
}

#[test]
fn bulk_reads_hold_valid_samples_under_contention() {
    let scanner = AdcScanner::<CHANNELS>::new();
    let mut converter = AlternatingConverter { completed: 0 };
    scanner.init(&mut converter, &config());
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut raw = [0_u16; CHANNELS];
            loop {
                scanner.get_all(&mut raw);
                assert!(raw.iter().copied().all(is_valid), "torn bulk read {raw:?}");
                if done.load(Ordering::Acquire) {
                    break;
                }
            }
        });

        for _ in 0..FIRINGS {
            let _ = scanner.on_conversion_complete(&mut converter);
        }
        done.store(true, Ordering::Release);
        reader.join().expect("reader thread panicked");
    });
}

#[test]
fn reads_nest_inside_an_outer_critical_section() {
    let scanner = AdcScanner::<CHANNELS>::new();
    let mut converter = AlternatingConverter { completed: 0 };
    scanner.init(&mut converter, &config());
    let _ = scanner.on_conversion_complete(&mut converter);

    // The inner section must not release the outer one on exit.
    let (first, second) = critical_section::with(|_| {
        let first = scanner.get(0);
        let second = scanner.get(0);
        (first, second)
    });
    assert_eq!(first, LOW_BYTE);
    assert_eq!(first, second);
}
