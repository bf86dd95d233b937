//! Emulated MCU: the scanner, its converter model, and an "interrupt" thread.
//!
//! The background thread plays the role of the ADC completion interrupt. It
//! fires [`AdcScanner::on_conversion_complete`] at the configured rate while
//! the console thread reads the cache through the same public API the firmware
//! exposes. Both sides meet in `critical-section`'s host implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use scanner_core::sim::PipelinedConverter;
use scanner_core::{AdcScanner, Latch, LatchLog, ScanCursor, ScannerConfig};

use crate::signals::Waveforms;

/// Channels wired on the emulated board.
pub const CHANNELS: usize = 6;

const TICK: Duration = Duration::from_millis(1);

/// Upper bound on interrupts fired per tick; a stalled host drops the backlog.
const MAX_BURST: u64 = 4_096;

struct Shared {
    scanner: AdcScanner<CHANNELS>,
    converter: Mutex<PipelinedConverter<Waveforms>>,
    history: Mutex<LatchLog>,
    paused: AtomicBool,
    stop: AtomicBool,
}

impl Shared {
    fn converter(&self) -> MutexGuard<'_, PipelinedConverter<Waveforms>> {
        self.converter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn history(&self) -> MutexGuard<'_, LatchLog> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `count` completion interrupts back to back.
    fn fire(&self, count: u64) -> Option<Latch> {
        let mut converter = self.converter();
        let mut last = None;
        for _ in 0..count {
            let latch = converter.step(&self.scanner)?;
            self.history().record(latch);
            last = Some(latch);
        }
        last
    }
}

/// Owns the interrupt thread. Dropping the harness stops it.
pub struct Harness {
    shared: Arc<Shared>,
    config: ScannerConfig,
    rate: u32,
    worker: Option<JoinHandle<()>>,
}

impl Harness {
    /// Initializes the scanner and starts firing interrupts at `rate` per
    /// second, or at the converter's own rate when `rate` is `None`.
    pub fn start(config: ScannerConfig, rate: Option<u32>, paused: bool) -> Self {
        let shared = Arc::new(Shared {
            scanner: AdcScanner::new(),
            converter: Mutex::new(PipelinedConverter::new(Waveforms::board(CHANNELS))),
            history: Mutex::new(LatchLog::new()),
            paused: AtomicBool::new(paused),
            stop: AtomicBool::new(false),
        });
        shared.scanner.init(&mut *shared.converter(), &config);

        let rate = rate.unwrap_or_else(|| config.conversion_rate_hz()).max(1);
        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("adc-interrupt".to_string())
                .spawn(move || interrupt_loop(&shared, rate))
                .ok()
        };

        Self {
            shared,
            config,
            rate,
            worker,
        }
    }

    pub fn scanner(&self) -> &AdcScanner<CHANNELS> {
        &self.shared.scanner
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn cursor(&self) -> ScanCursor {
        self.shared.scanner.cursor()
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
    }

    /// Fires `count` interrupts from the calling thread.
    pub fn step(&self, count: u64) -> Option<Latch> {
        self.shared.fire(count)
    }

    /// Most recent latches, oldest first, at most `limit`.
    pub fn history(&self, limit: usize) -> Vec<Latch> {
        let history = self.shared.history();
        let skip = history.len().saturating_sub(limit);
        history.oldest_first().skip(skip).copied().collect()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn interrupt_loop(shared: &Shared, rate: u32) {
    let mut epoch = Instant::now();
    let mut fired: u64 = 0;

    while !shared.stop.load(Ordering::Acquire) {
        if shared.paused.load(Ordering::Acquire) {
            epoch = Instant::now();
            fired = 0;
        } else {
            let elapsed = epoch.elapsed().as_micros();
            let target = elapsed * u128::from(rate) / 1_000_000;
            let target = u64::try_from(target).unwrap_or(u64::MAX);
            let due = target.saturating_sub(fired);
            fired = target;
            let _ = shared.fire(due.min(MAX_BURST));
        }
        thread::sleep(TICK);
    }
}
