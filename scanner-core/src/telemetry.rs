//! Latch records and a bounded history of them.
//!
//! Every completion interrupt produces one [`Latch`]. Firmware discards them;
//! host tooling keeps the most recent ones in a [`LatchLog`] to show scan order
//! and to check it in tests.

use heapless::{HistoryBuf, OldestOrdered};

use crate::config::ScannerConfig;

/// Default number of latches retained by a [`LatchLog`].
pub const LATCH_LOG_CAPACITY: usize = 64;

/// One sample stored into the cache by the completion handler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Latch {
    /// Zero-based conversion count since scanning started (wrapping).
    pub sequence: u32,
    pub channel: u8,
    pub value: u16,
}

/// Fixed-capacity ring of the most recent latches.
pub struct LatchLog<const CAPACITY: usize = LATCH_LOG_CAPACITY> {
    ring: HistoryBuf<Latch, CAPACITY>,
}

impl<const CAPACITY: usize> LatchLog<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
        }
    }

    pub fn record(&mut self, latch: Latch) {
        self.ring.write(latch);
    }

    /// Recorded latches in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, Latch> {
        self.ring.oldest_ordered()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Latch> {
        self.ring.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

impl<const CAPACITY: usize> Default for LatchLog<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn log_scan_started(config: &ScannerConfig, channels: usize) {
    emit_scan_started(
        channels,
        config.cpu_hz(),
        config.prescaler().divisor(),
        config.conversion_rate_hz(),
    );
}

#[cfg(feature = "defmt")]
fn emit_scan_started(channels: usize, cpu_hz: u32, divisor: u32, rate_hz: u32) {
    defmt::debug!(
        "adc:scan started channels={} f_cpu={}Hz prescaler=/{} rate={}/s",
        channels,
        cpu_hz,
        divisor,
        rate_hz
    );
}

#[cfg(not(feature = "defmt"))]
fn emit_scan_started(_channels: usize, _cpu_hz: u32, _divisor: u32, _rate_hz: u32) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn latch(sequence: u32, channel: u8) -> Latch {
        Latch {
            sequence,
            channel,
            value: u16::from(channel) * 100,
        }
    }

    #[test]
    fn keeps_only_the_most_recent_latches() {
        let mut log = LatchLog::<4>::new();
        for sequence in 0..6 {
            log.record(latch(sequence, (sequence % 3) as u8));
        }

        assert_eq!(log.len(), 4);
        let sequences: heapless::Vec<u32, 4> = log.oldest_first().map(|l| l.sequence).collect();
        assert_eq!(sequences.as_slice(), &[2, 3, 4, 5]);
        assert_eq!(log.latest().map(|l| l.channel), Some(2));
    }

    #[test]
    fn clear_empties_the_ring() {
        let mut log = LatchLog::<2>::new();
        log.record(latch(0, 0));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.latest(), None);
    }
}
