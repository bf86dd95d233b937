//! Round-robin scan cursor.
//!
//! The converter pipelines: when a conversion completes it immediately starts
//! the next one on whatever channel the multiplexer already points at. The
//! cursor therefore tracks two channels. `current` is the conversion that the
//! next completion interrupt will deliver, `next` is the channel the
//! multiplexer has been aimed at for the conversion after that.

/// Pair of channel indices advanced by the completion handler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanCursor {
    current: u8,
    next: u8,
}

impl ScanCursor {
    /// State right after scanning starts.
    ///
    /// The multiplexer sits on channel 0 for the first conversion and cannot be
    /// moved before the first completion, so channel 0 is converted twice in a
    /// row. After the first advance the cursor is in steady state.
    pub const PRIMED: Self = Self {
        current: 0,
        next: 0,
    };

    /// Steady-state cursor with `current` in flight.
    ///
    /// # Panics
    ///
    /// Panics if `current` is not below `channels`.
    #[must_use]
    pub const fn at(current: u8, channels: usize) -> Self {
        assert!((current as usize) < channels, "channel outside the scan set");
        Self {
            current,
            next: wrap_next(current, channels),
        }
    }

    /// Channel whose conversion completes next.
    #[must_use]
    pub const fn current(self) -> u8 {
        self.current
    }

    /// Channel the multiplexer is aimed at.
    #[must_use]
    pub const fn next(self) -> u8 {
        self.next
    }

    /// Moves one step around a scan set of `channels` inputs.
    #[must_use]
    pub const fn advance(self, channels: usize) -> Self {
        Self {
            current: self.next,
            next: wrap_next(self.next, channels),
        }
    }

    /// Returns `true` when `next == (current + 1) % channels`.
    #[must_use]
    pub const fn is_steady(self, channels: usize) -> bool {
        self.next == wrap_next(self.current, channels)
    }
}

const fn wrap_next(channel: u8, channels: usize) -> u8 {
    let next = channel + 1;
    if next as usize >= channels { 0 } else { next }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primed_cursor_repeats_channel_zero_once() {
        let first = ScanCursor::PRIMED.advance(6);
        assert_eq!((first.current(), first.next()), (0, 1));
        assert!(first.is_steady(6));
        assert!(!ScanCursor::PRIMED.is_steady(6));
    }

    #[test]
    fn advance_wraps_at_the_channel_count() {
        let cursor = ScanCursor::at(4, 6).advance(6);
        assert_eq!((cursor.current(), cursor.next()), (5, 0));

        let wrapped = cursor.advance(6);
        assert_eq!((wrapped.current(), wrapped.next()), (0, 1));
    }

    #[test]
    fn single_channel_scan_stays_on_zero() {
        assert!(ScanCursor::PRIMED.is_steady(1));
        let cursor = ScanCursor::PRIMED.advance(1).advance(1);
        assert_eq!(cursor, ScanCursor::PRIMED);
    }

    #[test]
    fn steady_state_holds_for_every_step() {
        let mut cursor = ScanCursor::PRIMED.advance(8);
        for _ in 0..64 {
            assert!(cursor.is_steady(8));
            cursor = cursor.advance(8);
        }
    }

    #[test]
    #[should_panic(expected = "channel outside the scan set")]
    fn at_rejects_channels_outside_the_set() {
        let _ = ScanCursor::at(6, 6);
    }
}
