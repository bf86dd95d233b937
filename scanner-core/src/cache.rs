//! Latest-sample cache shared between the completion interrupt and readers.
//!
//! A 16-bit slot cannot be loaded in one instruction on an 8-bit core, so
//! every access goes through a critical section. On the firmware that masks
//! interrupts and restores the previous enable state afterwards; on the host
//! the `std` implementation serializes threads instead.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

/// One slot per channel, zeroed at construction.
pub struct ChannelCache<const N: usize> {
    slots: Mutex<[Cell<u16>; N]>,
}

impl<const N: usize> ChannelCache<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new([const { Cell::new(0) }; N]),
        }
    }

    /// Loads one slot inside its own critical section.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= N`.
    #[must_use]
    pub fn load(&self, channel: usize) -> u16 {
        assert!(channel < N, "channel outside the scan set");
        critical_section::with(|cs| self.slots.borrow(cs)[channel].get())
    }

    /// Loads one slot, returning `None` for channels outside the cache.
    #[must_use]
    pub fn try_load(&self, channel: usize) -> Option<u16> {
        critical_section::with(|cs| self.slots.borrow(cs).get(channel).map(Cell::get))
    }

    /// Stores into a slot. The caller already holds the critical section.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= N`.
    pub fn store(&self, cs: CriticalSection<'_>, channel: usize, value: u16) {
        self.slots.borrow(cs)[channel].set(value);
    }

    pub fn clear(&self, cs: CriticalSection<'_>) {
        for slot in self.slots.borrow(cs) {
            slot.set(0);
        }
    }
}

impl<const N: usize> Default for ChannelCache<N> {
    fn default() -> Self {
        Self::new()
    }
}
