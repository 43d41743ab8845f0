//! Simulated time source
//!
//! Time only moves when a driver delays. Pin reads and writes are
//! instantaneous, which makes every protocol trace deterministic.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;

/// Monotonic nanosecond clock shared by simulated pins and delays
#[derive(Debug, Default)]
pub struct SimClock {
    now_ns: Cell<u64>,
    /// Total number of delay calls (one per poll in a bounded wait)
    delays: Cell<u32>,
}

impl SimClock {
    /// Create a clock at t = 0
    pub const fn new() -> Self {
        Self {
            now_ns: Cell::new(0),
            delays: Cell::new(0),
        }
    }

    /// Current time in nanoseconds
    pub fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }

    /// Current time in whole microseconds
    pub fn now_us(&self) -> u64 {
        self.now_ns.get() / 1_000
    }

    /// Move time forward
    pub fn advance_ns(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get().saturating_add(ns));
    }

    /// Number of delay calls made so far
    pub fn delay_calls(&self) -> u32 {
        self.delays.get()
    }

    /// A delay provider bound to this clock
    pub fn delay(&self) -> SimDelay<'_> {
        SimDelay { clock: self }
    }
}

/// `DelayNs` implementation that advances a [`SimClock`]
#[derive(Debug, Clone, Copy)]
pub struct SimDelay<'a> {
    clock: &'a SimClock,
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.delays.set(self.clock.delays.get().wrapping_add(1));
        self.clock.advance_ns(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.delays.set(self.clock.delays.get().wrapping_add(1));
        self.clock.advance_ns(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delays.set(self.clock.delays.get().wrapping_add(1));
        self.clock.advance_ns(u64::from(ms) * 1_000_000);
    }
}
