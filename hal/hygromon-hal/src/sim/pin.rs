//! Simulated plain output line (status LEDs and the like)

use core::cell::Cell;

use crate::gpio::OutputPin;

/// Output line that counts its edges
#[derive(Debug, Default)]
pub struct SimOutput {
    high: Cell<bool>,
    edges: Cell<u32>,
}

impl SimOutput {
    /// Line starting low
    pub const fn new() -> Self {
        Self {
            high: Cell::new(false),
            edges: Cell::new(0),
        }
    }

    /// Pin driving this line
    pub fn pin(&self) -> SimOutputPin<'_> {
        SimOutputPin { line: self }
    }

    /// Current level
    pub fn is_high(&self) -> bool {
        self.high.get()
    }

    /// Number of level changes so far
    pub fn edges(&self) -> u32 {
        self.edges.get()
    }

    fn drive(&self, high: bool) {
        if self.high.replace(high) != high {
            self.edges.set(self.edges.get() + 1);
        }
    }
}

/// Pin attached to a [`SimOutput`]
#[derive(Debug, Clone, Copy)]
pub struct SimOutputPin<'a> {
    line: &'a SimOutput,
}

impl OutputPin for SimOutputPin<'_> {
    fn set_high(&mut self) {
        self.line.drive(true);
    }

    fn set_low(&mut self) {
        self.line.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.line.is_high()
    }
}
