//! GPIO status indicator
//!
//! Heartbeat LED driven directly from a GPIO pin.

use hygromon_core::traits::StatusIndicator;
use hygromon_hal::gpio::OutputPin;

/// GPIO status indicator
///
/// Lit state is tracked logically so active-low LEDs (common on boards
/// that sink the LED current) read the same as active-high ones.
pub struct GpioIndicator<P> {
    pin: P,
    /// If true, lit = pin LOW
    inverted: bool,
    lit: bool,
}

impl<P: OutputPin> GpioIndicator<P> {
    /// Create an indicator, initially dark
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin driving the LED
    /// - `inverted`: If true, the LED is lit when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut indicator = Self {
            pin,
            inverted,
            lit: false,
        };
        indicator.set_lit(false);
        indicator
    }

    /// Create an indicator on an active-high LED
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create an indicator on an active-low LED
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Force the lit state
    pub fn set_lit(&mut self, lit: bool) {
        self.lit = lit;
        if lit != self.inverted {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> StatusIndicator for GpioIndicator<P> {
    fn toggle(&mut self) {
        self.set_lit(!self.lit);
    }

    fn is_lit(&self) -> bool {
        self.lit
    }
}
