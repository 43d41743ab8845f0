//! GPIO adapters
//!
//! Wrap embassy-rp pin drivers so the protocol drivers can use them
//! through the `hygromon-hal` traits.

use embassy_rp::gpio::{AnyPin, Flex, Level as RpLevel, Output, Pull};
use embassy_rp::Peri;
use hygromon_hal::gpio::{Direction, FlexPin, InputPin, Level, OutputPin};

fn to_rp(level: Level) -> RpLevel {
    match level {
        Level::Low => RpLevel::Low,
        Level::High => RpLevel::High,
    }
}

/// Push-pull output (display bus, indicator LED)
pub struct RpOutputPin {
    pin: Output<'static>,
}

impl RpOutputPin {
    /// Configure `pin` as an output driving `initial`
    pub fn new(pin: Peri<'static, AnyPin>, initial: Level) -> Self {
        Self {
            pin: Output::new(pin, to_rp(initial)),
        }
    }
}

impl OutputPin for RpOutputPin {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Bidirectional open line (single-wire sensor data)
///
/// Starts as an input with the internal pull-up enabled. The pull-up is
/// weak (~50 kOhm), so an external 4.7-10 kOhm resistor is still
/// recommended on long sensor leads.
pub struct RpFlexPin {
    pin: Flex<'static>,
}

impl RpFlexPin {
    /// Configure `pin` as a pulled-up input
    pub fn new(pin: Peri<'static, AnyPin>) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(Pull::Up);
        pin.set_as_input();
        Self { pin }
    }
}

impl OutputPin for RpFlexPin {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

impl InputPin for RpFlexPin {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl FlexPin for RpFlexPin {
    fn set_as_output(&mut self) {
        self.pin.set_as_output();
    }

    fn set_as_input(&mut self) {
        self.pin.set_as_input();
    }

    fn direction(&self) -> Direction {
        if self.pin.is_set_as_output() {
            Direction::Output
        } else {
            Direction::Input
        }
    }
}
