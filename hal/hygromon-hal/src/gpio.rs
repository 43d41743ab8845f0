//! GPIO pin abstractions
//!
//! Provides traits for digital input, output and direction-switchable pins
//! that can be implemented by chip-specific HALs. Pin operations on the
//! supported chips cannot fail, so none of these methods return `Result`.

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Level matching a bit value (`true` = high)
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Level::High
        } else {
            Level::Low
        }
    }

    /// The opposite level
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(bit: bool) -> Self {
        Level::from_bit(bit)
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// High impedance, sampling the line
    Input,
    /// Actively driving the line
    Output,
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Set the pin to a specific level
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Current level on the line
    fn level(&self) -> Level {
        Level::from_bit(self.is_high())
    }
}

/// Pin whose direction can be switched at runtime
///
/// Used for open-drain style single-wire buses: the host drives the line
/// low as an output, then releases it by switching to input so the external
/// pull-up (or the peripheral device) controls the level.
pub trait FlexPin: OutputPin + InputPin {
    /// Switch the pin to output, driving the last set level
    fn set_as_output(&mut self);

    /// Switch the pin to input (high impedance)
    fn set_as_input(&mut self);

    /// Current direction
    fn direction(&self) -> Direction;

    /// Switch to the given direction
    fn set_direction(&mut self, direction: Direction) {
        match direction {
            Direction::Input => self.set_as_input(),
            Direction::Output => self.set_as_output(),
        }
    }
}
