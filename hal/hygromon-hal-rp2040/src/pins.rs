//! Pin allocation by number
//!
//! Board pin numbers come from the build-time board file, so the firmware
//! asks for GPIOs by number instead of naming `PIN_n` fields directly.

use embassy_rp::gpio::AnyPin;
use embassy_rp::{Peri, Peripherals};
use hygromon_hal::gpio::Level;

use crate::gpio::{RpFlexPin, RpOutputPin};

/// Number of user GPIOs on the RP2040
pub const PIN_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
}

/// Pin bank that holds all GPIO pins and allows taking them by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; PIN_COUNT],
}

impl PinBank {
    /// Create a pin bank from peripherals
    ///
    /// Takes every GPIO; the remaining peripherals are not used by the
    /// firmware and are dropped.
    pub fn new(p: Peripherals) -> Self {
        Self {
            pins: [
                Some(p.PIN_0.into()),
                Some(p.PIN_1.into()),
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        }
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(usize::from(pin_num))
            .ok_or(PinError::InvalidPin(pin_num))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }

    /// Take a pin configured as a push-pull output
    pub fn take_output(&mut self, pin_num: u8, initial: Level) -> Result<RpOutputPin, PinError> {
        Ok(RpOutputPin::new(self.take(pin_num)?, initial))
    }

    /// Take a pin configured as a pulled-up bidirectional line
    pub fn take_flex(&mut self, pin_num: u8) -> Result<RpFlexPin, PinError> {
        Ok(RpFlexPin::new(self.take(pin_num)?))
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin_num: u8) -> bool {
        self.pins
            .get(usize::from(pin_num))
            .is_some_and(|pin| pin.is_some())
    }
}
