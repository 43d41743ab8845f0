//! Board wiring
//!
//! The constants come from board.toml via build.rs; this module turns the
//! pin numbers into configured RP2040 pins.

use hygromon_core::config::{BoardConfig, LcdTiming, MonitorConfig, PinMap, SensorTiming};
use hygromon_drivers::LcdPins;
use hygromon_hal::gpio::Level;
use hygromon_hal_rp2040::{PinBank, PinError, RpFlexPin, RpOutputPin};

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

/// Configured pins for every peripheral on the board
pub struct Hardware {
    /// Sensor data line
    pub sensor: RpFlexPin,
    /// Display bus
    pub lcd: LcdPins<RpOutputPin>,
    /// Heartbeat LED
    pub indicator: RpOutputPin,
}

impl Hardware {
    /// Take and configure the pins named in `pins`
    pub fn take(bank: &mut PinBank, pins: &PinMap) -> Result<Self, PinError> {
        Ok(Self {
            sensor: bank.take_flex(pins.sensor)?,
            lcd: LcdPins {
                rs: bank.take_output(pins.lcd_rs, Level::Low)?,
                en: bank.take_output(pins.lcd_en, Level::Low)?,
                data: [
                    bank.take_output(pins.lcd_d4, Level::Low)?,
                    bank.take_output(pins.lcd_d5, Level::Low)?,
                    bank.take_output(pins.lcd_d6, Level::Low)?,
                    bank.take_output(pins.lcd_d7, Level::Low)?,
                ],
            },
            indicator: bank.take_output(pins.indicator, Level::Low)?,
        })
    }
}
