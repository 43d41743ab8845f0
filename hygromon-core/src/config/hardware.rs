//! Board configuration types
//!
//! Pin assignments are fixed when the firmware is built. The firmware's
//! build script deserializes the board file into [`BoardConfig`], runs
//! [`BoardConfig::validate`] and bakes the result into constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::timing::{
    LcdTiming, MonitorConfig, SensorTiming, MIN_CLEAR_SETTLE_US, MIN_ENABLE_SETTLE_US,
    MIN_SAMPLE_INTERVAL_MS, MIN_START_LOW_MS,
};

/// Number of GPIO pins on the target chip (RP2040)
pub const GPIO_COUNT: u8 = 30;

/// Number of pins a board assigns
pub const ASSIGNED_PINS: usize = 8;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin number not present on the chip
    PinOutOfRange { pin: u8 },
    /// Same pin assigned to two functions
    DuplicatePin { pin: u8 },
    /// Start pulse shorter than the sensor recognizes
    StartPulseTooShort { ms: u32 },
    /// Poll interval of zero
    PollIntervalZero,
    /// Poll ceiling of zero
    PollCeilingZero,
    /// Bit threshold not below the poll ceiling
    ThresholdBeyondCeiling { threshold_polls: u32, ceiling: u32 },
    /// Enable settle shorter than the controller needs
    EnableSettleTooShort { us: u32 },
    /// Clear settle shorter than the clear instruction takes
    ClearSettleTooShort { us: u32 },
    /// Reads spaced closer than the sensor allows
    SampleIntervalTooShort { ms: u32 },
}

/// Longest prefix of `text` holding at most `max_chars` characters
///
/// Splits on a character boundary, so echoed board file content with
/// multi-byte characters can be clipped to a fixed-width report.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// GPIO assignment for every line the firmware drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct PinMap {
    /// Display register select
    pub lcd_rs: u8,
    /// Display enable strobe
    pub lcd_en: u8,
    /// Display data bit 4
    pub lcd_d4: u8,
    /// Display data bit 5
    pub lcd_d5: u8,
    /// Display data bit 6
    pub lcd_d6: u8,
    /// Display data bit 7
    pub lcd_d7: u8,
    /// Heartbeat indicator (LED)
    pub indicator: u8,
    /// Sensor data line (bidirectional, needs a pull-up)
    pub sensor: u8,
}

impl PinMap {
    /// Raspberry Pi Pico wiring used by the reference build
    pub const PICO: Self = Self {
        lcd_rs: 7,
        lcd_en: 6,
        lcd_d4: 2,
        lcd_d5: 3,
        lcd_d6: 4,
        lcd_d7: 5,
        indicator: 25,
        sensor: 15,
    };

    /// Every assigned pin
    pub const fn all(&self) -> [u8; ASSIGNED_PINS] {
        [
            self.lcd_rs,
            self.lcd_en,
            self.lcd_d4,
            self.lcd_d5,
            self.lcd_d6,
            self.lcd_d7,
            self.indicator,
            self.sensor,
        ]
    }

    /// Check pin numbers are in range and unique
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.all();
        let mut seen: u32 = 0;
        for &pin in &pins {
            if pin >= GPIO_COUNT {
                return Err(ConfigError::PinOutOfRange { pin });
            }
            let mask = 1u32 << pin;
            if seen & mask != 0 {
                return Err(ConfigError::DuplicatePin { pin });
            }
            seen |= mask;
        }
        Ok(())
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self::PICO
    }
}

/// Complete board description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct BoardConfig {
    /// Pin assignment
    pub pins: PinMap,
    /// Sensor timing overrides
    #[cfg_attr(feature = "serde", serde(default))]
    pub sensor: SensorTiming,
    /// Display timing overrides
    #[cfg_attr(feature = "serde", serde(default))]
    pub lcd: LcdTiming,
    /// Control loop settings
    #[cfg_attr(feature = "serde", serde(default))]
    pub monitor: MonitorConfig,
}

impl BoardConfig {
    /// Check every rule the hardware imposes
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pins.validate()?;

        let sensor = &self.sensor;
        if sensor.start_low_ms < MIN_START_LOW_MS {
            return Err(ConfigError::StartPulseTooShort {
                ms: sensor.start_low_ms,
            });
        }
        if sensor.poll_interval_us == 0 {
            return Err(ConfigError::PollIntervalZero);
        }
        if sensor.poll_ceiling == 0 {
            return Err(ConfigError::PollCeilingZero);
        }
        if sensor.threshold_polls() >= sensor.poll_ceiling {
            return Err(ConfigError::ThresholdBeyondCeiling {
                threshold_polls: sensor.threshold_polls(),
                ceiling: sensor.poll_ceiling,
            });
        }

        if self.lcd.enable_settle_us < MIN_ENABLE_SETTLE_US {
            return Err(ConfigError::EnableSettleTooShort {
                us: self.lcd.enable_settle_us,
            });
        }
        if self.lcd.clear_settle_us < MIN_CLEAR_SETTLE_US {
            return Err(ConfigError::ClearSettleTooShort {
                us: self.lcd.clear_settle_us,
            });
        }

        if self.monitor.sample_interval_ms < MIN_SAMPLE_INTERVAL_MS {
            return Err(ConfigError::SampleIntervalTooShort {
                ms: self.monitor.sample_interval_ms,
            });
        }

        Ok(())
    }
}
