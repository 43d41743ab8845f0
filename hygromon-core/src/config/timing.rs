//! Protocol timing configuration
//!
//! The defaults are the datasheet values both parts are known to accept.
//! The minimums are enforced by [`super::BoardConfig::validate`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shortest host start pulse the sensor recognizes (ms)
pub const MIN_START_LOW_MS: u32 = 18;

/// Shortest spacing between two sensor reads (ms)
pub const MIN_SAMPLE_INTERVAL_MS: u32 = 1_000;

/// Shortest settle time after an enable pulse (us)
pub const MIN_ENABLE_SETTLE_US: u32 = 100;

/// Shortest wait after the clear-display command (us)
pub const MIN_CLEAR_SETTLE_US: u32 = 1_520;

/// Single-wire sensor timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SensorTiming {
    /// Host start pulse length (ms)
    pub start_low_ms: u32,
    /// Delay between two samples of the line in a bounded wait (us)
    pub poll_interval_us: u32,
    /// Maximum samples per bounded wait before giving up
    pub poll_ceiling: u32,
    /// High phases longer than this decode as a 1 bit (us)
    ///
    /// Sits between the ~26 us "0" pulse and the ~70 us "1" pulse. The
    /// driver scales it by the measured ~50 us low phase that precedes
    /// every bit, so slow or fast polls do not shift the decision.
    pub bit_one_threshold_us: u32,
}

impl SensorTiming {
    /// Datasheet defaults
    pub const DEFAULT: Self = Self {
        start_low_ms: 20,
        poll_interval_us: 1,
        poll_ceiling: 200,
        bit_one_threshold_us: 40,
    };

    /// Bit threshold expressed in poll samples
    pub const fn threshold_polls(&self) -> u32 {
        let interval = if self.poll_interval_us == 0 {
            1
        } else {
            self.poll_interval_us
        };
        self.bit_one_threshold_us / interval
    }
}

impl Default for SensorTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Character display bus timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct LcdTiming {
    /// Wait after power on before the first instruction (ms)
    pub power_on_ms: u32,
    /// Settle after each of the three 8-bit function-set nibbles (us)
    pub function_set_settle_us: [u32; 3],
    /// Settle after the nibble selecting 4-bit mode (us)
    pub mode_select_settle_us: u32,
    /// Enable held low before the rising edge (us)
    pub enable_setup_us: u32,
    /// Enable held high (us)
    pub enable_high_us: u32,
    /// Wait after the falling edge for the controller to latch (us)
    pub enable_settle_us: u32,
    /// Wait after the clear-display command (us)
    pub clear_settle_us: u32,
}

impl LcdTiming {
    /// Datasheet defaults
    pub const DEFAULT: Self = Self {
        power_on_ms: 50,
        function_set_settle_us: [4_500, 4_500, 150],
        mode_select_settle_us: 150,
        enable_setup_us: 1,
        enable_high_us: 1,
        enable_settle_us: 100,
        clear_settle_us: 2_000,
    };
}

impl Default for LcdTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Control loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct MonitorConfig {
    /// Pause between loop iterations (ms)
    pub sample_interval_ms: u32,
    /// Consecutive failed reads before the firmware logs a warning
    pub failure_warn_threshold: u16,
}

impl MonitorConfig {
    /// Defaults
    pub const DEFAULT: Self = Self {
        sample_interval_ms: 2_000,
        failure_warn_threshold: 5,
    };
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
