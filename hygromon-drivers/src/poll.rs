//! Bounded line polling
//!
//! Every wait on an externally driven line goes through [`wait_for_level`],
//! which samples at a fixed interval and gives up after a fixed number of
//! samples. A missing or stuck peripheral therefore costs at most
//! `ceiling * interval_us` microseconds per wait.

use embedded_hal::delay::DelayNs;
use hygromon_core::config::SensorTiming;
use hygromon_core::traits::SensorError;
use hygromon_hal::gpio::{InputPin, Level};

/// The line did not reach the expected level within the poll ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollTimeout;

impl From<PollTimeout> for SensorError {
    fn from(_: PollTimeout) -> Self {
        SensorError::Timeout
    }
}

/// Sampling parameters for one bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollConfig {
    /// Maximum number of samples before giving up
    pub ceiling: u32,
    /// Delay between samples (us)
    pub interval_us: u32,
}

impl PollConfig {
    /// Create a poll configuration
    pub const fn new(ceiling: u32, interval_us: u32) -> Self {
        Self {
            ceiling,
            interval_us,
        }
    }
}

impl From<&SensorTiming> for PollConfig {
    fn from(timing: &SensorTiming) -> Self {
        Self::new(timing.poll_ceiling, timing.poll_interval_us)
    }
}

/// Spin until `pin` reads `level`
///
/// Returns the number of intervals waited before the level was seen
/// (0 if it was already there), which doubles as a pulse-width
/// measurement in units of `interval_us`.
pub fn wait_for_level<P, D>(
    pin: &P,
    level: Level,
    config: PollConfig,
    delay: &mut D,
) -> Result<u32, PollTimeout>
where
    P: InputPin + ?Sized,
    D: DelayNs,
{
    for polls in 0..config.ceiling {
        if pin.level() == level {
            return Ok(polls);
        }
        delay.delay_us(config.interval_us);
    }
    Err(PollTimeout)
}
