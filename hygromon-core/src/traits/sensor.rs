//! Humidity/temperature sensor trait

use crate::frame::{Reading, SensorFrame, FRAME_LEN};

/// Errors that can occur while acquiring a sensor frame
///
/// Callers are expected to treat every variant the same way (skip this
/// sample, retry on the next cycle); the variants only exist so the two
/// failure classes can be told apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// An expected line transition did not happen within the poll ceiling
    Timeout,
    /// All 40 bits arrived but the checksum byte does not match
    ChecksumMismatch {
        /// Sum of the four data bytes, modulo 256
        expected: u8,
        /// Checksum byte sent by the sensor
        received: u8,
    },
}

/// Trait for single-shot humidity/temperature sensors
///
/// Implementations must not be called more often than the part allows
/// (once per second for DHT11-class sensors). Enforcing that spacing is the
/// caller's job.
pub trait HumiditySensor {
    /// Acquire one checksum-validated frame
    fn read(&mut self) -> Result<SensorFrame, SensorError>;

    /// Acquire one frame into caller-supplied storage
    ///
    /// Returns `true` on success. On failure the buffer contents are
    /// unspecified.
    fn read_into(&mut self, frame: &mut [u8; FRAME_LEN]) -> bool {
        match self.read() {
            Ok(read) => {
                *frame = *read.as_bytes();
                true
            }
            Err(_) => false,
        }
    }

    /// Acquire one frame and decode it
    fn read_reading(&mut self) -> Result<Reading, SensorError> {
        self.read().map(|frame| frame.reading())
    }
}
