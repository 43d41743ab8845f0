//! Sensor frame and decoded reading
//!
//! Frame format (40 bits, MSB first per byte):
//! - HUMIDITY_INT (1 byte): relative humidity, whole percent
//! - HUMIDITY_DEC (1 byte): relative humidity, tenths
//! - TEMP_INT (1 byte): temperature, whole degrees Celsius
//! - TEMP_DEC (1 byte): temperature tenths; bit 7 set means below zero
//! - CHECKSUM (1 byte): sum of the four bytes above, modulo 256

use crate::traits::SensorError;

/// Bytes per frame
pub const FRAME_LEN: usize = 5;

/// Bits per frame
pub const FRAME_BITS: usize = FRAME_LEN * 8;

/// Sign flag in the temperature fraction byte
const TEMP_NEGATIVE: u8 = 0x80;

/// One raw frame as clocked in from the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorFrame {
    bytes: [u8; FRAME_LEN],
}

impl SensorFrame {
    /// Wrap raw bytes (not validated)
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Raw bytes
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Whole-percent humidity byte
    pub const fn humidity_integer(&self) -> u8 {
        self.bytes[0]
    }

    /// Humidity tenths byte
    pub const fn humidity_fraction(&self) -> u8 {
        self.bytes[1]
    }

    /// Whole-degree temperature byte
    pub const fn temperature_integer(&self) -> u8 {
        self.bytes[2]
    }

    /// Temperature tenths byte (bit 7 is the sign flag)
    pub const fn temperature_fraction(&self) -> u8 {
        self.bytes[3]
    }

    /// Checksum byte as transmitted
    pub const fn checksum(&self) -> u8 {
        self.bytes[4]
    }

    /// Checksum computed from the four data bytes
    pub fn expected_checksum(&self) -> u8 {
        self.bytes[..4]
            .iter()
            .fold(0u8, |sum, &b| sum.wrapping_add(b))
    }

    /// Check the checksum invariant
    pub fn is_valid(&self) -> bool {
        self.expected_checksum() == self.checksum()
    }

    /// Return the frame if its checksum matches
    pub fn validate(self) -> Result<Self, SensorError> {
        let expected = self.expected_checksum();
        if expected == self.checksum() {
            Ok(self)
        } else {
            Err(SensorError::ChecksumMismatch {
                expected,
                received: self.checksum(),
            })
        }
    }

    /// Decode the measurement
    pub fn reading(&self) -> Reading {
        let humidity_x10 =
            u16::from(self.humidity_integer()) * 10 + u16::from(self.humidity_fraction().min(9));

        let fraction = self.temperature_fraction();
        let magnitude =
            i16::from(self.temperature_integer()) * 10 + i16::from((fraction & !TEMP_NEGATIVE).min(9));
        let temperature_x10 = if fraction & TEMP_NEGATIVE != 0 {
            -magnitude
        } else {
            magnitude
        };

        Reading {
            humidity_x10,
            temperature_x10,
        }
    }
}

impl From<[u8; FRAME_LEN]> for SensorFrame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Decoded humidity and temperature
///
/// Fixed-point values with 0.1 resolution: 45.5 %RH is 455, -2.3 °C is -23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Relative humidity in 0.1 %RH units
    pub humidity_x10: u16,
    /// Temperature in 0.1 °C units
    pub temperature_x10: i16,
}

impl Reading {
    /// Whole-percent relative humidity
    pub const fn humidity_percent(&self) -> u16 {
        self.humidity_x10 / 10
    }

    /// Whole degrees Celsius, truncated toward zero
    pub const fn temperature_celsius(&self) -> i16 {
        self.temperature_x10 / 10
    }
}
