//! DHT11 humidity/temperature sensor (single-wire)
//!
//! # Wire Protocol
//!
//! The data line idles high through a pull-up. A transaction is:
//!
//! ```text
//! host:   ‾‾‾\__________/‾‾ (released)
//!              >= 18 ms
//! sensor:                  \_____/‾‾‾‾‾\_ bit 0 _ bit 1 _ ... _ bit 39 _/‾‾
//!                           80 us  80 us
//! bit:    \____/‾‾‾‾‾‾‾‾\     low ~50 us, then high ~26 us (0) or ~70 us (1)
//! ```
//!
//! Poll intervals are nominal: the sample loop adds overhead on real
//! hardware, so a bit is decoded by comparing its high phase against the
//! low phase measured just before it rather than against an absolute count.
//!
//! Bits arrive MSB first, 5 bytes total. The fifth byte is the sum of the
//! first four modulo 256 (see [`SensorFrame`]).
//!
//! All waits are bounded by [`SensorTiming::poll_ceiling`]; the sensor needs
//! at least one second between transactions, which the caller must honor.

use embedded_hal::delay::DelayNs;
use hygromon_core::config::SensorTiming;
use hygromon_core::frame::{SensorFrame, FRAME_LEN};
use hygromon_core::traits::{HumiditySensor, SensorError};
use hygromon_hal::gpio::{FlexPin, Level};

use crate::poll::{wait_for_level, PollConfig, PollTimeout};

/// Nominal low phase preceding every data bit (us)
const BIT_LOW_US: u32 = 50;

/// DHT11 driver
///
/// Owns the data pin and a delay provider. Between transactions the pin is
/// left as an input so the pull-up holds the line idle.
pub struct Dht11<P, D> {
    pin: P,
    delay: D,
    timing: SensorTiming,
}

impl<P: FlexPin, D: DelayNs> Dht11<P, D> {
    /// Create a driver with datasheet timing
    pub fn new(pin: P, delay: D) -> Self {
        Self::with_timing(pin, delay, SensorTiming::DEFAULT)
    }

    /// Create a driver with custom timing
    pub fn with_timing(mut pin: P, delay: D, timing: SensorTiming) -> Self {
        pin.set_as_input();
        Self { pin, delay, timing }
    }

    /// Active timing
    pub fn timing(&self) -> &SensorTiming {
        &self.timing
    }

    /// Release the pin and delay provider
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn poll_config(&self) -> PollConfig {
        PollConfig::from(&self.timing)
    }

    fn wait_for(&mut self, level: Level) -> Result<u32, PollTimeout> {
        let config = self.poll_config();
        wait_for_level(&self.pin, level, config, &mut self.delay)
    }

    /// Hold the line low, then hand it back to the pull-up
    fn start_signal(&mut self) {
        self.pin.set_low();
        self.pin.set_as_output();
        self.delay.delay_ms(self.timing.start_low_ms);
        self.pin.set_as_input();
    }

    /// Response: line pulled low, released high, then low for the first bit
    fn acknowledge(&mut self) -> Result<(), PollTimeout> {
        self.wait_for(Level::Low)?;
        self.wait_for(Level::High)?;
        self.wait_for(Level::Low)?;
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, PollTimeout> {
        let low_polls = self.wait_for(Level::High)?;
        let high_polls = self.wait_for(Level::Low)?;
        Ok(self.decode_bit(low_polls, high_polls))
    }

    /// Scale the bit threshold by the measured low phase
    ///
    /// `low_polls` samples took ~[`BIT_LOW_US`], so the threshold in
    /// samples is `bit_one_threshold_us * low_polls / BIT_LOW_US`. A low
    /// phase that was not observed falls back to the nominal sample count.
    fn decode_bit(&self, low_polls: u32, high_polls: u32) -> bool {
        if low_polls == 0 {
            return high_polls > self.timing.threshold_polls();
        }
        u64::from(high_polls) * u64::from(BIT_LOW_US)
            > u64::from(self.timing.bit_one_threshold_us) * u64::from(low_polls)
    }

    fn read_raw(&mut self) -> Result<SensorFrame, PollTimeout> {
        self.start_signal();
        self.acknowledge()?;

        let mut bytes = [0u8; FRAME_LEN];
        for byte in bytes.iter_mut() {
            for _ in 0..8 {
                *byte = (*byte << 1) | u8::from(self.read_bit()?);
            }
        }
        Ok(SensorFrame::from_bytes(bytes))
    }
}

impl<P: FlexPin, D: DelayNs> HumiditySensor for Dht11<P, D> {
    fn read(&mut self) -> Result<SensorFrame, SensorError> {
        let frame = self.read_raw().map_err(|timeout| {
            #[cfg(feature = "defmt")]
            defmt::trace!("dht11: line timeout");
            SensorError::from(timeout)
        })?;

        frame.validate().map_err(|err| {
            #[cfg(feature = "defmt")]
            defmt::trace!("dht11: {}", err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hygromon_hal::gpio::Direction;
    use hygromon_hal::sim::{SensorScript, SimClock, SimDelay, SimSensorLine};
    use proptest::prelude::*;

    /// Delay whose polls take `num / den` of their nominal time
    struct SkewedDelay<'a> {
        inner: SimDelay<'a>,
        num: u32,
        den: u32,
    }

    impl DelayNs for SkewedDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            let skewed = u64::from(ns) * u64::from(self.num) / u64::from(self.den);
            self.inner.delay_ns(skewed as u32);
        }
    }

    /// Upper bound on samples for one transaction
    fn max_samples(timing: &SensorTiming) -> u32 {
        // Three acknowledgement waits plus two waits per bit
        (3 + 2 * 40) * timing.poll_ceiling
    }

    #[test]
    fn test_reads_valid_frame() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 68]));
        let mut dht = Dht11::new(line.pin(), clock.delay());

        let frame = dht.read().unwrap();
        assert_eq!(frame.as_bytes(), &[45, 0, 23, 0, 68]);
        assert_eq!(frame.reading().humidity_percent(), 45);
        assert_eq!(frame.reading().temperature_celsius(), 23);
    }

    #[test]
    fn test_start_pulse_and_release() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 68]));
        let mut dht = Dht11::new(line.pin(), clock.delay());

        dht.read().unwrap();

        assert_eq!(line.last_start_pulse_us(), Some(20_000));
        assert_eq!(line.releases(), 1);
        assert_eq!(line.direction(), Direction::Input);
    }

    #[test]
    fn test_checksum_mismatch() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 99]));
        let mut dht = Dht11::new(line.pin(), clock.delay());

        assert_eq!(
            dht.read(),
            Err(SensorError::ChecksumMismatch {
                expected: 68,
                received: 99
            })
        );
    }

    #[test]
    fn test_absent_sensor_times_out() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::silent());
        let mut dht = Dht11::new(line.pin(), clock.delay());

        assert_eq!(dht.read(), Err(SensorError::Timeout));
        // Gave up on the very first wait
        assert_eq!(line.samples(), SensorTiming::DEFAULT.poll_ceiling);
    }

    #[test]
    fn test_stuck_low_times_out() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::stuck_low());
        let mut dht = Dht11::new(line.pin(), clock.delay());

        assert_eq!(dht.read(), Err(SensorError::Timeout));
        assert!(line.samples() <= 2 * SensorTiming::DEFAULT.poll_ceiling);
    }

    #[test]
    fn test_slow_and_fast_polls_decode() {
        for (num, den) in [(2, 1), (3, 2), (1, 2)] {
            let clock = SimClock::new();
            let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 68]));
            let delay = SkewedDelay {
                inner: clock.delay(),
                num,
                den,
            };
            let mut dht = Dht11::new(line.pin(), delay);

            let frame = dht.read().unwrap();
            assert_eq!(frame.as_bytes(), &[45, 0, 23, 0, 68], "poll skew {}/{}", num, den);
        }
    }

    #[test]
    fn test_slow_polls_do_not_read_zeros() {
        // Decoding every long pulse as 0 would yield an all-zero frame,
        // which passes the checksum
        let bytes = [0x7F, 0x7F, 0x7F, 0x7F, 0xFC];
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::frame(bytes));
        let delay = SkewedDelay {
            inner: clock.delay(),
            num: 2,
            den: 1,
        };
        let mut dht = Dht11::new(line.pin(), delay);

        assert_eq!(dht.read().unwrap().as_bytes(), &bytes);
    }

    #[test]
    fn test_decode_scales_with_low_phase() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::silent());
        let dht = Dht11::new(line.pin(), clock.delay());

        // Nominal 1 us polls: 50 low, 26 or 70 high
        assert!(!dht.decode_bit(50, 26));
        assert!(dht.decode_bit(50, 70));
        // Polls running twice as long
        assert!(!dht.decode_bit(25, 13));
        assert!(dht.decode_bit(25, 35));
        // Unmeasured low phase uses the nominal threshold
        assert!(!dht.decode_bit(0, 40));
        assert!(dht.decode_bit(0, 41));
    }

    #[test]
    fn test_acknowledge_stuck_high_times_out() {
        let clock = SimClock::new();
        let script = SensorScript::acknowledge_only().with_idle(Level::High);
        let line = SimSensorLine::new(&clock, script);
        let mut dht = Dht11::new(line.pin(), clock.delay());

        assert_eq!(dht.read(), Err(SensorError::Timeout));
        assert!(line.samples() <= 3 * SensorTiming::DEFAULT.poll_ceiling);
    }

    #[test]
    fn test_bit_stuck_high_times_out() {
        let clock = SimClock::new();
        let script = SensorScript::truncated([45, 0, 23, 0, 68], 5).with_idle(Level::High);
        let line = SimSensorLine::new(&clock, script);
        let mut dht = Dht11::new(line.pin(), clock.delay());

        assert_eq!(dht.read(), Err(SensorError::Timeout));
        assert!(line.samples() <= max_samples(&SensorTiming::DEFAULT));
    }

    #[test]
    fn test_read_into() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::frame([50, 0, 20, 0, 70]));
        let mut dht = Dht11::new(line.pin(), clock.delay());

        let mut buf = [0u8; FRAME_LEN];
        assert!(dht.read_into(&mut buf));
        assert_eq!(buf, [50, 0, 20, 0, 70]);

        line.set_script(SensorScript::silent());
        assert!(!dht.read_into(&mut buf));
    }

    #[test]
    fn test_repeated_reads() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 68]));
        let mut dht = Dht11::new(line.pin(), clock.delay());

        for _ in 0..3 {
            assert!(dht.read().is_ok());
            clock.advance_ns(2_000_000_000);
        }
        assert_eq!(line.releases(), 3);
    }

    #[test]
    fn test_custom_start_pulse() {
        let clock = SimClock::new();
        let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 68]));
        let timing = SensorTiming {
            start_low_ms: 18,
            ..SensorTiming::DEFAULT
        };
        let mut dht = Dht11::with_timing(line.pin(), clock.delay(), timing);

        assert!(dht.read().is_ok());
        assert_eq!(line.last_start_pulse_us(), Some(18_000));
        assert_eq!(dht.timing().start_low_ms, 18);
    }

    proptest! {
        #[test]
        fn prop_read_ok_iff_checksum_matches(data in any::<[u8; 4]>(), checksum in any::<u8>()) {
            let bytes = [data[0], data[1], data[2], data[3], checksum];
            let clock = SimClock::new();
            let line = SimSensorLine::new(&clock, SensorScript::frame(bytes));
            let mut dht = Dht11::new(line.pin(), clock.delay());

            let sum = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
            match dht.read() {
                Ok(frame) => {
                    prop_assert_eq!(sum, checksum);
                    prop_assert_eq!(frame.as_bytes(), &bytes);
                }
                Err(err) => {
                    prop_assert_eq!(
                        err,
                        SensorError::ChecksumMismatch { expected: sum, received: checksum }
                    );
                }
            }
        }

        #[test]
        fn prop_truncated_transfer_is_bounded(bytes in any::<[u8; 5]>(), bits in 0usize..40) {
            let clock = SimClock::new();
            let line = SimSensorLine::new(&clock, SensorScript::truncated(bytes, bits));
            let mut dht = Dht11::new(line.pin(), clock.delay());

            prop_assert_eq!(dht.read(), Err(SensorError::Timeout));
            prop_assert!(line.samples() <= max_samples(&SensorTiming::DEFAULT));
        }

        #[test]
        fn prop_high_phase_never_ending_is_bounded(bytes in any::<[u8; 5]>(), bits in 0usize..40) {
            let clock = SimClock::new();
            let script = SensorScript::truncated(bytes, bits).with_idle(Level::High);
            let line = SimSensorLine::new(&clock, script);
            let mut dht = Dht11::new(line.pin(), clock.delay());

            prop_assert_eq!(dht.read(), Err(SensorError::Timeout));
            prop_assert!(line.samples() <= max_samples(&SensorTiming::DEFAULT));
        }
    }
}
