//! Polling control loop
//!
//! One [`Monitor::step`] is one iteration of the firmware's forever loop:
//! toggle the heartbeat indicator, read the sensor, and on success write
//! both rows of the display. A failed read leaves the display untouched;
//! the next iteration is the retry. Pacing between steps is the caller's
//! job (the sensor needs at least a second between reads).

use core::fmt::Write;

use heapless::String;

use crate::frame::Reading;
use crate::traits::{CharacterDisplay, HumiditySensor, SensorError, StatusIndicator};

/// Row 0 label
pub const HUMIDITY_LABEL: &str = "HUMIDITY    :";

/// Row 1 label
pub const TEMPERATURE_LABEL: &str = "TEMPERATURE :";

/// Columns reserved after a label for the value
pub const VALUE_WIDTH: usize = 3;

/// Shown on row 0 until the first good read
pub const SPLASH_TEXT: &str = "Reading sensor..";

/// Capacity of a formatted value (fits "-128")
const VALUE_CAPACITY: usize = 8;

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    /// Read succeeded and the display was rewritten
    Updated(Reading),
    /// Read failed; display left as it was
    Skipped(SensorError),
}

/// Loop counters, for logging only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorStats {
    /// Iterations run
    pub iterations: u32,
    /// Reads that produced a valid frame
    pub good_reads: u32,
    /// Reads that timed out or failed the checksum
    pub failed_reads: u32,
    /// Failed reads since the last good one
    pub consecutive_failures: u16,
}

/// Right-align a whole number in [`VALUE_WIDTH`] columns
///
/// Values wider than the field are written in full.
pub fn format_value(value: i16) -> String<VALUE_CAPACITY> {
    let mut text = String::new();
    // Capacity covers every i16, so the write cannot fail
    let _ = write!(text, "{:>width$}", value, width = VALUE_WIDTH);
    text
}

/// Control loop state: owns the sensor, the display and the indicator
pub struct Monitor<S, D, I> {
    sensor: S,
    display: D,
    indicator: I,
    stats: MonitorStats,
    last_reading: Option<Reading>,
}

impl<S, D, I> Monitor<S, D, I>
where
    S: HumiditySensor,
    D: CharacterDisplay,
    I: StatusIndicator,
{
    /// Take ownership of the peripherals
    ///
    /// The display must already be initialized.
    pub fn new(sensor: S, display: D, indicator: I) -> Self {
        Self {
            sensor,
            display,
            indicator,
            stats: MonitorStats::default(),
            last_reading: None,
        }
    }

    /// Blank the display and show the start-up line
    pub fn show_splash(&mut self) {
        self.display.clear();
        self.display.print_at(0, 0, SPLASH_TEXT);
    }

    /// Run one loop iteration
    pub fn step(&mut self) -> StepOutcome {
        self.indicator.toggle();
        self.stats.iterations = self.stats.iterations.wrapping_add(1);

        match self.sensor.read_reading() {
            Ok(reading) => {
                self.stats.good_reads = self.stats.good_reads.wrapping_add(1);
                self.stats.consecutive_failures = 0;
                self.render(&reading);
                self.last_reading = Some(reading);
                StepOutcome::Updated(reading)
            }
            Err(err) => {
                self.stats.failed_reads = self.stats.failed_reads.wrapping_add(1);
                self.stats.consecutive_failures =
                    self.stats.consecutive_failures.saturating_add(1);
                StepOutcome::Skipped(err)
            }
        }
    }

    fn render(&mut self, reading: &Reading) {
        // Humidity never exceeds u8 range, so it fits i16
        let humidity = reading.humidity_percent() as i16;

        self.display.print_at(0, 0, HUMIDITY_LABEL);
        self.display.print(&format_value(humidity));

        self.display.print_at(0, 1, TEMPERATURE_LABEL);
        self.display.print(&format_value(reading.temperature_celsius()));
    }

    /// Loop counters
    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Most recent good reading, if any
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// Indicator state
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Display driver
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Release the peripherals
    pub fn into_parts(self) -> (S, D, I) {
        (self.sensor, self.display, self.indicator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SensorFrame;
    use std::collections::VecDeque;
    use std::string::String as StdString;
    use std::vec::Vec;

    struct MockSensor {
        results: VecDeque<Result<SensorFrame, SensorError>>,
    }

    impl MockSensor {
        fn new(results: &[Result<[u8; 5], SensorError>]) -> Self {
            Self {
                results: results
                    .iter()
                    .map(|r| r.map(SensorFrame::from_bytes))
                    .collect(),
            }
        }
    }

    impl HumiditySensor for MockSensor {
        fn read(&mut self) -> Result<SensorFrame, SensorError> {
            self.results
                .pop_front()
                .unwrap_or(Err(SensorError::Timeout))
                .and_then(SensorFrame::validate)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Clear,
        Cursor(u8, u8),
        ClearRow(u8),
        Print(StdString),
    }

    #[derive(Default)]
    struct MockDisplay {
        ops: Vec<Op>,
    }

    impl CharacterDisplay for MockDisplay {
        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }

        fn set_cursor(&mut self, col: u8, row: u8) {
            self.ops.push(Op::Cursor(col, row));
        }

        fn clear_row(&mut self, row: u8) {
            self.ops.push(Op::ClearRow(row));
        }

        fn print(&mut self, text: &str) {
            self.ops.push(Op::Print(text.into()));
        }
    }

    #[derive(Default)]
    struct MockIndicator {
        lit: bool,
        toggles: u32,
    }

    impl StatusIndicator for MockIndicator {
        fn toggle(&mut self) {
            self.lit = !self.lit;
            self.toggles += 1;
        }

        fn is_lit(&self) -> bool {
            self.lit
        }
    }

    fn monitor(
        results: &[Result<[u8; 5], SensorError>],
    ) -> Monitor<MockSensor, MockDisplay, MockIndicator> {
        Monitor::new(
            MockSensor::new(results),
            MockDisplay::default(),
            MockIndicator::default(),
        )
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(45).as_str(), " 45");
        assert_eq!(format_value(7).as_str(), "  7");
        assert_eq!(format_value(100).as_str(), "100");
        assert_eq!(format_value(-5).as_str(), " -5");
        assert_eq!(format_value(-128).as_str(), "-128");
        assert_eq!(format_value(0).as_str(), "  0");
    }

    #[test]
    fn test_labels_fill_row() {
        assert_eq!(HUMIDITY_LABEL.len() + VALUE_WIDTH, 16);
        assert_eq!(TEMPERATURE_LABEL.len() + VALUE_WIDTH, 16);
        assert_eq!(SPLASH_TEXT.len(), 16);
    }

    #[test]
    fn test_good_read_renders_both_rows() {
        let mut monitor = monitor(&[Ok([45, 0, 23, 0, 68])]);

        let outcome = monitor.step();
        let reading = SensorFrame::from_bytes([45, 0, 23, 0, 68]).reading();
        assert_eq!(outcome, StepOutcome::Updated(reading));

        assert_eq!(
            monitor.display().ops,
            [
                Op::Cursor(0, 0),
                Op::Print(HUMIDITY_LABEL.into()),
                Op::Print(" 45".into()),
                Op::Cursor(0, 1),
                Op::Print(TEMPERATURE_LABEL.into()),
                Op::Print(" 23".into()),
            ]
        );
        assert_eq!(monitor.last_reading(), Some(reading));
    }

    #[test]
    fn test_checksum_failure_leaves_display() {
        let mut monitor = monitor(&[Ok([45, 0, 23, 0, 99])]);

        let outcome = monitor.step();
        assert_eq!(
            outcome,
            StepOutcome::Skipped(SensorError::ChecksumMismatch {
                expected: 68,
                received: 99
            })
        );
        assert!(monitor.display().ops.is_empty());
        assert!(monitor.indicator().is_lit());
    }

    #[test]
    fn test_timeout_leaves_display() {
        let mut monitor = monitor(&[Err(SensorError::Timeout)]);

        assert_eq!(monitor.step(), StepOutcome::Skipped(SensorError::Timeout));
        assert!(monitor.display().ops.is_empty());
    }

    #[test]
    fn test_indicator_toggles_every_step() {
        let mut monitor = monitor(&[
            Ok([45, 0, 23, 0, 68]),
            Err(SensorError::Timeout),
            Ok([50, 0, 20, 0, 70]),
        ]);

        for _ in 0..3 {
            monitor.step();
        }

        let (_, _, indicator) = monitor.into_parts();
        assert_eq!(indicator.toggles, 3);
        assert!(indicator.is_lit());
    }

    #[test]
    fn test_stats() {
        let mut monitor = monitor(&[
            Err(SensorError::Timeout),
            Ok([45, 0, 23, 0, 99]),
            Ok([45, 0, 23, 0, 68]),
            Err(SensorError::Timeout),
        ]);

        monitor.step();
        monitor.step();
        assert_eq!(monitor.stats().consecutive_failures, 2);

        monitor.step();
        assert_eq!(monitor.stats().consecutive_failures, 0);

        monitor.step();
        assert_eq!(
            monitor.stats(),
            MonitorStats {
                iterations: 4,
                good_reads: 1,
                failed_reads: 3,
                consecutive_failures: 1,
            }
        );
        // Last good reading survives a later failure
        assert_eq!(monitor.last_reading().map(|r| r.humidity_percent()), Some(45));
    }

    #[test]
    fn test_negative_temperature_rendered() {
        // -2.3 C: fraction byte 0x83, checksum 30 + 2 + 0x83 = 0xA3
        let mut monitor = monitor(&[Ok([30, 0, 2, 0x83, 0xA3])]);

        monitor.step();
        assert_eq!(
            monitor.display().ops.last(),
            Some(&Op::Print(" -2".into()))
        );
    }

    #[test]
    fn test_splash() {
        let mut monitor = monitor(&[]);
        monitor.show_splash();

        assert_eq!(
            monitor.display().ops,
            [Op::Clear, Op::Cursor(0, 0), Op::Print(SPLASH_TEXT.into())]
        );
    }
}
