//! Simulated single-wire humidity/temperature sensor
//!
//! The line is modelled as open drain with a pull-up. While the host drives
//! it as an output, the host level wins. Once the host releases it (switches
//! to input), the line follows a scripted waveform that starts at the
//! release instant. Every release restarts the script, so one script
//! answers any number of reads.

use core::cell::RefCell;

use heapless::Vec;

use super::clock::SimClock;
use crate::gpio::{Direction, FlexPin, InputPin, Level, OutputPin};

/// Pull-up time between host release and the sensor pulling low
pub const RESPONSE_DELAY_NS: u32 = 30_000;
/// Sensor acknowledgement low phase
pub const RESPONSE_LOW_NS: u32 = 80_000;
/// Sensor acknowledgement high phase
pub const RESPONSE_HIGH_NS: u32 = 80_000;
/// Low phase preceding every data bit
pub const BIT_LOW_NS: u32 = 50_000;
/// High phase encoding a 0 bit
pub const BIT_ZERO_HIGH_NS: u32 = 26_000;
/// High phase encoding a 1 bit
pub const BIT_ONE_HIGH_NS: u32 = 70_000;
/// Final low phase after the last bit
pub const END_LOW_NS: u32 = 50_000;

/// Enough room for the acknowledgement, 40 bits and the trailer
pub const MAX_SEGMENTS: usize = 96;

/// One constant-level stretch of the waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Line level during the segment
    pub level: Level,
    /// Segment length in nanoseconds
    pub duration_ns: u32,
}

/// Waveform the sensor plays after each host release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorScript {
    segments: Vec<Segment, MAX_SEGMENTS>,
    /// Level held forever once the segments run out
    idle: Level,
}

impl SensorScript {
    /// Sensor absent: the pull-up keeps the line high
    pub fn silent() -> Self {
        Self {
            segments: Vec::new(),
            idle: Level::High,
        }
    }

    /// Line shorted low (or a sensor hung mid-acknowledgement)
    pub fn stuck_low() -> Self {
        let mut script = Self::silent();
        script.push(Level::High, RESPONSE_DELAY_NS);
        script.idle = Level::Low;
        script
    }

    /// A complete, well-timed transmission of `bytes`
    pub fn frame(bytes: [u8; 5]) -> Self {
        Self::truncated(bytes, 40)
    }

    /// A transmission that stops after `bits` data bits
    ///
    /// After the last transmitted bit the sensor holds the line low forever,
    /// so the next expected transition never happens.
    pub fn truncated(bytes: [u8; 5], bits: usize) -> Self {
        let mut script = Self::acknowledge_only();
        let bits = bits.min(40);

        for index in 0..bits {
            let byte = bytes[index / 8];
            let bit = (byte >> (7 - (index % 8))) & 1 == 1;
            script.push(Level::Low, BIT_LOW_NS);
            script.push(
                Level::High,
                if bit { BIT_ONE_HIGH_NS } else { BIT_ZERO_HIGH_NS },
            );
        }

        if bits == 40 {
            script.push(Level::Low, END_LOW_NS);
            script.idle = Level::High;
        } else {
            script.idle = Level::Low;
        }
        script
    }

    /// Acknowledgement (low, high) then the line stays low
    pub fn acknowledge_only() -> Self {
        let mut script = Self::silent();
        script.push(Level::High, RESPONSE_DELAY_NS);
        script.push(Level::Low, RESPONSE_LOW_NS);
        script.push(Level::High, RESPONSE_HIGH_NS);
        script.idle = Level::Low;
        script
    }

    /// Append a segment; silently ignored once the script is full
    pub fn push(&mut self, level: Level, duration_ns: u32) {
        let _ = self.segments.push(Segment { level, duration_ns });
    }

    /// Set the level held after the last segment
    pub fn with_idle(mut self, idle: Level) -> Self {
        self.idle = idle;
        self
    }

    /// Scripted segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Line level `elapsed_ns` after the host released the line
    pub fn level_at(&self, elapsed_ns: u64) -> Level {
        let mut start = 0u64;
        for segment in &self.segments {
            let end = start + u64::from(segment.duration_ns);
            if elapsed_ns < end {
                return segment.level;
            }
            start = end;
        }
        self.idle
    }
}

#[derive(Debug)]
struct LineState {
    script: SensorScript,
    direction: Direction,
    /// Host output latch
    driven: Level,
    released_at_ns: Option<u64>,
    low_since_ns: Option<u64>,
    last_start_pulse_ns: Option<u64>,
    samples: u32,
    releases: u32,
}

/// Simulated sensor data line
#[derive(Debug)]
pub struct SimSensorLine<'a> {
    clock: &'a SimClock,
    state: RefCell<LineState>,
}

impl<'a> SimSensorLine<'a> {
    /// Create an idle line (input, pulled up) playing `script` on release
    pub fn new(clock: &'a SimClock, script: SensorScript) -> Self {
        Self {
            clock,
            state: RefCell::new(LineState {
                script,
                direction: Direction::Input,
                driven: Level::High,
                released_at_ns: None,
                low_since_ns: None,
                last_start_pulse_ns: None,
                samples: 0,
                releases: 0,
            }),
        }
    }

    /// Host-side pin bound to this line
    pub fn pin(&'a self) -> SimSensorPin<'a> {
        SimSensorPin { line: self }
    }

    /// Replace the waveform played on the next release
    pub fn set_script(&self, script: SensorScript) {
        self.state.borrow_mut().script = script;
    }

    /// Length of the last host start pulse in microseconds
    pub fn last_start_pulse_us(&self) -> Option<u64> {
        self.state.borrow().last_start_pulse_ns.map(|ns| ns / 1_000)
    }

    /// Number of times the host sampled the line
    pub fn samples(&self) -> u32 {
        self.state.borrow().samples
    }

    /// Number of times the host released the line after driving it
    pub fn releases(&self) -> u32 {
        self.state.borrow().releases
    }

    /// Current host pin direction
    pub fn direction(&self) -> Direction {
        self.state.borrow().direction
    }

    /// Level currently present on the wire
    pub fn level(&self) -> Level {
        let state = self.state.borrow();
        match state.direction {
            Direction::Output => state.driven,
            Direction::Input => match state.released_at_ns {
                Some(at) => state
                    .script
                    .level_at(self.clock.now_ns().saturating_sub(at)),
                None => Level::High,
            },
        }
    }
}

/// Host pin attached to a [`SimSensorLine`]
#[derive(Debug, Clone, Copy)]
pub struct SimSensorPin<'a> {
    line: &'a SimSensorLine<'a>,
}

impl OutputPin for SimSensorPin<'_> {
    fn set_high(&mut self) {
        let mut state = self.line.state.borrow_mut();
        state.driven = Level::High;
        if state.direction == Direction::Output {
            state.low_since_ns = None;
        }
    }

    fn set_low(&mut self) {
        let now = self.line.clock.now_ns();
        let mut state = self.line.state.borrow_mut();
        state.driven = Level::Low;
        if state.direction == Direction::Output && state.low_since_ns.is_none() {
            state.low_since_ns = Some(now);
        }
    }

    fn is_set_high(&self) -> bool {
        self.line.state.borrow().driven == Level::High
    }
}

impl InputPin for SimSensorPin<'_> {
    fn is_high(&self) -> bool {
        let level = self.line.level();
        self.line.state.borrow_mut().samples += 1;
        level == Level::High
    }
}

impl FlexPin for SimSensorPin<'_> {
    fn set_as_output(&mut self) {
        let now = self.line.clock.now_ns();
        let mut state = self.line.state.borrow_mut();
        state.direction = Direction::Output;
        state.released_at_ns = None;
        state.low_since_ns = match state.driven {
            Level::Low => Some(now),
            Level::High => None,
        };
    }

    fn set_as_input(&mut self) {
        let now = self.line.clock.now_ns();
        let mut state = self.line.state.borrow_mut();
        if state.direction == Direction::Output {
            if let Some(since) = state.low_since_ns.take() {
                state.last_start_pulse_ns = Some(now - since);
            }
            state.releases += 1;
            state.released_at_ns = Some(now);
        }
        state.direction = Direction::Input;
    }

    fn direction(&self) -> Direction {
        self.line.state.borrow().direction
    }
}
