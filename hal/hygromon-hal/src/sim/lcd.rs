//! Simulated HD44780-class character display controller
//!
//! The controller watches its six input lines. Every falling edge of the
//! enable line latches the data lines; in 8-bit mode (the state after power
//! on) a latch is a whole byte whose low nibble is zero because D0-D3 are
//! not wired, in 4-bit mode two latches form one byte, high nibble first.
//!
//! Besides decoding, the controller checks the bus timing against the
//! datasheet minimums and records every violation.

use core::cell::RefCell;

use heapless::Vec;

use super::clock::SimClock;
use crate::gpio::OutputPin;

/// Minimum enable high time
pub const ENABLE_HIGH_MIN_NS: u64 = 1_000;
/// Minimum time between a falling edge and the next rising edge
pub const ENABLE_SETTLE_MIN_NS: u64 = 100_000;
/// Power-on time before the controller accepts the first latch
pub const POWER_ON_NS: u64 = 40_000_000;
/// Execution time of clear and return-home
pub const SLOW_COMMAND_NS: u64 = 1_520_000;
/// Execution time of every other instruction
pub const FAST_COMMAND_NS: u64 = 37_000;

/// Characters per DDRAM line
pub const LINE_LENGTH: usize = 40;

/// Capacity of the latch and transfer logs
pub const LOG_CAPACITY: usize = 512;

/// Controller input lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdLine {
    /// Register select (low = instruction, high = data)
    Rs,
    /// Enable strobe
    En,
    /// Data bit 4
    D4,
    /// Data bit 5
    D5,
    /// Data bit 6
    D6,
    /// Data bit 7
    D7,
}

impl LcdLine {
    const fn index(self) -> usize {
        match self {
            LcdLine::Rs => 0,
            LcdLine::En => 1,
            LcdLine::D4 => 2,
            LcdLine::D5 => 3,
            LcdLine::D6 => 4,
            LcdLine::D7 => 5,
        }
    }

    const fn is_data(self) -> bool {
        !matches!(self, LcdLine::Rs | LcdLine::En)
    }
}

/// Destination register of a latch or transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Instruction register (RS low)
    Command,
    /// Data register (RS high)
    Data,
}

/// One enable pulse as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latch {
    /// Register selected while latching
    pub register: Register,
    /// Value on D7..D4
    pub nibble: u8,
}

/// One complete byte accepted by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Destination register
    pub register: Register,
    /// Byte value
    pub value: u8,
}

/// Bus timing rule that was broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingViolation {
    /// Enable held high for less than the minimum
    PulseTooShort { high_ns: u64 },
    /// Enable raised again too soon after the previous latch
    SettleTooShort { low_ns: u64 },
    /// A data line changed while enable was high
    DataChangedWhileEnabled,
    /// A latch arrived while the previous instruction was still executing
    ControllerBusy { early_ns: u64 },
    /// A latch arrived before the power-on time elapsed
    PowerOnTooEarly { at_ns: u64 },
}

#[derive(Debug)]
struct ControllerState {
    lines: [bool; 6],
    four_bit: bool,
    two_line: bool,
    display_on: bool,
    increment: bool,
    pending_high: Option<u8>,
    ddram: [[u8; LINE_LENGTH]; 2],
    /// DDRAM address counter
    address: u8,
    en_rise_ns: Option<u64>,
    last_fall_ns: Option<u64>,
    busy_until_ns: u64,
    latches: Vec<Latch, LOG_CAPACITY>,
    transfers: Vec<Transfer, LOG_CAPACITY>,
    violations: Vec<TimingViolation, 16>,
    pulse_count: u32,
}

impl ControllerState {
    fn power_on() -> Self {
        Self {
            lines: [false; 6],
            four_bit: false,
            two_line: false,
            display_on: false,
            increment: true,
            pending_high: None,
            // Power-on DDRAM content is undefined; blanks keep tests readable
            ddram: [[b' '; LINE_LENGTH]; 2],
            address: 0,
            en_rise_ns: None,
            last_fall_ns: None,
            busy_until_ns: 0,
            latches: Vec::new(),
            transfers: Vec::new(),
            violations: Vec::new(),
            pulse_count: 0,
        }
    }

    fn violation(&mut self, violation: TimingViolation) {
        let _ = self.violations.push(violation);
    }

    fn data_nibble(&self) -> u8 {
        let mut nibble = 0;
        for (bit, line) in [LcdLine::D4, LcdLine::D5, LcdLine::D6, LcdLine::D7]
            .iter()
            .enumerate()
        {
            if self.lines[line.index()] {
                nibble |= 1 << bit;
            }
        }
        nibble
    }

    fn rising_edge(&mut self, now: u64) {
        if let Some(fall) = self.last_fall_ns {
            let low_ns = now - fall;
            if low_ns < ENABLE_SETTLE_MIN_NS {
                self.violation(TimingViolation::SettleTooShort { low_ns });
            }
        }
        self.en_rise_ns = Some(now);
    }

    fn falling_edge(&mut self, now: u64) {
        if let Some(rise) = self.en_rise_ns.take() {
            let high_ns = now - rise;
            if high_ns < ENABLE_HIGH_MIN_NS {
                self.violation(TimingViolation::PulseTooShort { high_ns });
            }
        }
        if now < POWER_ON_NS {
            self.violation(TimingViolation::PowerOnTooEarly { at_ns: now });
        }
        if now < self.busy_until_ns {
            let early_ns = self.busy_until_ns - now;
            self.violation(TimingViolation::ControllerBusy { early_ns });
        }
        self.last_fall_ns = Some(now);
        self.pulse_count += 1;
        self.latch(now);
    }

    fn latch(&mut self, now: u64) {
        let register = if self.lines[LcdLine::Rs.index()] {
            Register::Data
        } else {
            Register::Command
        };
        let nibble = self.data_nibble();
        let _ = self.latches.push(Latch { register, nibble });

        if !self.four_bit {
            // D0-D3 are not wired: a single latch is a full byte
            self.accept(register, nibble << 4, now);
            return;
        }

        match self.pending_high.take() {
            None => self.pending_high = Some(nibble),
            Some(high) => self.accept(register, (high << 4) | nibble, now),
        }
    }

    fn accept(&mut self, register: Register, value: u8, now: u64) {
        let _ = self.transfers.push(Transfer { register, value });
        match register {
            Register::Command => self.execute(value, now),
            Register::Data => {
                self.write_ddram(value);
                self.busy_until_ns = now + FAST_COMMAND_NS;
            }
        }
    }

    fn execute(&mut self, command: u8, now: u64) {
        let mut duration = FAST_COMMAND_NS;
        if command & 0x80 != 0 {
            self.address = command & 0x7F;
        } else if command & 0x40 != 0 {
            // CGRAM address, not modelled
        } else if command & 0x20 != 0 {
            self.four_bit = command & 0x10 == 0;
            self.two_line = command & 0x08 != 0;
            if !self.four_bit {
                self.pending_high = None;
            }
        } else if command & 0x10 != 0 {
            // Cursor/display shift, not modelled
        } else if command & 0x08 != 0 {
            self.display_on = command & 0x04 != 0;
        } else if command & 0x04 != 0 {
            self.increment = command & 0x02 != 0;
        } else if command & 0x02 != 0 {
            self.address = 0;
            duration = SLOW_COMMAND_NS;
        } else if command & 0x01 != 0 {
            self.ddram = [[b' '; LINE_LENGTH]; 2];
            self.address = 0;
            self.increment = true;
            duration = SLOW_COMMAND_NS;
        }
        self.busy_until_ns = now + duration;
    }

    fn write_ddram(&mut self, value: u8) {
        let (row, col) = Self::locate(self.address);
        self.ddram[row][col] = value;
        self.address = if self.increment {
            match self.address {
                0x27 => 0x40,
                0x67 => 0x00,
                a => a + 1,
            }
        } else {
            match self.address {
                0x00 => 0x67,
                0x40 => 0x27,
                a => a - 1,
            }
        };
    }

    /// Map an address onto (row, column); out-of-range addresses fold
    /// into the nearest line the way a two-line controller wraps them
    fn locate(address: u8) -> (usize, usize) {
        let row = usize::from(address >= 0x40);
        let col = usize::from(address & 0x3F) % LINE_LENGTH;
        (row, col)
    }
}

/// Simulated display controller
#[derive(Debug)]
pub struct SimLcd<'a> {
    clock: &'a SimClock,
    state: RefCell<ControllerState>,
}

impl<'a> SimLcd<'a> {
    /// Controller freshly powered on at the current clock time
    pub fn new(clock: &'a SimClock) -> Self {
        Self {
            clock,
            state: RefCell::new(ControllerState::power_on()),
        }
    }

    /// Host-side pin driving one controller line
    pub fn pin(&'a self, line: LcdLine) -> SimLcdPin<'a> {
        SimLcdPin { lcd: self, line }
    }

    fn drive(&self, line: LcdLine, high: bool) {
        let now = self.clock.now_ns();
        let mut state = self.state.borrow_mut();
        let index = line.index();
        let was_high = state.lines[index];
        state.lines[index] = high;

        if line == LcdLine::En {
            match (was_high, high) {
                (false, true) => state.rising_edge(now),
                (true, false) => state.falling_edge(now),
                _ => {}
            }
        } else if line.is_data() && was_high != high && state.lines[LcdLine::En.index()] {
            state.violation(TimingViolation::DataChangedWhileEnabled);
        }
    }

    fn line(&self, line: LcdLine) -> bool {
        self.state.borrow().lines[line.index()]
    }

    /// The 16 visible characters of `row`
    pub fn visible_row(&self, row: usize) -> [u8; 16] {
        let state = self.state.borrow();
        let mut out = [b' '; 16];
        out.copy_from_slice(&state.ddram[row.min(1)][..16]);
        out
    }

    /// Current DDRAM address counter
    pub fn address(&self) -> u8 {
        self.state.borrow().address
    }

    /// Controller is in 4-bit interface mode
    pub fn is_four_bit(&self) -> bool {
        self.state.borrow().four_bit
    }

    /// Controller is configured for two display lines
    pub fn is_two_line(&self) -> bool {
        self.state.borrow().two_line
    }

    /// Display output is enabled
    pub fn is_display_on(&self) -> bool {
        self.state.borrow().display_on
    }

    /// A high nibble has been latched and its low nibble is outstanding
    pub fn has_pending_nibble(&self) -> bool {
        self.state.borrow().pending_high.is_some()
    }

    /// Total enable pulses seen
    pub fn pulse_count(&self) -> u32 {
        self.state.borrow().pulse_count
    }

    /// Latches recorded since the last [`SimLcd::clear_log`]
    pub fn latches(&self) -> Vec<Latch, LOG_CAPACITY> {
        self.state.borrow().latches.clone()
    }

    /// Bytes accepted since the last [`SimLcd::clear_log`]
    pub fn transfers(&self) -> Vec<Transfer, LOG_CAPACITY> {
        self.state.borrow().transfers.clone()
    }

    /// Timing violations recorded since power on
    pub fn violations(&self) -> Vec<TimingViolation, 16> {
        self.state.borrow().violations.clone()
    }

    /// Forget recorded latches and transfers (display content is kept)
    pub fn clear_log(&self) {
        let mut state = self.state.borrow_mut();
        state.latches.clear();
        state.transfers.clear();
    }
}

/// Host pin wired to one [`SimLcd`] line
#[derive(Debug, Clone, Copy)]
pub struct SimLcdPin<'a> {
    lcd: &'a SimLcd<'a>,
    line: LcdLine,
}

impl OutputPin for SimLcdPin<'_> {
    fn set_high(&mut self) {
        self.lcd.drive(self.line, true);
    }

    fn set_low(&mut self) {
        self.lcd.drive(self.line, false);
    }

    fn is_set_high(&self) -> bool {
        self.lcd.line(self.line)
    }
}
