//! HD44780 character display driver (4-bit parallel bus)
//!
//! Driver for 16x2 HD44780-compatible modules with only D4-D7 wired.
//! Every byte goes out as two nibbles, high nibble first, each latched by
//! one falling edge of EN. RS selects the instruction (low) or data (high)
//! register. R/W is tied low, so the busy flag is never read and every
//! instruction is followed by a fixed settle delay instead.

use embedded_hal::delay::DelayNs;
use hygromon_core::config::LcdTiming;
use hygromon_core::traits::{CharacterDisplay, DisplayCursor, DISPLAY_COLS};
use hygromon_hal::gpio::{Level, OutputPin};

/// HD44780 instructions and flags
pub mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const ENTRY_INCREMENT: u8 = 0x02;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const FUNCTION_8BIT: u8 = 0x10;
    pub const FUNCTION_2LINE: u8 = 0x08;
    pub const SET_DDRAM_ADDR: u8 = 0x80;
}

/// Nibble sent three times to force 8-bit mode from any state
const BRING_UP_NIBBLE: u8 = (cmd::FUNCTION_SET | cmd::FUNCTION_8BIT) >> 4;

/// Nibble that switches the interface to 4 bits
const FOUR_BIT_NIBBLE: u8 = cmd::FUNCTION_SET >> 4;

/// 4-bit bus, 2 lines, 5x8 font
const FUNCTION_4BIT_2LINE: u8 = cmd::FUNCTION_SET | cmd::FUNCTION_2LINE;

/// Display on, cursor and blink off
const DISPLAY_ON_CURSOR_OFF: u8 = cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON;

/// Cursor moves right, no display shift
const ENTRY_LEFT_TO_RIGHT: u8 = cmd::ENTRY_MODE_SET | cmd::ENTRY_INCREMENT;

/// Control and data lines
pub struct LcdPins<P> {
    /// Register select
    pub rs: P,
    /// Enable strobe
    pub en: P,
    /// D4, D5, D6, D7
    pub data: [P; 4],
}

/// HD44780 driver
pub struct Hd44780<P, D> {
    pins: LcdPins<P>,
    delay: D,
    timing: LcdTiming,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Create a driver with datasheet timing
    ///
    /// The display is unusable until [`Hd44780::initialize`] has run.
    pub fn new(pins: LcdPins<P>, delay: D) -> Self {
        Self::with_timing(pins, delay, LcdTiming::DEFAULT)
    }

    /// Create a driver with custom timing
    pub fn with_timing(pins: LcdPins<P>, delay: D, timing: LcdTiming) -> Self {
        Self {
            pins,
            delay,
            timing,
        }
    }

    /// Active timing
    pub fn timing(&self) -> &LcdTiming {
        &self.timing
    }

    /// Release the pins and delay provider
    pub fn release(self) -> (LcdPins<P>, D) {
        (self.pins, self.delay)
    }

    /// Run the 4-bit bring-up sequence and clear the screen
    ///
    /// Safe to call again at any time; the 8-bit resync at the start
    /// recovers the controller from any half-written byte.
    pub fn initialize(&mut self) {
        self.pins.en.set_low();
        self.pins.rs.set_low();
        for pin in self.pins.data.iter_mut() {
            pin.set_low();
        }
        self.delay.delay_ms(self.timing.power_on_ms);

        let settles = self.timing.function_set_settle_us;
        for settle_us in settles {
            self.write_nibble(BRING_UP_NIBBLE);
            self.delay.delay_us(settle_us);
        }

        self.write_nibble(FOUR_BIT_NIBBLE);
        self.delay.delay_us(self.timing.mode_select_settle_us);

        self.write_command(FUNCTION_4BIT_2LINE);
        self.write_command(DISPLAY_ON_CURSOR_OFF);
        self.write_command(ENTRY_LEFT_TO_RIGHT);
        self.clear();
    }

    /// Send one instruction byte
    pub fn write_command(&mut self, command: u8) {
        self.write_byte(Level::Low, command);
    }

    /// Send one data byte (a character code at the cursor)
    pub fn write_data(&mut self, data: u8) {
        self.write_byte(Level::High, data);
    }

    fn write_byte(&mut self, rs: Level, value: u8) {
        self.pins.rs.set_level(rs);
        self.write_nibble(value >> 4);
        self.write_nibble(value & 0x0F);
    }

    /// Put a nibble on D4-D7 and latch it with one enable pulse
    pub fn write_nibble(&mut self, nibble: u8) {
        for (bit, pin) in self.pins.data.iter_mut().enumerate() {
            pin.set_level(Level::from_bit(nibble & (1 << bit) != 0));
        }
        self.pulse_enable();
    }

    fn pulse_enable(&mut self) {
        self.pins.en.set_low();
        self.delay.delay_us(self.timing.enable_setup_us);
        self.pins.en.set_high();
        self.delay.delay_us(self.timing.enable_high_us);
        self.pins.en.set_low();
        self.delay.delay_us(self.timing.enable_settle_us);
    }
}

impl<P: OutputPin, D: DelayNs> CharacterDisplay for Hd44780<P, D> {
    fn clear(&mut self) {
        self.write_command(cmd::CLEAR_DISPLAY);
        self.delay.delay_us(self.timing.clear_settle_us);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        let address = DisplayCursor::new(col, row).ddram_address();
        self.write_command(cmd::SET_DDRAM_ADDR | address);
    }

    fn clear_row(&mut self, row: u8) {
        self.set_cursor(0, row);
        for _ in 0..DISPLAY_COLS {
            self.write_data(b' ');
        }
        self.set_cursor(0, row);
    }

    fn print(&mut self, text: &str) {
        for byte in text.bytes() {
            self.write_data(byte);
        }
    }
}
