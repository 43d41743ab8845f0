//! Hygromon - Humidity/Temperature Monitor Firmware
//!
//! Main firmware binary for RP2040-based boards. Reads a DHT11 sensor
//! every sample interval and shows humidity and temperature on a 16x2
//! HD44780 display, blinking an LED once per iteration.
//!
//! Everything runs in one polling loop on the main stack: no executor, no
//! interrupts, no heap. Sensor and display timing is busy-waited with
//! `embassy_time::Delay`.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;
use {defmt_rtt as _, panic_probe as _};

use hygromon_core::monitor::{Monitor, StepOutcome};
use hygromon_drivers::{Dht11, GpioIndicator, Hd44780};
use hygromon_hal_rp2040::PinBank;

mod board;

use crate::board::{Hardware, BOARD};

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Hygromon firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    let mut bank = PinBank::new(p);

    let hw = match Hardware::take(&mut bank, &BOARD.pins) {
        Ok(hw) => hw,
        Err(e) => defmt::panic!("Board pin setup failed: {}", e),
    };
    info!(
        "Pins: sensor=GPIO{} led=GPIO{} lcd rs={} en={}",
        BOARD.pins.sensor, BOARD.pins.indicator, BOARD.pins.lcd_rs, BOARD.pins.lcd_en
    );

    let mut display = Hd44780::with_timing(hw.lcd, Delay, BOARD.lcd);
    display.initialize();
    info!("Display initialized");

    let sensor = Dht11::with_timing(hw.sensor, Delay, BOARD.sensor);
    let indicator = GpioIndicator::new_active_high(hw.indicator);

    let mut monitor = Monitor::new(sensor, display, indicator);
    monitor.show_splash();

    let interval_ms = BOARD.monitor.sample_interval_ms;
    let warn_after = BOARD.monitor.failure_warn_threshold.max(1);
    let mut delay = Delay;

    // The sensor ignores start signals for about a second after power up
    delay.delay_ms(interval_ms);
    info!("Sampling every {} ms", interval_ms);

    loop {
        match monitor.step() {
            StepOutcome::Updated(reading) => {
                debug!(
                    "RH {}.{}% T {}C",
                    reading.humidity_x10 / 10,
                    reading.humidity_x10 % 10,
                    reading.temperature_x10 / 10
                );
            }
            StepOutcome::Skipped(err) => {
                let stats = monitor.stats();
                if stats.consecutive_failures % warn_after == 0 {
                    warn!(
                        "Sensor read failed {} times in a row: {} ({} ok / {} failed total)",
                        stats.consecutive_failures, err, stats.good_reads, stats.failed_reads
                    );
                } else {
                    debug!("Sensor read failed: {}", err);
                }
            }
        }

        delay.delay_ms(interval_ms);
    }
}
