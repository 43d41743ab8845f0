//! End-to-end loop tests: real drivers against the simulated sensor line,
//! display controller and LED sharing one clock.

use hygromon_core::monitor::{Monitor, StepOutcome, SPLASH_TEXT};
use hygromon_core::traits::{SensorError, StatusIndicator};
use hygromon_drivers::{Dht11, GpioIndicator, Hd44780, LcdPins};
use hygromon_hal::sim::{
    LcdLine, SensorScript, SimClock, SimDelay, SimLcd, SimLcdPin, SimOutput, SimOutputPin,
    SimSensorLine, SimSensorPin,
};

type SimMonitor<'a> = Monitor<
    Dht11<SimSensorPin<'a>, SimDelay<'a>>,
    Hd44780<SimLcdPin<'a>, SimDelay<'a>>,
    GpioIndicator<SimOutputPin<'a>>,
>;

const SAMPLE_INTERVAL_NS: u64 = 2_000_000_000;

fn build<'a>(
    clock: &'a SimClock,
    line: &'a SimSensorLine<'a>,
    lcd: &'a SimLcd<'a>,
    led: &'a SimOutput,
) -> SimMonitor<'a> {
    let mut display = Hd44780::new(
        LcdPins {
            rs: lcd.pin(LcdLine::Rs),
            en: lcd.pin(LcdLine::En),
            data: [
                lcd.pin(LcdLine::D4),
                lcd.pin(LcdLine::D5),
                lcd.pin(LcdLine::D6),
                lcd.pin(LcdLine::D7),
            ],
        },
        clock.delay(),
    );
    display.initialize();

    let mut monitor = Monitor::new(
        Dht11::new(line.pin(), clock.delay()),
        display,
        GpioIndicator::new_active_high(led.pin()),
    );
    monitor.show_splash();
    monitor
}

fn row(lcd: &SimLcd<'_>, row: usize) -> String {
    String::from_utf8_lossy(&lcd.visible_row(row)).into_owned()
}

#[test]
fn good_frame_is_displayed() {
    let clock = SimClock::new();
    let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 68]));
    let lcd = SimLcd::new(&clock);
    let led = SimOutput::new();
    let mut monitor = build(&clock, &line, &lcd, &led);

    assert_eq!(row(&lcd, 0), SPLASH_TEXT);

    let outcome = monitor.step();

    assert!(matches!(outcome, StepOutcome::Updated(_)));
    assert_eq!(row(&lcd, 0), "HUMIDITY    : 45");
    assert_eq!(row(&lcd, 1), "TEMPERATURE : 23");
    assert!(row(&lcd, 0).ends_with("45"));
    assert!(row(&lcd, 1).ends_with("23"));
    assert!(lcd.violations().is_empty());
}

#[test]
fn bad_checksum_leaves_display_untouched() {
    let clock = SimClock::new();
    let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 99]));
    let lcd = SimLcd::new(&clock);
    let led = SimOutput::new();
    let mut monitor = build(&clock, &line, &lcd, &led);

    let before = (row(&lcd, 0), row(&lcd, 1));
    lcd.clear_log();

    let outcome = monitor.step();

    assert_eq!(
        outcome,
        StepOutcome::Skipped(SensorError::ChecksumMismatch {
            expected: 68,
            received: 99
        })
    );
    assert!(lcd.transfers().is_empty());
    assert_eq!((row(&lcd, 0), row(&lcd, 1)), before);
    // Heartbeat still runs
    assert!(led.is_high());
}

#[test]
fn stale_values_survive_failures() {
    let clock = SimClock::new();
    let line = SimSensorLine::new(&clock, SensorScript::frame([45, 0, 23, 0, 68]));
    let lcd = SimLcd::new(&clock);
    let led = SimOutput::new();
    let mut monitor = build(&clock, &line, &lcd, &led);

    monitor.step();
    clock.advance_ns(SAMPLE_INTERVAL_NS);

    line.set_script(SensorScript::silent());
    lcd.clear_log();
    assert_eq!(monitor.step(), StepOutcome::Skipped(SensorError::Timeout));
    clock.advance_ns(SAMPLE_INTERVAL_NS);

    line.set_script(SensorScript::truncated([45, 0, 23, 0, 68], 17));
    assert_eq!(monitor.step(), StepOutcome::Skipped(SensorError::Timeout));

    assert!(lcd.transfers().is_empty());
    assert_eq!(row(&lcd, 0), "HUMIDITY    : 45");
    assert_eq!(row(&lcd, 1), "TEMPERATURE : 23");

    let stats = monitor.stats();
    assert_eq!(stats.iterations, 3);
    assert_eq!(stats.good_reads, 1);
    assert_eq!(stats.consecutive_failures, 2);
}

#[test]
fn shorter_value_overwrites_longer_one() {
    let clock = SimClock::new();
    // 100 %RH, 5 C
    let line = SimSensorLine::new(&clock, SensorScript::frame([100, 0, 5, 0, 105]));
    let lcd = SimLcd::new(&clock);
    let led = SimOutput::new();
    let mut monitor = build(&clock, &line, &lcd, &led);

    monitor.step();
    assert_eq!(row(&lcd, 0), "HUMIDITY    :100");
    assert_eq!(row(&lcd, 1), "TEMPERATURE :  5");

    clock.advance_ns(SAMPLE_INTERVAL_NS);
    line.set_script(SensorScript::frame([9, 0, 21, 0, 30]));
    monitor.step();

    assert_eq!(row(&lcd, 0), "HUMIDITY    :  9");
    assert_eq!(row(&lcd, 1), "TEMPERATURE : 21");
    assert!(lcd.violations().is_empty());
}

#[test]
fn indicator_toggles_every_iteration() {
    let clock = SimClock::new();
    let line = SimSensorLine::new(&clock, SensorScript::silent());
    let lcd = SimLcd::new(&clock);
    let led = SimOutput::new();
    let mut monitor = build(&clock, &line, &lcd, &led);
    let edges = led.edges();

    for _ in 0..5 {
        monitor.step();
        clock.advance_ns(SAMPLE_INTERVAL_NS);
    }

    assert_eq!(led.edges() - edges, 5);
    assert!(monitor.indicator().is_lit());
}

#[test]
fn failed_read_returns_promptly() {
    let clock = SimClock::new();
    let line = SimSensorLine::new(&clock, SensorScript::stuck_low());
    let lcd = SimLcd::new(&clock);
    let led = SimOutput::new();
    let mut monitor = build(&clock, &line, &lcd, &led);

    let start_us = clock.now_us();
    monitor.step();
    let elapsed_us = clock.now_us() - start_us;

    // Start pulse plus at most two bounded waits
    assert!(elapsed_us <= 20_000 + 2 * 200);
}
