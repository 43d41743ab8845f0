//! Build script for hygromon-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates the board constants included by `src/board.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use hygromon_core::config::{char_prefix, BoardConfig, ConfigError};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    setup_linker(&out_dir);
    let board = load_board();
    generate_board(&board, &out_dir);
}

/// Set up linker search paths and scripts
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate board.toml
fn load_board() -> BoardConfig {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml pin configuration file.      ║\n\
            ║  Please create one in the hygromon-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let board: BoardConfig = match toml::from_str(&content) {
        Ok(board) => board,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid board.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = board.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml failed validation                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&describe(&e))
        );
    }

    println!("cargo:warning=board.toml validated successfully");
    board
}

/// Human-readable explanation of a validation failure
fn describe(error: &ConfigError) -> String {
    match *error {
        ConfigError::PinOutOfRange { pin } => {
            format!("[pins] GPIO{} does not exist (valid: 0-29)", pin)
        }
        ConfigError::DuplicatePin { pin } => {
            format!("[pins] GPIO{} is assigned more than once", pin)
        }
        ConfigError::StartPulseTooShort { ms } => {
            format!("[sensor] start_low_ms = {}: must be at least 18", ms)
        }
        ConfigError::PollIntervalZero => "[sensor] poll_interval_us must be non-zero".to_string(),
        ConfigError::PollCeilingZero => "[sensor] poll_ceiling must be non-zero".to_string(),
        ConfigError::ThresholdBeyondCeiling {
            threshold_polls,
            ceiling,
        } => format!(
            "[sensor] bit threshold ({} polls) must be below poll_ceiling ({})",
            threshold_polls, ceiling
        ),
        ConfigError::EnableSettleTooShort { us } => {
            format!("[lcd] enable_settle_us = {}: must be at least 100", us)
        }
        ConfigError::ClearSettleTooShort { us } => {
            format!("[lcd] clear_settle_us = {}: must be at least 1520", us)
        }
        ConfigError::SampleIntervalTooShort { ms } => {
            format!("[monitor] sample_interval_ms = {}: must be at least 1000", ms)
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", char_prefix(line, 61))
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the validated board as Rust constants
fn generate_board(board: &BoardConfig, out_dir: &Path) {
    let pins = &board.pins;
    let sensor = &board.sensor;
    let lcd = &board.lcd;
    let monitor = &board.monitor;

    let code = format!(
        "// Generated by build.rs from board.toml\n\
         \n\
         /// Board configuration baked in at build time\n\
         pub const BOARD: BoardConfig = BoardConfig {{\n\
         \x20   pins: PinMap {{\n\
         \x20       lcd_rs: {},\n\
         \x20       lcd_en: {},\n\
         \x20       lcd_d4: {},\n\
         \x20       lcd_d5: {},\n\
         \x20       lcd_d6: {},\n\
         \x20       lcd_d7: {},\n\
         \x20       indicator: {},\n\
         \x20       sensor: {},\n\
         \x20   }},\n\
         \x20   sensor: SensorTiming {{\n\
         \x20       start_low_ms: {},\n\
         \x20       poll_interval_us: {},\n\
         \x20       poll_ceiling: {},\n\
         \x20       bit_one_threshold_us: {},\n\
         \x20   }},\n\
         \x20   lcd: LcdTiming {{\n\
         \x20       power_on_ms: {},\n\
         \x20       function_set_settle_us: {:?},\n\
         \x20       mode_select_settle_us: {},\n\
         \x20       enable_setup_us: {},\n\
         \x20       enable_high_us: {},\n\
         \x20       enable_settle_us: {},\n\
         \x20       clear_settle_us: {},\n\
         \x20   }},\n\
         \x20   monitor: MonitorConfig {{\n\
         \x20       sample_interval_ms: {},\n\
         \x20       failure_warn_threshold: {},\n\
         \x20   }},\n\
         }};\n",
        pins.lcd_rs,
        pins.lcd_en,
        pins.lcd_d4,
        pins.lcd_d5,
        pins.lcd_d6,
        pins.lcd_d7,
        pins.indicator,
        pins.sensor,
        sensor.start_low_ms,
        sensor.poll_interval_us,
        sensor.poll_ceiling,
        sensor.bit_one_threshold_us,
        lcd.power_on_ms,
        lcd.function_set_settle_us,
        lcd.mode_select_settle_us,
        lcd.enable_setup_us,
        lcd.enable_high_us,
        lcd.enable_settle_us,
        lcd.clear_settle_us,
        monitor.sample_interval_ms,
        monitor.failure_warn_threshold,
    );

    fs::write(out_dir.join("board_config.rs"), code).unwrap();
}
