//! Configuration types
//!
//! Everything here is plain data with datasheet defaults. Boards override
//! values through `board.toml`, which the firmware build script parses and
//! validates before baking the result into the image.

pub mod hardware;
pub mod timing;

pub use hardware::{char_prefix, BoardConfig, ConfigError, PinMap, GPIO_COUNT};
pub use timing::{
    LcdTiming, MonitorConfig, SensorTiming, MIN_CLEAR_SETTLE_US, MIN_ENABLE_SETTLE_US,
    MIN_SAMPLE_INTERVAL_MS, MIN_START_LOW_MS,
};
