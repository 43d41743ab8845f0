//! Board-agnostic core logic for the humidity monitor firmware
//!
//! This crate contains everything that does not touch pins directly:
//!
//! - Sensor frame and reading types
//! - Driver-facing traits (sensor, character display, status indicator)
//! - The polling control loop ([`monitor::Monitor`])
//! - Configuration types with their validation rules

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod frame;
pub mod monitor;
pub mod traits;

pub use frame::{Reading, SensorFrame, FRAME_LEN};
pub use monitor::{Monitor, MonitorStats, StepOutcome};
