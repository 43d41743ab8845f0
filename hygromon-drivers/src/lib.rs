//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in hygromon-core, written against the hygromon-hal pin traits and the
//! embedded-hal `DelayNs` trait:
//!
//! - Single-wire humidity/temperature sensor (DHT11)
//! - 4-bit parallel character display (HD44780)
//! - GPIO status indicator (LED)
//! - Bounded line polling shared by the bit-banged protocols

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod indicator;
pub mod poll;
pub mod sensor;

pub use display::{Hd44780, LcdPins};
pub use indicator::GpioIndicator;
pub use poll::{wait_for_level, PollConfig, PollTimeout};
pub use sensor::Dht11;
