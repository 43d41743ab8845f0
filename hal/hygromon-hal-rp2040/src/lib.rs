//! RP2040-specific HAL for the humidity monitor firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `hygromon-hal` pin traits on top of embassy-rp, plus:
//!
//! - Pin allocation by number for build-time board configuration
//! - Output and direction-switchable (flex) pin adapters

#![no_std]

pub mod gpio;
pub mod pins;

pub use gpio::{RpFlexPin, RpOutputPin};
pub use pins::{PinBank, PinError};
