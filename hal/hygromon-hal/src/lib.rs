//! Hygromon Hardware Abstraction Layer
//!
//! This crate defines the pin-control traits the protocol drivers are
//! written against. Chip-specific crates implement them, which keeps the
//! sensor and display drivers free of register access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (hygromon-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hygromon-drivers (DHT11, HD44780)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hygromon-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ hygromon-hal- │       │  sim backend  │
//! │    rp2040     │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`gpio::FlexPin`] - Direction-switchable pin for single-wire buses
//!
//! # Features
//!
//! - `sim` - Simulated clock, sensor and display controller ([`sim`])
//! - `defmt` - Enable debug formatting support

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export key traits at crate root for convenience
pub use gpio::{Direction, FlexPin, InputPin, Level, OutputPin};
