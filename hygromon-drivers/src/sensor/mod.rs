//! Humidity/temperature sensor drivers

pub mod dht11;

pub use dht11::Dht11;
