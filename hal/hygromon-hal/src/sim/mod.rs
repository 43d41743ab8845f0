//! Simulated hardware backend
//!
//! Host-side stand-ins for the hardware the drivers talk to: a shared
//! nanosecond clock advanced only by delays, a single-wire sensor line that
//! replays a scripted waveform, and a character display controller that
//! decodes the 4-bit bus and checks its timing.
//!
//! All simulated parts borrow one [`SimClock`], so a driver owning a
//! [`SimDelay`] and a set of simulated pins sees a consistent timeline.

pub mod clock;
pub mod lcd;
pub mod pin;
pub mod sensor;

pub use clock::{SimClock, SimDelay};
pub use lcd::{LcdLine, Latch, Register, SimLcd, SimLcdPin, TimingViolation, Transfer};
pub use pin::{SimOutput, SimOutputPin};
pub use sensor::{SensorScript, SimSensorLine, SimSensorPin};
