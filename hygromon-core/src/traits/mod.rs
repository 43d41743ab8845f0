//! Hardware abstraction traits
//!
//! These traits define the interface between the control loop and the
//! protocol drivers that talk to the actual parts.

pub mod display;
pub mod indicator;
pub mod sensor;

pub use display::{CharacterDisplay, DisplayCursor, DISPLAY_COLS, DISPLAY_ROWS};
pub use indicator::StatusIndicator;
pub use sensor::{HumiditySensor, SensorError};
