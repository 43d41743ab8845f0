//! Status indicator trait

/// A single on/off indicator (typically an LED) flipped once per loop
/// iteration as a heartbeat
pub trait StatusIndicator {
    /// Flip the indicator
    fn toggle(&mut self);

    /// Check if the indicator is currently lit
    fn is_lit(&self) -> bool;
}
