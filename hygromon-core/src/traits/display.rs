//! Character display trait for the 16x2 panel

/// Visible columns per row
pub const DISPLAY_COLS: u8 = 16;

/// Visible rows
pub const DISPLAY_ROWS: u8 = 2;

/// DDRAM address of the first character of the second row
pub const ROW1_DDRAM_OFFSET: u8 = 0x40;

/// Absolute character position on the display
///
/// Construction normalizes out-of-range values: any nonzero row selects the
/// second row, and columns past the last visible one are clamped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayCursor {
    col: u8,
    row: u8,
}

impl DisplayCursor {
    /// Create a cursor position
    pub const fn new(col: u8, row: u8) -> Self {
        let col = if col >= DISPLAY_COLS {
            DISPLAY_COLS - 1
        } else {
            col
        };
        let row = if row != 0 { 1 } else { 0 };
        Self { col, row }
    }

    /// Column (0-15)
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// Row (0 or 1)
    pub const fn row(&self) -> u8 {
        self.row
    }

    /// Controller DDRAM address of this position
    pub const fn ddram_address(&self) -> u8 {
        if self.row == 0 {
            self.col
        } else {
            self.col + ROW1_DDRAM_OFFSET
        }
    }
}

/// Trait for character displays
///
/// Implementations drive the panel directly; there is no acknowledgement
/// path, so none of these operations can report failure.
pub trait CharacterDisplay {
    /// Blank the whole display and home the cursor
    ///
    /// Returns only once the controller is ready for the next command.
    fn clear(&mut self);

    /// Move the cursor to an absolute position
    ///
    /// - `col`: Column number (0-15)
    /// - `row`: Row number (0 selects the first row, anything else the second)
    fn set_cursor(&mut self, col: u8, row: u8);

    /// Blank one row and leave the cursor at its start
    fn clear_row(&mut self, row: u8);

    /// Write text at the cursor
    ///
    /// No wrapping or bounds checks; text running past the last column
    /// goes wherever the controller puts it.
    fn print(&mut self, text: &str);

    /// Move the cursor, then write text
    fn print_at(&mut self, col: u8, row: u8, text: &str) {
        self.set_cursor(col, row);
        self.print(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_row_addresses() {
        assert_eq!(DisplayCursor::new(0, 0).ddram_address(), 0x00);
        assert_eq!(DisplayCursor::new(15, 0).ddram_address(), 0x0F);
        assert_eq!(DisplayCursor::new(0, 1).ddram_address(), 0x40);
        assert_eq!(DisplayCursor::new(15, 1).ddram_address(), 0x4F);
    }

    #[test]
    fn test_nonzero_row_is_second_row() {
        assert_eq!(DisplayCursor::new(3, 7), DisplayCursor::new(3, 1));
        assert_eq!(DisplayCursor::new(3, 255).row(), 1);
    }

    #[test]
    fn test_column_clamped() {
        let cursor = DisplayCursor::new(40, 0);
        assert_eq!(cursor.col(), 15);
        assert_eq!(cursor.ddram_address(), 0x0F);
    }

    proptest! {
        #[test]
        fn prop_second_row_offset(col in 0u8..16) {
            let top = DisplayCursor::new(col, 0).ddram_address();
            let bottom = DisplayCursor::new(col, 1).ddram_address();
            prop_assert_eq!(top, col);
            prop_assert_eq!(bottom, col + 0x40);
        }
    }
}
