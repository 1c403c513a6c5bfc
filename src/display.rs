//! Character display interface.
//!
//! The menu draws through the [`Display`] trait, which mirrors the command
//! set of an HD44780-style module. [`CharGrid`] is an in-memory
//! implementation used by buffered backends (the OLED renders one after
//! every redraw) and by tests.

use crate::config::DisplayGeometry;

/// Largest grid a [`CharGrid`] can hold.
pub const MAX_COLUMNS: usize = 40;
pub const MAX_ROWS: usize = 8;

/// A character display with a switchable backlight.
pub trait Display {
    /// Blank every cell and home the cursor.
    fn clear(&mut self);

    fn set_cursor(&mut self, col: u8, row: u8);

    /// Write ASCII text at the cursor, advancing it.
    fn write_str(&mut self, text: &str);

    /// Write one character ROM code at the cursor, advancing it.
    fn write_char(&mut self, code: u8);

    fn set_backlight(&mut self, on: bool);

    /// Push pending output to the panel. Unbuffered displays do nothing.
    fn flush(&mut self) {}
}

impl<D: Display + ?Sized> Display for &mut D {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        (**self).set_cursor(col, row)
    }

    fn write_str(&mut self, text: &str) {
        (**self).write_str(text)
    }

    fn write_char(&mut self, code: u8) {
        (**self).write_char(code)
    }

    fn set_backlight(&mut self, on: bool) {
        (**self).set_backlight(on)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

/// Character cells in memory. Writes past the right edge or below the last
/// row are dropped.
#[derive(Clone, Debug)]
pub struct CharGrid {
    cells: [[u8; MAX_COLUMNS]; MAX_ROWS],
    columns: usize,
    rows: usize,
    col: usize,
    row: usize,
    backlight: bool,
}

impl CharGrid {
    pub fn new(geometry: DisplayGeometry) -> Self {
        Self {
            cells: [[b' '; MAX_COLUMNS]; MAX_ROWS],
            columns: usize::from(geometry.columns).min(MAX_COLUMNS),
            rows: usize::from(geometry.rows).min(MAX_ROWS),
            col: 0,
            row: 0,
            backlight: true,
        }
    }

    /// Character codes of one row, `columns` wide.
    pub fn line(&self, row: usize) -> &[u8] {
        match self.cells.get(row) {
            Some(cells) if row < self.rows => &cells[..self.columns],
            _ => &[],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }
}

impl Display for CharGrid {
    fn clear(&mut self) {
        self.cells = [[b' '; MAX_COLUMNS]; MAX_ROWS];
        self.col = 0;
        self.row = 0;
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.col = usize::from(col);
        self.row = usize::from(row);
    }

    fn write_str(&mut self, text: &str) {
        for b in text.bytes() {
            self.write_char(b);
        }
    }

    fn write_char(&mut self, code: u8) {
        if self.row < self.rows && self.col < self.columns {
            self.cells[self.row][self.col] = code;
        }
        self.col = self.col.saturating_add(1);
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }
}
