//! Menu state machine.
//!
//! Three states share the encoder and its push-button:
//!
//! ```text
//!              rotate / press                 press (Temp1, Temp2, Units)
//! Displaying ──────────────────▶  InMenu  ─────────────────────────────▶ Editing
//!     ▲                          │  ▲                                     │
//!     └──── press on Exit (save) ┘  └────────────── press ────────────────┘
//! ```
//!
//! The menu owns the [`Settings`]. Every input returns a [`MenuOutcome`]
//! telling the caller whether to redraw and whether to persist.

use core::fmt::Write;

use heapless::Vec;

use crate::config::{DisplayGeometry, DEGREE_GLYPH};
use crate::display::{Display, MAX_COLUMNS};
use crate::settings::Settings;

/// Top-level UI state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    /// Thresholds and the live reading.
    Displaying,
    /// Browsing the item list.
    InMenu,
    /// Changing the selected item's value.
    Editing,
}

/// Menu entries in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItem {
    Temp1,
    Temp2,
    Units,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Temp1,
        MenuItem::Temp2,
        MenuItem::Units,
        MenuItem::Exit,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Temp1 => "Set Temp 1",
            MenuItem::Temp2 => "Set Temp 2",
            MenuItem::Units => "Set Units",
            MenuItem::Exit => "Exit Menu",
        }
    }
}

/// What the caller should do after an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuOutcome {
    /// Input had no effect in the current state.
    Ignored,
    /// Visible content changed.
    Redraw,
    /// Menu was left through Exit: persist the settings, then redraw.
    Save,
}

/// Move selection cursor one item up.
fn select_prev(selected: usize) -> usize {
    selected.saturating_sub(1)
}

/// Move selection cursor one item down if another item exists.
fn select_next(selected: usize, item_count: usize) -> usize {
    if selected + 1 < item_count {
        selected + 1
    } else {
        selected
    }
}

/// The menu state machine.
#[derive(Clone, Debug)]
pub struct Menu {
    state: MenuState,
    selected: usize,
    offset: usize,
    settings: Settings,
    geometry: DisplayGeometry,
}

impl Menu {
    pub fn new(settings: Settings, geometry: DisplayGeometry) -> Self {
        Self {
            state: MenuState::Displaying,
            selected: 0,
            offset: 0,
            settings,
            geometry,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.selected]
    }

    /// Index of the first visible menu item.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of menu items that fit on screen at once.
    pub fn visible_lines(&self) -> usize {
        usize::from(self.geometry.rows).max(1)
    }

    /// Handle one encoder detent. Only the sign of `delta` matters.
    pub fn rotate(&mut self, delta: i8) -> MenuOutcome {
        if delta == 0 {
            return MenuOutcome::Ignored;
        }

        match self.state {
            MenuState::Displaying => {
                self.open();
                MenuOutcome::Redraw
            }
            MenuState::InMenu => {
                let previous = self.selected;
                self.selected = if delta > 0 {
                    select_next(self.selected, MenuItem::COUNT)
                } else {
                    select_prev(self.selected)
                };
                if self.selected == previous {
                    return MenuOutcome::Ignored;
                }
                self.scroll_to_selection();
                MenuOutcome::Redraw
            }
            MenuState::Editing => {
                self.edit(delta);
                MenuOutcome::Redraw
            }
        }
    }

    /// Handle one debounced button press.
    pub fn press(&mut self) -> MenuOutcome {
        match self.state {
            MenuState::Displaying => {
                self.open();
                MenuOutcome::Redraw
            }
            MenuState::InMenu => match self.selected() {
                MenuItem::Exit => {
                    self.state = MenuState::Displaying;
                    MenuOutcome::Save
                }
                MenuItem::Temp1 | MenuItem::Temp2 | MenuItem::Units => {
                    self.state = MenuState::Editing;
                    MenuOutcome::Redraw
                }
            },
            MenuState::Editing => {
                self.state = MenuState::InMenu;
                MenuOutcome::Redraw
            }
        }
    }

    fn open(&mut self) {
        self.state = MenuState::InMenu;
        self.selected = 0;
        self.offset = 0;
    }

    fn scroll_to_selection(&mut self) {
        let lines = self.visible_lines();
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + lines {
            self.offset = self.selected + 1 - lines;
        }
    }

    fn edit(&mut self, delta: i8) {
        let up = delta > 0;
        match self.selected() {
            MenuItem::Temp1 => step(&mut self.settings.temperature1, up),
            MenuItem::Temp2 => step(&mut self.settings.temperature2, up),
            // Only clockwise toggles; counter-clockwise leaves the unit alone.
            MenuItem::Units if up => self.settings.units = self.settings.units.toggled(),
            MenuItem::Units | MenuItem::Exit => {}
        }
    }

    /// Draw the current state. `reading` is the latest converted sensor
    /// value; `save_failed` adds a warning line to the reading screen.
    pub fn render<D: Display>(&self, display: &mut D, reading: u16, save_failed: bool) {
        display.clear();
        match self.state {
            MenuState::Displaying => self.render_readings(display, reading, save_failed),
            MenuState::InMenu => self.render_items(display),
            MenuState::Editing => self.render_editor(display),
        }
    }

    /// Reading screen. Three or more rows: thresholds on rows 0 and 1 and
    /// the reading on the last row, with the save warning on row 2 when it
    /// is free. Two rows: both thresholds share row 0. One row: the reading
    /// only.
    fn render_readings<D: Display>(&self, display: &mut D, reading: u16, save_failed: bool) {
        let rows = self.geometry.rows;
        let Some(last_row) = rows.checked_sub(1) else {
            return;
        };

        match rows {
            1 => {}
            2 => {
                let mut line = self.line();
                line.degrees(format_args!("T1:{}", self.settings.temperature1));
                line.degrees(format_args!(" T2:{}", self.settings.temperature2));
                self.put(display, 0, &line);
            }
            _ => {
                let mut line = self.line();
                line.degrees(format_args!("T1:{}", self.settings.temperature1));
                self.put(display, 0, &line);

                let mut line = self.line();
                line.degrees(format_args!("T2:{}", self.settings.temperature2));
                self.put(display, 1, &line);

                if save_failed && last_row > 2 {
                    let mut line = self.line();
                    let _ = line.write_str("Save failed");
                    self.put(display, 2, &line);
                }
            }
        }

        let mut line = self.line();
        let _ = write!(line, "Reading:{}{}", reading, self.settings.units.letter());
        self.put(display, last_row, &line);
    }

    fn render_items<D: Display>(&self, display: &mut D) {
        let visible = MenuItem::ALL.iter().enumerate().skip(self.offset).take(self.visible_lines());
        for (row, (index, item)) in visible.enumerate() {
            let marker = if index == self.selected { '>' } else { ' ' };
            let mut line = self.line();
            let _ = write!(line, "{} {}", marker, item.label());
            self.put(display, row as u8, &line);
        }
    }

    fn render_editor<D: Display>(&self, display: &mut D) {
        let item = self.selected();
        let mut line = self.line();
        let _ = write!(line, "{}:", item.label());
        self.put(display, 0, &line);

        let mut line = self.line();
        match item {
            MenuItem::Temp1 | MenuItem::Temp2 => {
                let value = if item == MenuItem::Temp1 {
                    self.settings.temperature1
                } else {
                    self.settings.temperature2
                };
                line.degrees(format_args!("> {}", value));
            }
            MenuItem::Units => {
                let _ = write!(line, "> {}", self.settings.units.letter());
            }
            MenuItem::Exit => return,
        }
        self.put(display, 1, &line);
    }

    /// Empty line as wide as the display.
    fn line(&self) -> Line {
        Line::new(usize::from(self.geometry.columns))
    }

    fn put<D: Display>(&self, display: &mut D, row: u8, line: &Line) {
        display.set_cursor(0, row);
        for &code in line.codes() {
            display.write_char(code);
        }
    }
}

/// One display row of character codes. Anything past `width` is dropped,
/// glyphs included.
struct Line {
    codes: Vec<u8, MAX_COLUMNS>,
    width: usize,
}

impl Line {
    fn new(width: usize) -> Self {
        Self {
            codes: Vec::new(),
            width: width.min(MAX_COLUMNS),
        }
    }

    fn push(&mut self, code: u8) {
        if self.codes.len() < self.width {
            let _ = self.codes.push(code);
        }
    }

    /// Formatted text followed by the degree glyph.
    fn degrees(&mut self, args: core::fmt::Arguments<'_>) {
        let _ = self.write_fmt(args);
        self.push(DEGREE_GLYPH);
    }

    fn codes(&self) -> &[u8] {
        &self.codes
    }
}

impl Write for Line {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for b in s.bytes() {
            self.push(b);
        }
        Ok(())
    }
}

/// Move a threshold by one, saturating at the `u8` range.
fn step(value: &mut u8, up: bool) {
    *value = if up {
        value.saturating_add(1)
    } else {
        value.saturating_sub(1)
    };
}

impl Default for Menu {
    fn default() -> Self {
        Self::new(Settings::default(), DisplayGeometry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::CharGrid;
    use crate::settings::Units;

    fn menu() -> Menu {
        Menu::default()
    }

    fn in_menu_at(item: MenuItem) -> Menu {
        let mut m = menu();
        m.press();
        while m.selected() != item {
            m.rotate(1);
        }
        m
    }

    /// Small deterministic generator for input sequences.
    struct Lcg(u32);

    impl Lcg {
        fn next_delta(&mut self) -> i8 {
            self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            if self.0 >> 31 == 0 {
                -1
            } else {
                1
            }
        }
    }

    fn text(grid: &CharGrid, row: usize) -> std::string::String {
        grid.line(row)
            .iter()
            .map(|&c| if c == DEGREE_GLYPH { '°' } else { c as char })
            .collect::<std::string::String>()
            .trim_end()
            .to_owned()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Transitions
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn starts_displaying() {
        let m = menu();
        assert_eq!(m.state(), MenuState::Displaying);
        assert_eq!(m.selected(), MenuItem::Temp1);
        assert_eq!(m.offset(), 0);
    }

    #[test]
    fn rotation_enters_menu_at_top() {
        for delta in [1, -1] {
            let mut m = menu();
            assert_eq!(m.rotate(delta), MenuOutcome::Redraw);
            assert_eq!(m.state(), MenuState::InMenu);
            assert_eq!(m.selected(), MenuItem::Temp1);
            assert_eq!(m.offset(), 0);
        }
    }

    #[test]
    fn press_enters_menu_at_top() {
        let mut m = menu();
        assert_eq!(m.press(), MenuOutcome::Redraw);
        assert_eq!(m.state(), MenuState::InMenu);
        assert_eq!(m.selected(), MenuItem::Temp1);

        // Leaving from the bottom of the list and pressing again starts over.
        let mut m = in_menu_at(MenuItem::Exit);
        assert_eq!(m.press(), MenuOutcome::Save);
        assert_eq!(m.state(), MenuState::Displaying);
        assert_eq!(m.press(), MenuOutcome::Redraw);
        assert_eq!(m.state(), MenuState::InMenu);
        assert_eq!(m.selected(), MenuItem::Temp1);
        assert_eq!(m.offset(), 0);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut m = menu();
        assert_eq!(m.rotate(0), MenuOutcome::Ignored);
        assert_eq!(m.state(), MenuState::Displaying);
    }

    #[test]
    fn selection_clamps_at_both_ends() {
        let mut m = in_menu_at(MenuItem::Temp1);
        assert_eq!(m.rotate(-1), MenuOutcome::Ignored);
        assert_eq!(m.selected(), MenuItem::Temp1);

        for expected in [MenuItem::Temp2, MenuItem::Units, MenuItem::Exit] {
            assert_eq!(m.rotate(1), MenuOutcome::Redraw);
            assert_eq!(m.selected(), expected);
        }
        assert_eq!(m.rotate(1), MenuOutcome::Ignored);
        assert_eq!(m.selected(), MenuItem::Exit);
    }

    #[test]
    fn press_on_field_edits_and_press_again_returns() {
        for item in [MenuItem::Temp1, MenuItem::Temp2, MenuItem::Units] {
            let mut m = in_menu_at(item);
            assert_eq!(m.press(), MenuOutcome::Redraw);
            assert_eq!(m.state(), MenuState::Editing);
            assert_eq!(m.selected(), item);
            assert_eq!(m.press(), MenuOutcome::Redraw);
            assert_eq!(m.state(), MenuState::InMenu);
            assert_eq!(m.selected(), item);
        }
    }

    #[test]
    fn exit_requests_save() {
        let mut m = in_menu_at(MenuItem::Exit);
        assert_eq!(m.press(), MenuOutcome::Save);
        assert_eq!(m.state(), MenuState::Displaying);
    }

    #[test]
    fn editing_temperatures_saturates() {
        let mut m = Menu::new(Settings::new(254, 1), DisplayGeometry::default());
        m.press();
        m.press();
        for _ in 0..5 {
            assert_eq!(m.rotate(1), MenuOutcome::Redraw);
        }
        assert_eq!(m.settings().temperature1, 255);

        m.press();
        m.rotate(1);
        m.press();
        for _ in 0..5 {
            m.rotate(-1);
        }
        assert_eq!(m.settings().temperature2, 0);
        assert_eq!(m.settings().temperature1, 255);
    }

    #[test]
    fn temperatures_stay_in_range_for_any_sequence() {
        for seed in 0..20 {
            let mut rng = Lcg(seed);
            let mut m = in_menu_at(MenuItem::Temp2);
            m.press();
            let mut expected: i32 = i32::from(m.settings().temperature2);
            for _ in 0..2000 {
                let d = rng.next_delta();
                m.rotate(d);
                expected = (expected + i32::from(d)).clamp(0, 255);
                assert_eq!(i32::from(m.settings().temperature2), expected);
            }
        }
    }

    #[test]
    fn unit_toggle_parity_and_asymmetry() {
        let mut m = in_menu_at(MenuItem::Units);
        m.press();
        for n in 1..=6 {
            assert_eq!(m.rotate(1), MenuOutcome::Redraw);
            let expected = if n % 2 == 0 { Units::Fahrenheit } else { Units::Celsius };
            assert_eq!(m.settings().units, expected);
        }

        for _ in 0..5 {
            assert_eq!(m.rotate(-1), MenuOutcome::Redraw);
            assert_eq!(m.settings().units, Units::Fahrenheit);
        }
    }

    #[test]
    fn selection_and_viewport_invariants_hold() {
        for rows in [1u8, 2, 3, 4, 6] {
            for seed in 0..10 {
                let geometry = DisplayGeometry { columns: 20, rows };
                let mut m = Menu::new(Settings::default(), geometry);
                m.rotate(1);
                let lines = m.visible_lines();
                let mut rng = Lcg(seed * 31 + u32::from(rows));
                for _ in 0..500 {
                    m.rotate(rng.next_delta());
                    let sel = MenuItem::ALL.iter().position(|&i| i == m.selected()).unwrap();
                    assert!(sel < MenuItem::COUNT);
                    assert!(m.offset() <= sel);
                    assert!(sel < m.offset() + lines);
                    if lines < MenuItem::COUNT {
                        assert!(m.offset() + lines <= MenuItem::COUNT);
                    } else {
                        assert_eq!(m.offset(), 0);
                    }
                }
            }
        }
    }

    #[test]
    fn viewport_scrolls_on_short_display() {
        let mut m = Menu::new(Settings::default(), DisplayGeometry { columns: 16, rows: 2 });
        m.rotate(1);
        m.rotate(1);
        assert_eq!(m.offset(), 0);
        m.rotate(1);
        assert_eq!(m.selected(), MenuItem::Units);
        assert_eq!(m.offset(), 1);
        m.rotate(1);
        assert_eq!(m.offset(), 2);
        m.rotate(-1);
        m.rotate(-1);
        assert_eq!(m.selected(), MenuItem::Temp2);
        assert_eq!(m.offset(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Rendering
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn renders_reading_screen() {
        let m = menu();
        let mut grid = CharGrid::new(DisplayGeometry::default());
        m.render(&mut grid, 73, false);
        assert_eq!(text(&grid, 0), "T1:80°");
        assert_eq!(text(&grid, 1), "T2:90°");
        assert_eq!(text(&grid, 2), "");
        assert_eq!(text(&grid, 3), "Reading:73F");
    }

    #[test]
    fn reading_screen_shows_save_fault() {
        let m = menu();
        let mut grid = CharGrid::new(DisplayGeometry::default());
        m.render(&mut grid, 0, true);
        assert_eq!(text(&grid, 2), "Save failed");
    }

    #[test]
    fn renders_menu_with_marker() {
        let mut m = in_menu_at(MenuItem::Temp2);
        let mut grid = CharGrid::new(DisplayGeometry::default());
        m.render(&mut grid, 0, false);
        assert_eq!(text(&grid, 0), "  Set Temp 1");
        assert_eq!(text(&grid, 1), "> Set Temp 2");
        assert_eq!(text(&grid, 2), "  Set Units");
        assert_eq!(text(&grid, 3), "  Exit Menu");

        m.rotate(1);
        m.render(&mut grid, 0, false);
        assert_eq!(text(&grid, 1), "  Set Temp 2");
        assert_eq!(text(&grid, 2), "> Set Units");
    }

    #[test]
    fn renders_scrolled_menu() {
        let mut m = Menu::new(Settings::default(), DisplayGeometry { columns: 16, rows: 2 });
        m.rotate(1);
        for _ in 0..3 {
            m.rotate(1);
        }
        let mut grid = CharGrid::new(DisplayGeometry { columns: 16, rows: 2 });
        m.render(&mut grid, 0, false);
        assert_eq!(text(&grid, 0), "  Set Units");
        assert_eq!(text(&grid, 1), "> Exit Menu");
    }

    #[test]
    fn renders_editors() {
        let mut grid = CharGrid::new(DisplayGeometry::default());

        let mut m = in_menu_at(MenuItem::Temp1);
        m.press();
        m.rotate(1);
        m.render(&mut grid, 0, false);
        assert_eq!(text(&grid, 0), "Set Temp 1:");
        assert_eq!(text(&grid, 1), "> 81°");

        let mut m = in_menu_at(MenuItem::Units);
        m.press();
        m.render(&mut grid, 0, false);
        assert_eq!(text(&grid, 0), "Set Units:");
        assert_eq!(text(&grid, 1), "> F");
        m.rotate(1);
        m.render(&mut grid, 0, false);
        assert_eq!(text(&grid, 1), "> C");
    }

    /// Records every character written, without clipping.
    #[derive(Default)]
    struct Tape {
        row: u8,
        rows: std::collections::BTreeMap<u8, std::vec::Vec<u8>>,
    }

    impl Display for Tape {
        fn clear(&mut self) {
            self.rows.clear();
        }

        fn set_cursor(&mut self, _col: u8, row: u8) {
            self.row = row;
        }

        fn write_str(&mut self, text: &str) {
            for b in text.bytes() {
                self.write_char(b);
            }
        }

        fn write_char(&mut self, code: u8) {
            self.rows.entry(self.row).or_default().push(code);
        }

        fn set_backlight(&mut self, _on: bool) {}
    }

    #[test]
    fn degree_glyph_counts_against_width() {
        let m = Menu::new(Settings::default(), DisplayGeometry { columns: 5, rows: 4 });
        let mut tape = Tape::default();
        m.render(&mut tape, 0, false);
        assert_eq!(tape.rows[&0], b"T1:80");
        assert_eq!(tape.rows[&1], b"T2:90");

        let m = Menu::new(Settings::default(), DisplayGeometry { columns: 6, rows: 4 });
        m.render(&mut tape, 0, false);
        assert_eq!(tape.rows[&0], b"T1:80\xDF");
        assert!(tape.rows.values().all(|line| line.len() <= 6));
    }

    #[test]
    fn editor_glyph_respects_width() {
        let mut m = Menu::new(Settings::default(), DisplayGeometry { columns: 4, rows: 4 });
        m.press();
        m.press();
        let mut tape = Tape::default();
        m.render(&mut tape, 0, false);
        assert_eq!(tape.rows[&1], b"> 80");
    }

    #[test]
    fn two_row_reading_screen_keeps_every_line() {
        let geometry = DisplayGeometry { columns: 20, rows: 2 };
        let m = Menu::new(Settings::default(), geometry);
        let mut grid = CharGrid::new(geometry);
        m.render(&mut grid, 72, false);
        assert_eq!(text(&grid, 0), "T1:80° T2:90°");
        assert_eq!(text(&grid, 1), "Reading:72F");
    }

    #[test]
    fn one_row_reading_screen_shows_reading() {
        let geometry = DisplayGeometry { columns: 20, rows: 1 };
        let m = Menu::new(Settings::default(), geometry);
        let mut grid = CharGrid::new(geometry);
        m.render(&mut grid, 72, true);
        assert_eq!(text(&grid, 0), "Reading:72F");
    }

    #[test]
    fn three_row_reading_screen_has_no_room_for_warning() {
        let geometry = DisplayGeometry { columns: 20, rows: 3 };
        let m = Menu::new(Settings::default(), geometry);
        let mut grid = CharGrid::new(geometry);
        m.render(&mut grid, 72, true);
        assert_eq!(text(&grid, 0), "T1:80°");
        assert_eq!(text(&grid, 1), "T2:90°");
        assert_eq!(text(&grid, 2), "Reading:72F");
    }

    #[test]
    fn narrow_display_clips_lines() {
        let geometry = DisplayGeometry { columns: 8, rows: 4 };
        let m = Menu::new(Settings::default(), geometry);
        let mut grid = CharGrid::new(DisplayGeometry::default());
        m.render(&mut grid, 1234, false);
        assert_eq!(text(&grid, 3), "Reading:");
    }
}
