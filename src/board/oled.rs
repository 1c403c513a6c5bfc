//! SSD1306 OLED presented as a character display.
//!
//! The menu writes into a [`CharGrid`]; `flush` renders the grid with a
//! 6×10 font, one text line per 16-pixel band. Display on/off stands in for
//! the backlight.

use embedded_graphics::mono_font::iso_8859_1::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;
use thermofan::config::{DisplayGeometry, DEGREE_GLYPH};
use thermofan::display::{CharGrid, Display, MAX_COLUMNS};
use thermofan::Error;

type Panel<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Baseline of the first text line and the pitch between lines (px).
const FIRST_BASELINE: i32 = 10;
const LINE_PITCH: i32 = 16;

pub struct OledDisplay<I2C> {
    panel: Panel<I2C>,
    grid: CharGrid,
}

impl<I2C> OledDisplay<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the panel and blank it.
    pub fn init(i2c: I2C, geometry: DisplayGeometry) -> Result<Self, Error> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel.init().map_err(|_| Error::Display)?;
        panel.clear_buffer();
        panel.flush().map_err(|_| Error::Display)?;
        Ok(Self {
            panel,
            grid: CharGrid::new(geometry),
        })
    }
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Character ROM codes to text; the degree glyph becomes '°'.
fn decode_line(codes: &[u8]) -> String<{ MAX_COLUMNS * 2 }> {
    let mut text = String::new();
    for &code in codes {
        let c = match code {
            DEGREE_GLYPH => '°',
            0x20..=0x7E => char::from(code),
            _ => '?',
        };
        let _ = text.push(c);
    }
    text
}

impl<I2C> Display for OledDisplay<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) {
        self.grid.clear();
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.grid.set_cursor(col, row);
    }

    fn write_str(&mut self, text: &str) {
        self.grid.write_str(text);
    }

    fn write_char(&mut self, code: u8) {
        self.grid.write_char(code);
    }

    fn set_backlight(&mut self, on: bool) {
        self.grid.set_backlight(on);
        let _ = self.panel.set_display_on(on);
    }

    fn flush(&mut self) {
        self.panel.clear_buffer();
        for row in 0..self.grid.rows() {
            let text = decode_line(self.grid.line(row));
            let baseline = FIRST_BASELINE + LINE_PITCH * row as i32;
            let _ = Text::new(&text, Point::new(0, baseline), text_style()).draw(&mut self.panel);
        }
        let _ = self.panel.flush();
    }
}
