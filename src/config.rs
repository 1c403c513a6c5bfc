//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and display geometry
//! live here so they can be tuned in one place.

// Timing

/// Main loop polling period (ms).
pub const POLL_INTERVAL_MS: u64 = 10;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u32 = 50;

/// Temperature sensor sampling period (ms).
pub const SENSOR_INTERVAL_MS: u32 = 1000;

/// How often the backlight idle timer is evaluated (ms).
pub const BACKLIGHT_CHECK_INTERVAL_MS: u32 = 1000;

/// Inactivity timeout before the backlight is turned off (ms).
pub const BACKLIGHT_TIMEOUT_MS: u32 = 10_000;

// Encoder

/// Raw quadrature steps per mechanical detent.
pub const PULSES_PER_DETENT: i32 = 4;

// Settings

/// Threshold values used when the option region has never been written.
pub const DEFAULT_TEMPERATURE1: u8 = 80;
pub const DEFAULT_TEMPERATURE2: u8 = 90;

/// Upper bound on busy-flag polls per erase/write cycle before a save
/// is abandoned with a timeout. A UICR erase takes up to 85 ms.
pub const NVM_MAX_BUSY_POLLS: u32 = 1_000_000;

// Display

/// HD44780 character ROM code for the degree sign.
pub const DEGREE_GLYPH: u8 = 223;

/// Character display geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayGeometry {
    /// Characters per line.
    pub columns: u8,
    /// Number of lines; also the number of menu items visible at once.
    pub rows: u8,
}

impl DisplayGeometry {
    /// 20x4 character module.
    pub const LCD_2004: Self = Self {
        columns: 20,
        rows: 4,
    };
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self::LCD_2004
    }
}

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; the concrete `embassy_nrf::peripherals::*` are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Encoder A       → P0.31 (QDEC)
//   Encoder B       → P0.30 (QDEC)
//   Encoder button  → P0.11 (active-low, pull-up)
//   Sensor SCK      → P0.13
//   Sensor MISO     → P0.14
//   Sensor CS       → P0.15
//   I²C SDA         → P0.26
//   I²C SCL         → P0.27
