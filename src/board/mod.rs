//! nRF52840 implementations of the controller's hardware traits.
//!
//! ## Components
//!
//! - **Encoder**: QDEC peripheral accumulated by a background task
//! - **Thermocouple**: MAX6675-style converter on SPIM3 (read-only)
//! - **Display**: SSD1306 128×64 OLED via I²C, drawn as a 20×4 text grid
//! - **Settings**: UICR customer words, programmed through the NVMC

pub mod encoder;
pub mod oled;
pub mod thermocouple;
pub mod uicr;
