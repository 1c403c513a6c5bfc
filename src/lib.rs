//! Interactive control core of a two-threshold temperature fan controller.
//!
//! Everything here is pure logic behind small hardware traits, so it runs
//! on the host for testing as well as on the target:
//!
//! - [`encoder`]: quadrature counter → detent position
//! - [`debounce`]: push-button debouncing and wake-press handling
//! - [`backlight`]: idle power-save timer
//! - [`menu`]: the Displaying / InMenu / Editing state machine
//! - [`sensor`]: thermocouple sampling and unit conversion
//! - [`storage`]: erase-before-write option-byte settings
//! - [`controller`]: one polling period tying the above together
//!
//! Usage: `cargo test --lib` / `cargo test --test integration`
//!
//! Note: The embedded binary (`src/main.rs`, `--features embedded`) supplies
//! the nRF52840 implementations of the hardware traits.

#![cfg_attr(not(test), no_std)]

pub mod backlight;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod display;
pub mod encoder;
pub mod error;
pub mod menu;
pub mod sensor;
pub mod settings;
pub mod storage;

pub use controller::{Controller, PollReport};
pub use error::{Error, StorageError};
pub use settings::{Settings, Units};
