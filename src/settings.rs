//! User-editable controller settings.

use crate::config::{DEFAULT_TEMPERATURE1, DEFAULT_TEMPERATURE2};

/// Temperature unit used for sensor readings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Units {
    #[default]
    Fahrenheit,
    Celsius,
}

impl Units {
    /// Single-letter suffix shown after a reading.
    pub const fn letter(self) -> char {
        match self {
            Units::Fahrenheit => 'F',
            Units::Celsius => 'C',
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Units::Fahrenheit => Units::Celsius,
            Units::Celsius => Units::Fahrenheit,
        }
    }
}

/// Fan thresholds and display unit.
///
/// Only the two thresholds survive a power cycle; `units` always starts as
/// Fahrenheit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub temperature1: u8,
    pub temperature2: u8,
    pub units: Units,
}

impl Settings {
    /// Settings with the given thresholds and the power-on unit.
    pub const fn new(temperature1: u8, temperature2: u8) -> Self {
        Self {
            temperature1,
            temperature2,
            units: Units::Fahrenheit,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE1, DEFAULT_TEMPERATURE2)
    }
}
