//! Thermocouple sampling and unit conversion.
//!
//! Raw reading layout (16 bits, MSB first on the wire):
//! ```text
//! Bit  15   : dummy, always 0
//! Bits 14..3: temperature, 0.25 °C per LSB
//! Bit  2    : open-thermocouple fault
//! Bits 1..0 : device id / state, ignored
//! ```

use crate::settings::Units;

/// Set when the probe is disconnected; the payload is then meaningless.
pub const FAULT_BIT: u16 = 0x0004;

/// Source of raw sensor codes.
pub trait SensorReader {
    fn read_raw(&mut self) -> u16;
}

impl<S: SensorReader + ?Sized> SensorReader for &mut S {
    fn read_raw(&mut self) -> u16 {
        (**self).read_raw()
    }
}

/// `true` when the raw code carries the fault flag.
pub const fn is_fault(raw: u16) -> bool {
    raw & FAULT_BIT != 0
}

/// Convert a raw code into whole degrees of `units`. Faulted readings
/// yield 0.
pub fn convert(raw: u16, units: Units) -> u16 {
    if is_fault(raw) {
        return 0;
    }

    let celsius = (raw >> 3) / 4;
    match units {
        Units::Celsius => celsius,
        Units::Fahrenheit => celsius * 9 / 5 + 32,
    }
}

/// A converted reading, kept with the raw fault flag for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub value: u16,
    pub fault: bool,
}

/// Reads the sensor at a fixed period and keeps the latest value.
#[derive(Clone, Debug)]
pub struct SensorSampler {
    interval_ms: u32,
    last_sample: u32,
    value: u16,
}

impl SensorSampler {
    /// The first sample is taken once `interval_ms` has passed after `now`.
    pub fn new(now: u32, interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_sample: now,
            value: 0,
        }
    }

    /// Sample if the period has elapsed. Values already taken are never
    /// re-converted when `units` changes.
    pub fn poll<S: SensorReader>(&mut self, now: u32, sensor: &mut S, units: Units) -> Option<Sample> {
        if now.wrapping_sub(self.last_sample) <= self.interval_ms {
            return None;
        }
        self.last_sample = now;

        let raw = sensor.read_raw();
        self.value = convert(raw, units);
        Some(Sample {
            value: self.value,
            fault: is_fault(raw),
        })
    }

    /// Latest converted reading, 0 before the first sample.
    pub fn value(&self) -> u16 {
        self.value
    }
}
