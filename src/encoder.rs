//! Rotary encoder decoding.
//!
//! The hardware (or [`PhaseDecoder`]) owns a free-running 16-bit up/down
//! counter of quadrature sub-steps. [`QuadratureDecoder`] turns that counter
//! into a signed detent position that never wraps, so it may be polled less
//! often than the counter changes as long as fewer than 32768 sub-steps
//! happen between polls.

use crate::config::PULSES_PER_DETENT;

/// Number of back-to-back reads tried while waiting for two to agree.
const MAX_READ_ATTEMPTS: usize = 4;

/// A free-running two-phase up/down counter.
pub trait QuadratureCounter {
    /// Current raw count. Wraps at the 16-bit boundary.
    fn read_count(&mut self) -> u16;
}

impl<C: QuadratureCounter + ?Sized> QuadratureCounter for &mut C {
    fn read_count(&mut self) -> u16 {
        (**self).read_count()
    }
}

/// Converts raw sub-step counts into detents.
pub struct QuadratureDecoder<C> {
    counter: C,
    last_raw: u16,
    ticks: i32,
    position: i32,
}

impl<C: QuadratureCounter> QuadratureDecoder<C> {
    /// Wrap `counter`; the count at this moment becomes position zero.
    pub fn new(mut counter: C) -> Self {
        let last_raw = read_consistent(&mut counter);
        Self {
            counter,
            last_raw,
            ticks: 0,
            position: 0,
        }
    }

    /// Sample the counter and return the detent position since creation.
    pub fn poll(&mut self) -> i32 {
        let raw = read_consistent(&mut self.counter);
        let step = raw.wrapping_sub(self.last_raw) as i16;
        self.last_raw = raw;
        self.ticks = self.ticks.wrapping_add(i32::from(step));
        // Floor division keeps every detent four sub-steps wide, including
        // the one straddling zero.
        self.position = self.ticks.div_euclid(PULSES_PER_DETENT);
        self.position
    }

    /// Position returned by the most recent [`poll`](Self::poll).
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }
}

/// Read until two consecutive samples agree so a multi-byte register
/// updated mid-read is never taken at face value.
fn read_consistent<C: QuadratureCounter>(counter: &mut C) -> u16 {
    let mut previous = counter.read_count();
    for _ in 0..MAX_READ_ATTEMPTS {
        let current = counter.read_count();
        if current == previous {
            return current;
        }
        previous = current;
    }
    previous
}

/// Gray-code transition table indexed by `(previous << 2) | current`.
/// Invalid (double-step) transitions count as zero.
const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Software quadrature decoder fed with sampled phase levels.
///
/// Stands in for a hardware counter when the encoder pins are polled
/// directly. A leading A phase counts up.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseDecoder {
    phases: u8,
    count: u16,
}

impl PhaseDecoder {
    /// Start from the current pin levels so the first sample is not a step.
    pub fn new(a: bool, b: bool) -> Self {
        Self {
            phases: Self::pack(a, b),
            count: 0,
        }
    }

    /// Feed one sample of both phases; returns the sub-step taken (-1, 0, 1).
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        let current = Self::pack(a, b);
        let step = TRANSITIONS[usize::from((self.phases << 2) | current)];
        self.phases = current;
        self.count = self.count.wrapping_add(step as u16);
        step
    }

    fn pack(a: bool, b: bool) -> u8 {
        (u8::from(a) << 1) | u8::from(b)
    }
}

impl QuadratureCounter for PhaseDecoder {
    fn read_count(&mut self) -> u16 {
        self.count
    }
}
