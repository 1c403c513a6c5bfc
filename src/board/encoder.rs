//! QDEC-backed quadrature counter.
//!
//! The QDEC peripheral reports accumulated steps on each sample interrupt.
//! A dedicated task folds those reports into a 16-bit free-running count,
//! which the main loop reads through [`SharedCounter`]. The count is only
//! touched inside a critical section, so a read never observes half an
//! update.

use core::cell::Cell;

use defmt::trace;
use embassy_nrf::peripherals::QDEC;
use embassy_nrf::qdec::Qdec;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use thermofan::encoder::QuadratureCounter;

/// Raw sub-step count. Starts mid-range like a reset timer counter.
static RAW_COUNT: Mutex<CriticalSectionRawMutex, Cell<u16>> = Mutex::new(Cell::new(0x8FFF));

/// Accumulate QDEC reports forever.
#[embassy_executor::task]
pub async fn qdec_task(mut qdec: Qdec<'static, QDEC>) -> ! {
    loop {
        let steps = qdec.read().await;
        let count = RAW_COUNT.lock(|count| {
            let next = count.get().wrapping_add(steps as u16);
            count.set(next);
            next
        });
        trace!("QDEC: {} steps, count={}", steps, count);
    }
}

/// Main-loop view of the count maintained by [`qdec_task`].
pub struct SharedCounter;

impl QuadratureCounter for SharedCounter {
    fn read_count(&mut self) -> u16 {
        RAW_COUNT.lock(|count| count.get())
    }
}
