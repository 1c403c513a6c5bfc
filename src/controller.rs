//! One polling period of the fan controller.
//!
//! [`Controller`] owns every piece of interactive state: the encoder
//! decoder, button debouncer, backlight timer, menu, sensor sampler and
//! settings store. The main loop calls [`Controller::poll`] at a fixed
//! cadence and logs the returned [`PollReport`].

use crate::backlight::BacklightTimer;
use crate::config::{
    DisplayGeometry, BACKLIGHT_CHECK_INTERVAL_MS, BACKLIGHT_TIMEOUT_MS, BUTTON_DEBOUNCE_MS,
    NVM_MAX_BUSY_POLLS, SENSOR_INTERVAL_MS,
};
use crate::debounce::{ButtonEvent, Debouncer};
use crate::display::Display;
use crate::encoder::{QuadratureCounter, QuadratureDecoder};
use crate::error::StorageError;
use crate::menu::{Menu, MenuOutcome, MenuState};
use crate::sensor::{Sample, SensorReader, SensorSampler};
use crate::storage::{OptionRegion, SettingsStore};

/// What happened during one [`Controller::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Detents turned since the previous poll (signed).
    pub detents: i32,
    pub button: ButtonEvent,
    /// Result of a save triggered by leaving the menu.
    pub saved: Option<Result<(), StorageError>>,
    pub sample: Option<Sample>,
    /// The backlight was switched on by this poll.
    pub woke: bool,
    /// The backlight was switched off by this poll.
    pub blanked: bool,
    pub redrawn: bool,
    /// Menu state after the poll.
    pub state: MenuState,
}

/// Interactive core of the fan controller.
pub struct Controller<C, S, R> {
    encoder: QuadratureDecoder<C>,
    button: Debouncer,
    backlight: BacklightTimer,
    menu: Menu,
    sampler: SensorSampler,
    sensor: S,
    store: SettingsStore<R>,
    storage_fault: Option<StorageError>,
}

impl<C, S, R> Controller<C, S, R>
where
    C: QuadratureCounter,
    S: SensorReader,
    R: OptionRegion,
{
    /// Build the controller, loading the thresholds from `region`. The
    /// encoder's current count becomes position zero.
    pub fn new(counter: C, sensor: S, region: R, geometry: DisplayGeometry, now: u32) -> Self {
        let store = SettingsStore::new(region, NVM_MAX_BUSY_POLLS);
        let settings = store.load();

        Self {
            encoder: QuadratureDecoder::new(counter),
            button: Debouncer::new(BUTTON_DEBOUNCE_MS),
            backlight: BacklightTimer::new(now, BACKLIGHT_TIMEOUT_MS, BACKLIGHT_CHECK_INTERVAL_MS),
            menu: Menu::new(settings, geometry),
            sampler: SensorSampler::new(now, SENSOR_INTERVAL_MS),
            sensor,
            store,
            storage_fault: None,
        }
    }

    /// Switch the backlight on and draw the first screen.
    pub fn start<D: Display>(&mut self, display: &mut D) {
        display.set_backlight(true);
        self.redraw(display);
    }

    /// Run one loop period. `button_level` is the raw pin level (low =
    /// pressed).
    pub fn poll<D: Display>(&mut self, now: u32, button_level: bool, display: &mut D) -> PollReport {
        let mut redraw = false;
        let mut woke = false;
        let mut saved = None;

        // Encoder: one menu step per detent.
        let before = self.encoder.position();
        let detents = self.encoder.poll().wrapping_sub(before);
        if detents != 0 {
            woke |= self.backlight.wake(now);
            let direction: i8 = if detents > 0 { 1 } else { -1 };
            for _ in 0..detents.unsigned_abs() {
                let outcome = self.menu.rotate(direction);
                redraw |= self.apply(outcome, &mut saved);
            }
        }

        // Button
        let button = self.button.sample(button_level, now, &mut self.backlight);
        match button {
            ButtonEvent::Pressed => {
                let outcome = self.menu.press();
                redraw |= self.apply(outcome, &mut saved);
            }
            ButtonEvent::ConsumedByWake => {
                woke = true;
                redraw = true;
            }
            ButtonEvent::Idle => {}
        }

        if woke {
            display.set_backlight(true);
        }

        // Sensor
        let sample = self
            .sampler
            .poll(now, &mut self.sensor, self.menu.settings().units);
        if sample.is_some() && self.backlight.is_on() {
            redraw = true;
        }

        // Backlight
        let idle = self.backlight.tick(now, self.menu.state());
        if idle.should_blank {
            display.set_backlight(false);
        }

        if redraw {
            self.redraw(display);
        }

        PollReport {
            detents,
            button,
            saved,
            sample,
            woke,
            blanked: idle.should_blank,
            redrawn: redraw,
            state: self.menu.state(),
        }
    }

    /// Render the current menu state and push it to the panel.
    pub fn redraw<D: Display>(&self, display: &mut D) {
        self.menu
            .render(display, self.sampler.value(), self.storage_fault.is_some());
        display.flush();
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn backlight(&self) -> &BacklightTimer {
        &self.backlight
    }

    pub fn store(&self) -> &SettingsStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore<R> {
        &mut self.store
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn counter_mut(&mut self) -> &mut C {
        self.encoder.counter_mut()
    }

    /// Latest converted sensor reading.
    pub fn reading(&self) -> u16 {
        self.sampler.value()
    }

    /// Error from the most recent failed save, cleared by the next
    /// successful one.
    pub fn storage_fault(&self) -> Option<StorageError> {
        self.storage_fault
    }

    /// Act on a menu outcome; returns whether a redraw is needed.
    fn apply(
        &mut self,
        outcome: MenuOutcome,
        saved: &mut Option<Result<(), StorageError>>,
    ) -> bool {
        match outcome {
            MenuOutcome::Ignored => false,
            MenuOutcome::Redraw => true,
            MenuOutcome::Save => {
                let result = self.store.save(self.menu.settings());
                self.storage_fault = result.err();
                *saved = Some(result);
                true
            }
        }
    }
}
