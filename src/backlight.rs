//! Backlight power-save timer.
//!
//! Tracks the time since the last user interaction and switches the display
//! backlight off once the controller has been idle on the reading screen for
//! longer than the timeout. Browsing or editing the menu never blanks.

use crate::menu::MenuState;

/// Decide whether the backlight should stay on given the idle time.
pub fn backlight_should_be_on(auto_off_enabled: bool, idle_ms: u32, timeout_ms: u32) -> bool {
    !(auto_off_enabled && idle_ms > timeout_ms)
}

/// Result of one [`BacklightTimer::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdleCheck {
    /// The backlight has just been switched off and the display must follow.
    pub should_blank: bool,
    /// Timestamp of the last interaction after this check.
    pub last_interaction: u32,
}

/// Idle tracker owning the backlight state.
#[derive(Clone, Debug)]
pub struct BacklightTimer {
    on: bool,
    last_interaction: u32,
    last_check: u32,
    timeout_ms: u32,
    check_interval_ms: u32,
}

impl BacklightTimer {
    /// Create a timer with the backlight on and idle time starting at `now`.
    pub fn new(now: u32, timeout_ms: u32, check_interval_ms: u32) -> Self {
        Self {
            on: true,
            last_interaction: now,
            last_check: now,
            timeout_ms,
            check_interval_ms,
        }
    }

    /// Record user activity (encoder detent or forwarded button press).
    pub fn touch(&mut self, now: u32) {
        self.last_interaction = now;
    }

    /// Restore the backlight. Returns `true` if it was off.
    pub fn wake(&mut self, now: u32) -> bool {
        self.last_interaction = now;
        let was_off = !self.on;
        self.on = true;
        was_off
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn last_interaction(&self) -> u32 {
        self.last_interaction
    }

    /// Periodic idle check. Does nothing until `check_interval_ms` has
    /// passed since the previous evaluation.
    pub fn tick(&mut self, now: u32, state: MenuState) -> IdleCheck {
        let mut should_blank = false;

        if now.wrapping_sub(self.last_check) >= self.check_interval_ms {
            self.last_check = now;
            let idle_ms = now.wrapping_sub(self.last_interaction);

            if !backlight_should_be_on(true, idle_ms, self.timeout_ms) {
                if state == MenuState::Displaying {
                    should_blank = self.on;
                    self.on = false;
                } else {
                    self.last_interaction = now;
                }
            }
        }

        IdleCheck {
            should_blank,
            last_interaction: self.last_interaction,
        }
    }
}
