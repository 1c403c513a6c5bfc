//! Time-based push-button debouncing.
//!
//! The button is active-low with a pull-up. A level change is accepted once
//! the raw input has held it for longer than the debounce window; only the
//! press edge reaches the menu. While the backlight is off the first press
//! just wakes the display.

use crate::backlight::BacklightTimer;

/// Debounced level transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// High → low.
    Pressed,
    /// Low → high.
    Released,
}

/// Button outcome for one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Nothing to act on.
    Idle,
    /// A press to forward to the menu.
    Pressed,
    /// A press that only restored the backlight.
    ConsumedByWake,
}

/// Debouncer for a single active-low input.
#[derive(Clone, Debug)]
pub struct Debouncer {
    window_ms: u32,
    last_raw: bool,
    last_change: u32,
    stable: bool,
}

impl Debouncer {
    /// Both the raw and debounced level start high (released).
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            last_raw: true,
            last_change: 0,
            stable: true,
        }
    }

    /// Debounced level; `false` means held down.
    pub fn is_high(&self) -> bool {
        self.stable
    }

    /// Feed one raw sample. Returns an edge when the debounced level flips.
    pub fn edge(&mut self, raw_level: bool, now: u32) -> Option<Edge> {
        if raw_level != self.last_raw {
            self.last_change = now;
        }
        self.last_raw = raw_level;

        if now.wrapping_sub(self.last_change) > self.window_ms && raw_level != self.stable {
            self.stable = raw_level;
            return Some(if raw_level {
                Edge::Released
            } else {
                Edge::Pressed
            });
        }
        None
    }

    /// Feed one raw sample and classify it for the menu.
    ///
    /// A press with the backlight off turns it back on and is consumed.
    pub fn sample(&mut self, raw_level: bool, now: u32, backlight: &mut BacklightTimer) -> ButtonEvent {
        match self.edge(raw_level, now) {
            Some(Edge::Pressed) => {
                if backlight.wake(now) {
                    ButtonEvent::ConsumedByWake
                } else {
                    ButtonEvent::Pressed
                }
            }
            Some(Edge::Released) | None => ButtonEvent::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuState;

    /// Feed `level` every 10 ms from `start` up to and including `end`,
    /// collecting edges.
    fn hold(d: &mut Debouncer, level: bool, start: u32, end: u32) -> Vec<(u32, Edge)> {
        (start..=end)
            .step_by(10)
            .filter_map(|t| d.edge(level, t).map(|e| (t, e)))
            .collect()
    }

    #[test]
    fn steady_high_produces_nothing() {
        let mut d = Debouncer::new(50);
        assert!(hold(&mut d, true, 0, 1000).is_empty());
        assert!(d.is_high());
    }

    #[test]
    fn press_reported_after_window() {
        let mut d = Debouncer::new(50);
        hold(&mut d, true, 0, 100);
        let edges = hold(&mut d, false, 110, 300);
        assert_eq!(edges, vec![(170, Edge::Pressed)]);
        assert!(!d.is_high());
    }

    #[test]
    fn release_reported_after_window() {
        let mut d = Debouncer::new(50);
        hold(&mut d, false, 100, 300);
        let edges = hold(&mut d, true, 310, 500);
        assert_eq!(edges, vec![(370, Edge::Released)]);
    }

    #[test]
    fn bounce_shorter_than_window_is_absorbed() {
        let mut d = Debouncer::new(50);
        hold(&mut d, true, 0, 100);
        let mut edges = Vec::new();
        for (i, t) in (110..200).step_by(10).enumerate() {
            if let Some(e) = d.edge(i % 2 == 0, t) {
                edges.push(e);
            }
        }
        assert!(edges.is_empty());
        assert!(d.is_high());
    }

    #[test]
    fn exactly_window_is_not_enough() {
        let mut d = Debouncer::new(50);
        hold(&mut d, true, 0, 100);
        assert_eq!(d.edge(false, 200), None);
        assert_eq!(d.edge(false, 250), None);
        assert_eq!(d.edge(false, 251), Some(Edge::Pressed));
    }

    #[test]
    fn sample_forwards_press_only() {
        let mut d = Debouncer::new(50);
        let mut bl = BacklightTimer::new(0, 10_000, 1000);
        let mut events = Vec::new();
        for t in (0..=200).step_by(10) {
            events.push(d.sample(false, t, &mut bl));
        }
        for t in (210..=400).step_by(10) {
            events.push(d.sample(true, t, &mut bl));
        }
        let presses = events.iter().filter(|e| **e == ButtonEvent::Pressed).count();
        assert_eq!(presses, 1);
        assert!(!events.contains(&ButtonEvent::ConsumedByWake));
    }

    #[test]
    fn press_with_backlight_off_is_consumed() {
        let mut d = Debouncer::new(50);
        let mut bl = BacklightTimer::new(0, 10_000, 1000);
        bl.tick(11_000, MenuState::Displaying);
        assert!(!bl.is_on());

        let mut events = Vec::new();
        for t in (11_000..=11_200).step_by(10) {
            events.push(d.sample(false, t, &mut bl));
        }
        assert!(events.contains(&ButtonEvent::ConsumedByWake));
        assert!(!events.contains(&ButtonEvent::Pressed));
        assert!(bl.is_on());

        // Release, then the next press acts normally.
        for t in (11_210..=11_400).step_by(10) {
            d.sample(true, t, &mut bl);
        }
        let mut second = Vec::new();
        for t in (11_410..=11_600).step_by(10) {
            second.push(d.sample(false, t, &mut bl));
        }
        assert!(second.contains(&ButtonEvent::Pressed));
    }
}
