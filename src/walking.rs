//! Continuous walking controller: debounced step pulses start a hold, a
//! polled timeout since the last step releases it.

use std::time::Instant;

use crate::config::Thresholds;

/// Two-state machine (`Idle` / `Walking`) driven by step pulses and the
/// passage of time. Callers pass the clock in explicitly, so the controller
/// is deterministic under test.
pub struct WalkingController {
    is_walking: bool,
    last_step: Option<Instant>,
}

impl WalkingController {
    pub fn new() -> Self {
        Self {
            is_walking: false,
            last_step: None,
        }
    }

    /// Feed one step pulse. Pulses inside the debounce window are sensor
    /// chatter from a single physical step and are dropped entirely; they do
    /// not refresh `last_step`. Returns `true` on the Idle→Walking
    /// transition, i.e. when the caller must start the hold.
    pub fn on_step(&mut self, now: Instant, t: &Thresholds) -> bool {
        if let Some(last) = self.last_step {
            if now.duration_since(last).as_secs_f32() <= t.step_debounce_sec {
                return false;
            }
        }

        self.last_step = Some(now);
        if self.is_walking {
            false
        } else {
            self.is_walking = true;
            true
        }
    }

    /// Timeout check, run on every incoming packet and on idle ticks. This is
    /// a polling-style timeout, not a scheduled timer: release happens on the
    /// first poll after the deadline, which at packet rates is close enough.
    /// Returns `true` on the Walking→Idle transition, i.e. when the caller
    /// must release the hold.
    pub fn poll(&mut self, now: Instant, t: &Thresholds) -> bool {
        if !self.is_walking {
            return false;
        }
        let last = match self.last_step {
            Some(last) => last,
            None => return false,
        };

        if now.duration_since(last).as_secs_f32() > t.walk_timeout_sec {
            self.is_walking = false;
            true
        } else {
            false
        }
    }

    /// Teardown path: leave `Walking` unconditionally. Returns `true` if a
    /// hold was active and must be released.
    pub fn force_stop(&mut self) -> bool {
        std::mem::replace(&mut self.is_walking, false)
    }

    pub fn is_walking(&self) -> bool {
        self.is_walking
    }
}

impl Default for WalkingController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn chattering_steps_start_exactly_one_walk() {
        let t = Thresholds::default(); // 0.3 s debounce
        let mut walk = WalkingController::new();
        let base = Instant::now();

        assert!(walk.on_step(at(base, 0), &t));
        // 100 ms later: inside the debounce window, ignored.
        assert!(!walk.on_step(at(base, 100), &t));
        assert!(walk.is_walking());
    }

    #[test]
    fn debounced_step_does_not_refresh_last_step() {
        let t = Thresholds::default(); // 1.5 s timeout
        let mut walk = WalkingController::new();
        let base = Instant::now();

        walk.on_step(at(base, 0), &t);
        // Chatter at 100 ms is dropped, so the timeout still counts from 0.
        walk.on_step(at(base, 100), &t);
        assert!(walk.poll(at(base, 1550), &t));
    }

    #[test]
    fn timeout_releases_exactly_once() {
        let t = Thresholds::default();
        let mut walk = WalkingController::new();
        let base = Instant::now();

        assert!(walk.on_step(at(base, 0), &t));
        assert!(!walk.poll(at(base, 1000), &t));
        // 1.6 s of silence against the 1.5 s timeout.
        assert!(walk.poll(at(base, 1600), &t));
        assert!(!walk.is_walking());

        // No further release events after the transition.
        assert!(!walk.poll(at(base, 2000), &t));
        assert!(!walk.poll(at(base, 5000), &t));
    }

    #[test]
    fn steady_steps_keep_the_hold_alive() {
        let t = Thresholds::default();
        let mut walk = WalkingController::new();
        let base = Instant::now();

        assert!(walk.on_step(at(base, 0), &t));
        for i in 1..=6 {
            // One step every 500 ms: past the debounce, inside the timeout.
            assert!(!walk.on_step(at(base, i * 500), &t));
            assert!(!walk.poll(at(base, i * 500 + 100), &t));
        }
        assert!(walk.is_walking());

        // Silence after the last step eventually releases.
        assert!(walk.poll(at(base, 6 * 500 + 1600), &t));
    }

    #[test]
    fn force_stop_reports_active_hold_once() {
        let t = Thresholds::default();
        let mut walk = WalkingController::new();
        let base = Instant::now();

        assert!(!walk.force_stop());
        walk.on_step(base, &t);
        assert!(walk.force_stop());
        assert!(!walk.force_stop());
    }
}
