//! Attack-delay gate measured in deciseconds.

use serde::{Deserialize, Serialize};

/// Default delay between swings: 3.0 seconds.
pub const DEFAULT_WEAPON_DELAY: i64 = 30;

/// Per-actor cooldown on the attack command.
///
/// All values are deciseconds; the caller supplies `now` on the same
/// scale so the engine never reads a wall clock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    last_fired: i64,
    delay: i64,
}

impl Timer {
    pub fn new(delay: i64) -> Self {
        Self {
            last_fired: 0,
            delay,
        }
    }

    /// Record a swing at `now`, optionally replacing the stored delay.
    pub fn update(&mut self, now: i64, delay: Option<i64>) {
        if let Some(delay) = delay {
            self.delay = delay;
        }
        self.last_fired = now;
    }

    /// Deciseconds until the next swing is allowed; 0 when ready.
    pub fn time_left(&self, now: i64) -> i64 {
        (self.last_fired + self.delay - now).max(0)
    }

    pub fn delay(&self) -> i64 {
        self.delay
    }

    pub fn set_delay(&mut self, delay: i64) {
        self.delay = delay;
    }

    pub fn modify_delay(&mut self, amount: i64) {
        self.delay += amount;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_WEAPON_DELAY)
    }
}

/// "Please wait N more seconds" text for a rejected action.
///
/// Takes the remaining time in deciseconds, matching `Timer::time_left`.
pub fn please_wait(deciseconds: i64) -> String {
    let seconds = deciseconds.abs() as f64 / 10.0;
    if seconds > 60.0 {
        let whole = seconds as i64;
        format!("Please wait {}:{:02} minutes.", whole / 60, whole % 60)
    } else if deciseconds.abs() == 10 {
        "Please wait 1.0 more second.".to_string()
    } else {
        format!("Please wait {:.1} more seconds.", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_gates_until_delay_passes() {
        let mut timer = Timer::default();
        timer.update(100, None);
        assert_eq!(timer.time_left(100), 30);
        assert_eq!(timer.time_left(115), 15);
        assert_eq!(timer.time_left(130), 0);
        assert_eq!(timer.time_left(500), 0);
    }

    #[test]
    fn test_update_with_new_delay() {
        let mut timer = Timer::default();
        timer.update(0, Some(50));
        assert_eq!(timer.delay(), 50);
        assert_eq!(timer.time_left(40), 10);
        timer.modify_delay(-20);
        assert_eq!(timer.time_left(40), 0);
    }

    #[test]
    fn test_please_wait_text() {
        assert_eq!(please_wait(10), "Please wait 1.0 more second.");
        assert_eq!(please_wait(25), "Please wait 2.5 more seconds.");
        assert_eq!(please_wait(6100), "Please wait 10:10 minutes.");
    }
}
