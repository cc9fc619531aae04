//! Core attribute triples and the stat-bonus lookup table.

use serde::{Deserialize, Serialize};

/// Bonus table indexed by `stat / 10`. Stats are stored on a 10x scale
/// (a dexterity of 18 is stored as 180), so index 8..13 covers the
/// "average human" band with no bonus.
const STAT_BONUS: [i32; 40] = [
    -4, -4, -4, // 0 - 2
    -3, -3, // 3 - 4
    -2, -2, // 5 - 6
    -1, // 7
    0, 0, 0, 0, 0, 0, // 8 - 13
    1, 1, 1, // 14 - 16
    2, 2, 2, 2, // 17 - 20
    3, 3, 3, 3, // 21 - 24
    4, 4, 4, // 25 - 27
    5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, // 28+
];

/// Strength/dexterity style bonus for a raw stat value.
pub fn stat_bonus(num: i32) -> i32 {
    let idx = (num.max(0) / 10).min(STAT_BONUS.len() as i32 - 1) as usize;
    STAT_BONUS[idx]
}

/// A current/max/initial attribute triple.
///
/// Hit points and the five core attributes all use this shape; combat
/// only ever reads `cur`, but damage and drains adjust it against `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    cur: i32,
    max: i32,
    initial: i32,
}

impl Stat {
    pub fn new(value: i32) -> Self {
        Self {
            cur: value,
            max: value,
            initial: value,
        }
    }

    pub fn cur(&self) -> i32 {
        self.cur
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn initial(&self) -> i32 {
        self.initial
    }

    pub fn set_cur(&mut self, value: i32) {
        self.cur = value.min(self.max);
    }

    pub fn set_max(&mut self, value: i32) {
        self.max = value;
        self.cur = self.cur.min(self.max);
    }

    /// Lower the current value, flooring at 0. Returns the new current.
    pub fn decrease(&mut self, amount: i32) -> i32 {
        self.cur = (self.cur - amount).max(0);
        self.cur
    }

    /// Raise the current value, capped at max. Returns the new current.
    pub fn increase(&mut self, amount: i32) -> i32 {
        self.cur = (self.cur + amount).min(self.max);
        self.cur
    }

    pub fn restore(&mut self) {
        self.cur = self.max;
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_bonus_bands() {
        assert_eq!(stat_bonus(0), -4);
        assert_eq!(stat_bonus(75), -1);
        assert_eq!(stat_bonus(85), 0);
        assert_eq!(stat_bonus(130), 0);
        assert_eq!(stat_bonus(140), 1);
        assert_eq!(stat_bonus(180), 2);
        assert_eq!(stat_bonus(250), 4);
        assert_eq!(stat_bonus(280), 5);
        // Out-of-table values clamp instead of indexing past the end.
        assert_eq!(stat_bonus(1000), 5);
        assert_eq!(stat_bonus(-30), -4);
    }

    #[test]
    fn test_stat_decrease_floors_at_zero() {
        let mut hp = Stat::new(20);
        assert_eq!(hp.decrease(25), 0);
        assert_eq!(hp.cur(), 0);
        hp.increase(5);
        assert_eq!(hp.cur(), 5);
        hp.increase(100);
        assert_eq!(hp.cur(), 20);
    }

    #[test]
    fn test_set_cur_respects_max() {
        let mut s = Stat::new(100);
        s.set_cur(150);
        assert_eq!(s.cur(), 100);
        s.set_max(80);
        assert_eq!(s.cur(), 80);
    }
}
