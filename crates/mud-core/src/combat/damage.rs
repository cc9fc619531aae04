//! Damage value object accumulated through the attack pipeline.

use serde::{Deserialize, Serialize};

/// Classification of physically-reflected damage (thorn shields and the
/// like fill this in through the victim's damage-modification hook).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReflectedDamageType {
    #[default]
    None,
    Magic,
    Physical,
    FireShield,
}

/// One attack's worth of damage.
///
/// The base amount and the bonus pool are tracked separately because
/// multi-attack weapons spread the bonus across the whole swing series.
/// The reflected channels are populated by the victim-side modification
/// hook and read back by the caller to hurt the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Damage {
    damage: i32,
    bonus: i32,
    drain: i32,
    reflected: i32,
    double_reflected: i32,
    physical_reflected: i32,
    physical_reflected_type: ReflectedDamageType,
    physical_bonus_reflected: i32,
}

impl Damage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i32 {
        self.damage
    }

    pub fn set(&mut self, d: i32) {
        self.damage = d;
    }

    pub fn add(&mut self, d: i32) {
        self.damage += d;
    }

    pub fn bonus(&self) -> i32 {
        self.bonus
    }

    pub fn set_bonus_amount(&mut self, b: i32) {
        self.bonus = b;
    }

    /// Attach a separately-computed bonus pool, carrying its physical
    /// reflection along so `include_bonus` can fold both back in.
    pub fn set_bonus(&mut self, dmg: Damage) {
        self.bonus = dmg.get();
        self.physical_bonus_reflected = dmg.physical_reflected();
    }

    /// Fold `1/fraction` of the bonus pool into the base damage.
    /// A zero fraction means the whole pool.
    pub fn include_bonus(&mut self, fraction: i32) {
        let fraction = if fraction == 0 { 1 } else { fraction };
        self.damage += self.bonus / fraction;
        self.physical_reflected += self.physical_bonus_reflected / fraction;
    }

    pub fn drain(&self) -> i32 {
        self.drain
    }

    pub fn set_drain(&mut self, d: i32) {
        self.drain = d;
    }

    pub fn reflected(&self) -> i32 {
        self.reflected
    }

    pub fn set_reflected(&mut self, r: i32) {
        self.reflected = r;
    }

    pub fn double_reflected(&self) -> i32 {
        self.double_reflected
    }

    pub fn set_double_reflected(&mut self, r: i32) {
        self.double_reflected = r;
    }

    pub fn physical_reflected(&self) -> i32 {
        self.physical_reflected
    }

    pub fn set_physical_reflected(&mut self, r: i32) {
        self.physical_reflected = r;
    }

    pub fn physical_reflected_type(&self) -> ReflectedDamageType {
        self.physical_reflected_type
    }

    pub fn set_physical_reflected_type(&mut self, t: ReflectedDamageType) {
        self.physical_reflected_type = t;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
