//! Attack resolution and damage computation.

pub mod compute;
pub mod damage;
pub mod resolve;
pub mod timer;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::Display;

pub use compute::{
    compute_damage, DamageCtx, DamageKind, DamageModifier, DamageOutcome, Offguard,
    PassThroughModifier,
};
pub use damage::{Damage, ReflectedDamageType};
pub use resolve::{get_attack_result, riposte_roll, AttackContext, CutoffTable};
pub use timer::{please_wait, Timer, DEFAULT_WEAPON_DELAY};

/// Categorical outcome of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum AttackResult {
    Miss,
    Dodge,
    Parry,
    Riposte,
    Glancing,
    Block,
    Critical,
    Fumble,
    Hit,
}

/// Kind of swing being resolved; special attacks use bespoke damage
/// formulas and alternate proficiencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AttackType {
    Normal,
    Kick,
    Maul,
    Gore,
    Bash,
    Backstab,
}

bitflags! {
    /// Outcome categories a caller can disable for a given roll.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ResultFlags: u32 {
        const DOUBLE_MISS = 1 << 0;
        const NO_DODGE    = 1 << 1;
        const NO_PARRY    = 1 << 2;
        const NO_GLANCING = 1 << 3;
        const NO_BLOCK    = 1 << 4;
        const NO_CRITICAL = 1 << 5;
        const NO_FUMBLE   = 1 << 6;
    }
}

impl ResultFlags {
    /// Restriction set for a riposte re-roll: only miss or hit remain.
    pub fn riposte() -> Self {
        ResultFlags::DOUBLE_MISS
            | ResultFlags::NO_DODGE
            | ResultFlags::NO_PARRY
            | ResultFlags::NO_GLANCING
            | ResultFlags::NO_BLOCK
            | ResultFlags::NO_CRITICAL
            | ResultFlags::NO_FUMBLE
    }
}
