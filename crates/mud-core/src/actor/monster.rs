//! Monster-side data.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::actor::flags::MonsterFlags;

/// Broad creature kind. Drives the parry gates: some kinds cannot be
/// parried at all, some are merely harder to riposte against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum CreatureType {
    Humanoid,
    Dragon,
    Demon,
    Devil,
    Giantkin,
    Deva,
    Dinosaur,
    Elemental,
    Modron,
    Daemon,
    Insect,
    Avian,
    Fish,
    Reptile,
    Plant,
    Ethereal,
    Astral,
    Gaseous,
    Energy,
    Pudding,
    Slime,
    Undead,
}

impl CreatureType {
    /// Kinds too powerful or alien to parry at full effectiveness.
    pub fn halves_parry(&self) -> bool {
        matches!(
            self,
            CreatureType::Dragon
                | CreatureType::Demon
                | CreatureType::Devil
                | CreatureType::Giantkin
                | CreatureType::Deva
                | CreatureType::Dinosaur
                | CreatureType::Elemental
                | CreatureType::Modron
                | CreatureType::Daemon
        )
    }

    /// Kinds whose attacks cannot be parried at all: no rigid limbs or
    /// weapons to turn aside.
    pub fn unparryable(&self) -> bool {
        matches!(
            self,
            CreatureType::Insect
                | CreatureType::Avian
                | CreatureType::Fish
                | CreatureType::Reptile
                | CreatureType::Plant
                | CreatureType::Ethereal
                | CreatureType::Astral
                | CreatureType::Gaseous
                | CreatureType::Energy
                | CreatureType::Pudding
                | CreatureType::Slime
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterData {
    /// Flat skill values; monsters have no named-skill table.
    pub weapon_skill: i32,
    pub defense_skill: i32,
    pub creature_type: CreatureType,
    pub flags: MonsterFlags,
}

impl MonsterData {
    pub fn new(weapon_skill: i32, defense_skill: i32) -> Self {
        Self {
            weapon_skill,
            defense_skill,
            creature_type: CreatureType::Humanoid,
            flags: MonsterFlags::empty(),
        }
    }
}
