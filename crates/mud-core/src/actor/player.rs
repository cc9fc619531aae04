//! Player-side data: classes, deities, races, alignment banding.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::actor::flags::PlayerFlags;
use crate::actor::skills::SkillTable;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum CreatureClass {
    Assassin,
    Bard,
    Berserker,
    Cleric,
    Deathknight,
    Druid,
    Fighter,
    Lich,
    Mage,
    Monk,
    Paladin,
    Pureblood,
    Ranger,
    Rogue,
    Thief,
    Werewolf,
    // Staff classes
    Builder,
    Caretaker,
    DungeonMaster,
}

impl CreatureClass {
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            CreatureClass::Builder | CreatureClass::Caretaker | CreatureClass::DungeonMaster
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Deity {
    Aramon,
    Arachnus,
    Ares,
    Ceris,
    Enoch,
    Gradius,
    Jakar,
    Kamira,
    Linothan,
    Mara,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Race {
    Barbarian,
    Dwarf,
    Elf,
    Gnome,
    Goblin,
    HalfElf,
    HalfGiant,
    Halfling,
    Human,
    Kataran,
    Kobold,
    Minotaur,
    Orc,
    Tiefling,
}

impl Race {
    /// Small races that giantkin attackers have trouble connecting with.
    pub fn is_small(&self) -> bool {
        matches!(
            self,
            Race::Gnome | Race::Goblin | Race::Halfling | Race::Kobold
        )
    }
}

/// Alignment banding. Players band wider than monsters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdjustedAlignment {
    BloodRed,
    Reddish,
    Pinkish,
    Neutral,
    LightBlue,
    Bluish,
    RoyalBlue,
}

impl AdjustedAlignment {
    pub fn for_player(alignment: i32) -> Self {
        match alignment {
            a if a <= -400 => AdjustedAlignment::BloodRed,
            a if a <= -200 => AdjustedAlignment::Reddish,
            a if a <= -100 => AdjustedAlignment::Pinkish,
            a if a < 100 => AdjustedAlignment::Neutral,
            a if a < 200 => AdjustedAlignment::LightBlue,
            a if a < 400 => AdjustedAlignment::Bluish,
            _ => AdjustedAlignment::RoyalBlue,
        }
    }

    pub fn for_monster(alignment: i32) -> Self {
        match alignment {
            a if a <= -200 => AdjustedAlignment::BloodRed,
            a if a < -50 => AdjustedAlignment::Reddish,
            a if a < 0 => AdjustedAlignment::Pinkish,
            0 => AdjustedAlignment::Neutral,
            a if a < 50 => AdjustedAlignment::LightBlue,
            a if a < 200 => AdjustedAlignment::Bluish,
            _ => AdjustedAlignment::RoyalBlue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub second_class: Option<CreatureClass>,
    pub skills: SkillTable,
    pub flags: PlayerFlags,
}

impl PlayerData {
    pub fn new() -> Self {
        Self {
            second_class: None,
            skills: SkillTable::new(),
            flags: PlayerFlags::empty(),
        }
    }
}

impl Default for PlayerData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_alignment_bands() {
        assert_eq!(
            AdjustedAlignment::for_player(-500),
            AdjustedAlignment::BloodRed
        );
        assert_eq!(
            AdjustedAlignment::for_player(-150),
            AdjustedAlignment::Pinkish
        );
        assert_eq!(AdjustedAlignment::for_player(0), AdjustedAlignment::Neutral);
        assert_eq!(
            AdjustedAlignment::for_player(250),
            AdjustedAlignment::Bluish
        );
        assert_eq!(
            AdjustedAlignment::for_player(400),
            AdjustedAlignment::RoyalBlue
        );
    }

    #[test]
    fn test_monster_alignment_bands() {
        assert_eq!(
            AdjustedAlignment::for_monster(-200),
            AdjustedAlignment::BloodRed
        );
        assert_eq!(
            AdjustedAlignment::for_monster(-10),
            AdjustedAlignment::Pinkish
        );
        assert_eq!(
            AdjustedAlignment::for_monster(0),
            AdjustedAlignment::Neutral
        );
        assert_eq!(
            AdjustedAlignment::for_monster(10),
            AdjustedAlignment::LightBlue
        );
        assert_eq!(
            AdjustedAlignment::for_monster(200),
            AdjustedAlignment::RoyalBlue
        );
    }

    #[test]
    fn test_band_ordering() {
        assert!(AdjustedAlignment::BloodRed < AdjustedAlignment::Neutral);
        assert!(AdjustedAlignment::RoyalBlue > AdjustedAlignment::Bluish);
    }
}
