//! Attack power and the base-damage bonus pool derived from it.

use crate::actor::{Creature, CreatureClass, Deity};

impl Creature {
    /// Class-driven attack power. Monsters run the same table through
    /// their assigned class (most default to Fighter).
    pub fn compute_attack_power(&self) -> i32 {
        let str_cur = self.strength.cur();
        let dex_cur = self.dexterity.cur();
        let pie_cur = self.piety.cur();
        let level = self.level;

        match self.class {
            CreatureClass::Fighter | CreatureClass::DungeonMaster => {
                match self.second_class() {
                    Some(CreatureClass::Mage) => str_cur * 2 + level,
                    Some(CreatureClass::Thief) => str_cur * 2 + level * 4,
                    _ => str_cur * 2 + level * 8,
                }
            }
            CreatureClass::Berserker => str_cur * 2 + level * 8,
            CreatureClass::Paladin | CreatureClass::Deathknight => str_cur + pie_cur + level * 4,
            CreatureClass::Bard | CreatureClass::Werewolf | CreatureClass::Pureblood => {
                str_cur * 2 + level * 4
            }
            CreatureClass::Ranger
            | CreatureClass::Thief
            | CreatureClass::Assassin
            | CreatureClass::Rogue
            | CreatureClass::Monk => str_cur + dex_cur + level * 4,
            CreatureClass::Druid => str_cur + level * 2,
            CreatureClass::Cleric => {
                let mut power = str_cur;
                if self.second_class() == Some(CreatureClass::Assassin) {
                    power += dex_cur;
                }
                match self.deity {
                    Some(Deity::Ceris) => power += level,
                    Some(Deity::Ares) => power += level * 8,
                    // Linothan's own bonus stacks with the Ares bonus,
                    // a quirk content has long been balanced around.
                    Some(Deity::Linothan) => power += level * 4 + level * 8,
                    _ => power += level * 2,
                }
                power
            }
            CreatureClass::Lich | CreatureClass::Mage => {
                let mut power = str_cur;
                if matches!(
                    self.second_class(),
                    Some(CreatureClass::Thief) | Some(CreatureClass::Assassin)
                ) {
                    power += dex_cur + level * 2;
                }
                power
            }
            _ => str_cur,
        }
    }

    /// Bonus-damage pool fed into multi-attack spreading.
    pub fn base_damage(&self) -> i32 {
        self.compute_attack_power() / 15
    }
}
