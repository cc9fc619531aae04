//! Creatures: the shared combat-capability surface plus the closed
//! player/monster variant.

pub mod attack_power;
pub mod flags;
pub mod monster;
pub mod player;
pub mod skills;

use serde::{Deserialize, Serialize};

use crate::combat::timer::{please_wait, Timer};
use crate::effects::catalog::EffectCatalog;
use crate::effects::collection::{EffectCollection, EffectCtx, RemovedEffect};
use crate::effects::script::{ParentRef, ScriptRunner};
use crate::object::{DamageDice, Equipment, Object, WearSlot};
use crate::rng::GameRng;
use crate::stats::{stat_bonus, Stat};
use crate::world::{MessageLog, RoomId};

pub use flags::{MonsterFlags, PlayerFlags};
pub use monster::{CreatureType, MonsterData};
pub use player::{AdjustedAlignment, CreatureClass, Deity, PlayerData, Race};
pub use skills::SkillTable;

/// Stable creature identifier, used as a weak reference by effects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ActorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// Closed variant: combat only ever distinguishes these two kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreatureKind {
    Player(PlayerData),
    Monster(MonsterData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: ActorId,
    pub name: String,
    pub level: i32,
    pub class: CreatureClass,
    pub deity: Option<Deity>,
    pub race: Race,
    pub alignment: i32,
    pub hp: Stat,
    pub strength: Stat,
    pub dexterity: Stat,
    pub constitution: Stat,
    pub intelligence: Stat,
    pub piety: Stat,
    /// Natural attack dice, used when nothing is wielded.
    pub damage: DamageDice,
    pub room: RoomId,
    pub group: Option<GroupId>,
    pub equipment: Equipment,
    pub effects: EffectCollection,
    pub attack_timer: Timer,
    /// Wall-clock second at which the next parry/riposte is allowed.
    pub riposte_ready_at: i64,
    pub kind: CreatureKind,
}

impl Creature {
    pub fn player(id: ActorId, name: &str, class: CreatureClass, race: Race) -> Self {
        Self {
            id,
            name: name.to_string(),
            level: 1,
            class,
            deity: None,
            race,
            alignment: 0,
            hp: Stat::new(20),
            strength: Stat::new(100),
            dexterity: Stat::new(100),
            constitution: Stat::new(100),
            intelligence: Stat::new(100),
            piety: Stat::new(100),
            damage: DamageDice::new(1, 4, 0),
            room: RoomId(0),
            group: None,
            equipment: Equipment::new(),
            effects: EffectCollection::new(),
            attack_timer: Timer::default(),
            riposte_ready_at: 0,
            kind: CreatureKind::Player(PlayerData::new()),
        }
    }

    pub fn monster(id: ActorId, name: &str, level: i32, weapon_skill: i32, defense_skill: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            level,
            class: CreatureClass::Fighter,
            deity: None,
            race: Race::Human,
            alignment: 0,
            hp: Stat::new(20 + level * 5),
            strength: Stat::new(100),
            dexterity: Stat::new(100),
            constitution: Stat::new(100),
            intelligence: Stat::new(100),
            piety: Stat::new(100),
            damage: DamageDice::new(1, 6, 0),
            room: RoomId(0),
            group: None,
            equipment: Equipment::new(),
            effects: EffectCollection::new(),
            attack_timer: Timer::default(),
            riposte_ready_at: 0,
            kind: CreatureKind::Monster(MonsterData::new(weapon_skill, defense_skill)),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CreatureKind::Player(_))
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, CreatureKind::Monster(_))
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.kind {
            CreatureKind::Player(data) => Some(data),
            CreatureKind::Monster(_) => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            CreatureKind::Player(data) => Some(data),
            CreatureKind::Monster(_) => None,
        }
    }

    pub fn monster_data(&self) -> Option<&MonsterData> {
        match &self.kind {
            CreatureKind::Monster(data) => Some(data),
            CreatureKind::Player(_) => None,
        }
    }

    pub fn monster_data_mut(&mut self) -> Option<&mut MonsterData> {
        match &mut self.kind {
            CreatureKind::Monster(data) => Some(data),
            CreatureKind::Player(_) => None,
        }
    }

    pub fn second_class(&self) -> Option<CreatureClass> {
        self.player_data().and_then(|p| p.second_class)
    }

    pub fn has_second_class(&self) -> bool {
        self.second_class().is_some()
    }

    pub fn player_flag(&self, flag: PlayerFlags) -> bool {
        self.player_data().is_some_and(|p| p.flags.contains(flag))
    }

    pub fn set_player_flag(&mut self, flag: PlayerFlags) {
        if let Some(p) = self.player_data_mut() {
            p.flags.insert(flag);
        }
    }

    pub fn monster_flag(&self, flag: MonsterFlags) -> bool {
        self.monster_data().is_some_and(|m| m.flags.contains(flag))
    }

    pub fn set_monster_flag(&mut self, flag: MonsterFlags) {
        if let Some(m) = self.monster_data_mut() {
            m.flags.insert(flag);
        }
    }

    pub fn creature_type(&self) -> Option<CreatureType> {
        self.monster_data().map(|m| m.creature_type)
    }

    pub fn is_pet(&self) -> bool {
        self.monster_flag(MonsterFlags::PET)
    }

    pub fn is_staff(&self) -> bool {
        self.is_player() && self.class.is_staff()
    }

    pub fn is_dm(&self) -> bool {
        self.is_player() && self.class == CreatureClass::DungeonMaster
    }

    pub fn is_undead(&self) -> bool {
        self.creature_type() == Some(CreatureType::Undead)
            || (self.is_player()
                && matches!(self.class, CreatureClass::Lich | CreatureClass::Pureblood))
    }

    pub fn immune_criticals(&self) -> bool {
        self.monster_flag(MonsterFlags::IMMUNE_CRITICAL)
    }

    pub fn adjusted_alignment(&self) -> AdjustedAlignment {
        if self.is_player() {
            AdjustedAlignment::for_player(self.alignment)
        } else {
            AdjustedAlignment::for_monster(self.alignment)
        }
    }

    pub fn is_effected(&self, name: &str, catalog: &EffectCatalog) -> bool {
        self.effects.is_effected(name, catalog)
    }

    pub fn effect_strength(&self, name: &str, catalog: &EffectCatalog) -> i32 {
        self.effects.strength(name, catalog)
    }

    /// Blindness is the only sight gate the combat engine models.
    pub fn can_see(&self, _other: &Creature, catalog: &EffectCatalog) -> bool {
        !self.is_effected("blindness", catalog)
    }

    pub fn strength_bonus(&self) -> i32 {
        stat_bonus(self.strength.cur())
    }

    pub fn wielded(&self) -> Option<&Object> {
        self.equipment.wielded()
    }

    pub fn shield(&self) -> Option<&Object> {
        self.equipment.get(WearSlot::Shield)
    }

    /// Skill name used when swinging bare: monks fight with a trained
    /// art, werewolves with claws.
    pub fn unarmed_skill_name(&self) -> &'static str {
        match self.class {
            CreatureClass::Monk => "martial-arts",
            CreatureClass::Werewolf => "claw",
            _ => "bare-hand",
        }
    }

    /// Weapon skill for the attack roll. Players fold in the bless
    /// bonus and their trained skill (unknown skill counts as 0);
    /// monsters use the flat stored value.
    pub fn weapon_skill(&self, weapon: Option<&Object>, catalog: &EffectCatalog) -> i32 {
        match &self.kind {
            CreatureKind::Monster(m) => m.weapon_skill,
            CreatureKind::Player(p) => {
                let mut bonus = 0;
                if self.is_effected("bless", catalog) {
                    bonus += 10;
                }
                let skill_name = match weapon {
                    Some(w) => w.weapon_type(),
                    None => self.unarmed_skill_name(),
                };
                p.skills.gained(skill_name).unwrap_or(0) + bonus
            }
        }
    }

    /// Defense skill. Players fold in the protection bonus; an
    /// untrained defense skill counts as 0.
    pub fn defense_skill(&self, catalog: &EffectCatalog) -> i32 {
        match &self.kind {
            CreatureKind::Monster(m) => m.defense_skill,
            CreatureKind::Player(p) => {
                let mut bonus = 0;
                if self.is_effected("protection", catalog) {
                    bonus += 10;
                }
                p.skills.gained("defense").unwrap_or(0) + bonus
            }
        }
    }

    /// Raw gained value for a named skill, as used by the fumble curve.
    pub fn skill_level(&self, name: &str) -> f64 {
        match &self.kind {
            CreatureKind::Player(p) => p.skills.gained(name).unwrap_or(0) as f64,
            CreatureKind::Monster(m) => m.weapon_skill as f64,
        }
    }

    pub fn knows_skill(&self, name: &str) -> bool {
        match &self.kind {
            CreatureKind::Player(p) => p.skills.knows(name),
            CreatureKind::Monster(_) => true,
        }
    }

    /// Luck save granted by Kamira to her clerics (and to staff):
    /// level/10 + 3 percent chance to turn a landed blow into a miss.
    pub fn kamira_luck(&self, rng: &mut GameRng) -> bool {
        let favored = self.is_staff()
            || (self.class == CreatureClass::Cleric && self.deity == Some(Deity::Kamira));
        if !favored {
            return false;
        }
        let chance = self.level as i64 / 10 + 3;
        rng.get(1, 100) <= chance
    }

    /// Players always riposte off a parry; monsters need the flag or a
    /// martial class at level 15+.
    pub fn can_riposte(&self) -> bool {
        if self.is_player() {
            return true;
        }
        if self.monster_flag(MonsterFlags::CAN_RIPOSTE) {
            return true;
        }
        self.level >= 15
            && matches!(
                self.class,
                CreatureClass::Fighter
                    | CreatureClass::Berserker
                    | CreatureClass::Assassin
                    | CreatureClass::Thief
                    | CreatureClass::Rogue
            )
    }

    /// Start the riposte cooldown after a successful parry.
    pub fn start_riposte_cooldown(&mut self, now: i64) {
        let interval = match self.class {
            CreatureClass::Thief | CreatureClass::Assassin | CreatureClass::Fighter => 9,
            _ => 6,
        };
        self.riposte_ready_at = now + interval;
    }

    pub fn riposte_ready(&self, now: i64) -> bool {
        now >= self.riposte_ready_at
    }

    /// Gate on the attack timer. Yields the please-wait message while
    /// the last swing is still cooling down.
    pub fn check_attack_timer(&self, now_ds: i64) -> Option<String> {
        let left = self.attack_timer.time_left(now_ds);
        (left > 0).then(|| please_wait(left))
    }

    /// Pulse this creature's effects, keeping worn applier objects in
    /// sync and breaking the ones whose effect expired.
    pub fn pulse_effects(
        &mut self,
        t: i64,
        catalog: &EffectCatalog,
        runner: &mut dyn ScriptRunner,
        msgs: &mut MessageLog,
    ) -> Vec<RemovedEffect> {
        let mut ctx = EffectCtx {
            catalog,
            runner,
            msgs,
            parent: ParentRef::Creature(self.id),
            t,
        };
        self.effects.pulse(&mut ctx, Some(&mut self.equipment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{DamageDice, Object, ObjectId};

    fn test_player() -> Creature {
        let mut p = Creature::player(ActorId(1), "tester", CreatureClass::Fighter, Race::Human);
        p.level = 10;
        p
    }

    #[test]
    fn test_weapon_skill_unknown_is_zero() {
        let catalog = EffectCatalog::standard();
        let p = test_player();
        let sword = Object::weapon(ObjectId(1), "sword", "sword", DamageDice::new(1, 8, 0));
        assert_eq!(p.weapon_skill(Some(&sword), &catalog), 0);
    }

    #[test]
    fn test_weapon_skill_with_training() {
        let catalog = EffectCatalog::standard();
        let mut p = test_player();
        p.player_data_mut().unwrap().skills.learn("sword", 120);
        let sword = Object::weapon(ObjectId(1), "sword", "sword", DamageDice::new(1, 8, 0));
        assert_eq!(p.weapon_skill(Some(&sword), &catalog), 120);
    }

    #[test]
    fn test_monster_flat_skills() {
        let catalog = EffectCatalog::standard();
        let m = Creature::monster(ActorId(2), "orc", 5, 80, 90);
        assert_eq!(m.weapon_skill(None, &catalog), 80);
        assert_eq!(m.defense_skill(&catalog), 90);
    }

    #[test]
    fn test_kamira_luck_gated_by_deity() {
        let mut rng = GameRng::new(42);
        let mut p = test_player();
        assert!(!p.kamira_luck(&mut rng));

        p.class = CreatureClass::Cleric;
        p.deity = Some(Deity::Kamira);
        p.level = 70;
        // 10% chance; over many draws some succeed and some fail.
        let results: Vec<bool> = (0..200).map(|_| p.kamira_luck(&mut rng)).collect();
        assert!(results.iter().any(|&r| r));
        assert!(results.iter().any(|&r| !r));
    }

    #[test]
    fn test_riposte_gates() {
        let p = test_player();
        assert!(p.can_riposte());

        let mut m = Creature::monster(ActorId(3), "wolf", 5, 50, 50);
        assert!(!m.can_riposte());
        m.level = 15;
        assert!(m.can_riposte());
        m.class = CreatureClass::Cleric;
        assert!(!m.can_riposte());
        m.set_monster_flag(MonsterFlags::CAN_RIPOSTE);
        assert!(m.can_riposte());
    }

    #[test]
    fn test_riposte_cooldown_interval_by_class() {
        let mut p = test_player();
        p.start_riposte_cooldown(100);
        assert!(!p.riposte_ready(108));
        assert!(p.riposte_ready(109));

        p.class = CreatureClass::Rogue;
        p.start_riposte_cooldown(100);
        assert!(p.riposte_ready(106));
    }

    #[test]
    fn test_is_undead() {
        let mut m = Creature::monster(ActorId(4), "zombie", 3, 40, 40);
        assert!(!m.is_undead());
        m.monster_data_mut().unwrap().creature_type = CreatureType::Undead;
        assert!(m.is_undead());

        let mut p = test_player();
        p.class = CreatureClass::Lich;
        assert!(p.is_undead());
    }
}
