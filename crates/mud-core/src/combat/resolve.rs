//! Attack-result resolution: chance computation, cumulative cutoffs,
//! a single draw on the 0..10000 scale.

use crate::actor::{Creature, CreatureClass, CreatureType, Deity, PlayerFlags, Race};
use crate::combat::{AttackResult, ResultFlags};
use crate::effects::catalog::EffectCatalog;
use crate::effects::collection::EffectCollection;
use crate::object::{Object, ObjectFlags};
use crate::rng::GameRng;
use crate::world::RoomFlags;

/// Read-only situational inputs for one resolution: the victim's room,
/// the crowd around them, and the clock.
pub struct AttackContext<'a> {
    pub catalog: &'a EffectCatalog,
    /// Effects on the victim's room (dense fog lives here).
    pub room_effects: Option<&'a EffectCollection>,
    pub room_flags: RoomFlags,
    /// Non-pet monsters hostile to the victim in the room, with the
    /// victim's own group already excluded.
    pub enemy_count: u32,
    pub is_night: bool,
    /// Wall-clock seconds; gates the riposte cooldown.
    pub now: i64,
}

impl<'a> AttackContext<'a> {
    pub fn new(catalog: &'a EffectCatalog) -> Self {
        Self {
            catalog,
            room_effects: None,
            room_flags: RoomFlags::empty(),
            enemy_count: 0,
            is_night: false,
            now: 0,
        }
    }
}

/// Cumulative cutoffs on the 0..10000 integer scale, in the fixed
/// priority order miss, dodge, parry, glancing, block, critical,
/// fumble. Whatever the draw doesn't reach is a plain hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffTable {
    pub miss: i32,
    pub dodge: i32,
    pub parry: i32,
    pub glancing: i32,
    pub block: i32,
    pub critical: i32,
    pub fumble: i32,
}

impl CutoffTable {
    pub fn select(&self, roll: i32) -> AttackResult {
        if roll < self.miss {
            AttackResult::Miss
        } else if roll < self.dodge {
            AttackResult::Dodge
        } else if roll < self.parry {
            AttackResult::Parry
        } else if roll < self.glancing {
            AttackResult::Glancing
        } else if roll < self.block {
            AttackResult::Block
        } else if roll < self.critical {
            AttackResult::Critical
        } else if roll < self.fumble {
            AttackResult::Fumble
        } else {
            AttackResult::Hit
        }
    }
}

/// Skill-gap scaling shared by every chance term. The asymmetry is
/// deliberate: a defender's skill surplus counts for 0.1 (0.4 for
/// monsters with a gap over 10), a deficit costs only 0.04.
fn adjust_chance(is_monster: bool, difference: i32) -> i32 {
    let adjustment = if difference > 0 {
        if is_monster && difference > 10 {
            0.4
        } else {
            0.1
        }
    } else {
        0.04
    };
    (difference as f64 * adjustment) as i32
}

/// Base chance for the attack to simply miss, before situational
/// modifiers. Keyed off the victim: hard-to-pin classes keep more of
/// the base chance.
fn miss_chance(victim: &Creature, difference: i32) -> f64 {
    let mut chance = if difference > 10 { 7.0 } else { 5.0 };
    chance += adjust_chance(victim.is_monster(), difference) as f64;

    if victim.is_player() {
        chance *= match victim.class {
            CreatureClass::Ranger
            | CreatureClass::Thief
            | CreatureClass::Assassin
            | CreatureClass::Rogue => 1.0,
            CreatureClass::Fighter | CreatureClass::Berserker => 0.7,
            CreatureClass::Monk
            | CreatureClass::Paladin
            | CreatureClass::Deathknight
            | CreatureClass::Werewolf => 0.8,
            CreatureClass::Pureblood | CreatureClass::Bard => 0.9,
            CreatureClass::Cleric => match victim.deity {
                Some(Deity::Ares) => 0.8,
                // The remaining deities share the neutral multiplier;
                // the branch is kept explicit since each has had its
                // own value at various points.
                Some(Deity::Kamira)
                | Some(Deity::Ceris)
                | Some(Deity::Mara)
                | Some(Deity::Jakar)
                | Some(Deity::Enoch)
                | Some(Deity::Gradius) => 1.0,
                _ => 1.0,
            },
            CreatureClass::Lich | CreatureClass::Mage => {
                if matches!(
                    victim.second_class(),
                    Some(CreatureClass::Thief) | Some(CreatureClass::Assassin)
                ) {
                    0.8
                } else {
                    1.0
                }
            }
            _ => 1.0,
        };
    }

    chance.max(0.0)
}

/// Situational miss adjustments from effects and racial matchups.
fn miss_chance_modifier(
    attacker: &Creature,
    victim: &Creature,
    ctx: &AttackContext,
    chance: f64,
) -> f64 {
    let catalog = ctx.catalog;
    let mut modifier = 0.0;

    if attacker.is_player()
        && (attacker.is_effected("death-sickness", catalog)
            || attacker.is_effected("confusion", catalog))
    {
        modifier += chance / 10.0;
    }
    if victim.is_effected("blur", catalog) && !attacker.is_effected("true-sight", catalog) {
        modifier += victim.effect_strength("blur", catalog) as f64;
    }
    if victim.is_effected("faerie-fire", catalog) {
        modifier -= victim.effect_strength("faerie-fire", catalog) as f64;
    }
    if let Some(room) = ctx.room_effects {
        if let Some(fog) = room.get("dense-fog", catalog) {
            if !fog.is_owner(attacker.id) {
                modifier += fog.strength() as f64;
            }
        }
    }
    if attacker.class == CreatureClass::Cleric
        && attacker.deity == Some(Deity::Linothan)
        && victim.is_undead()
    {
        modifier -= chance / 10.0;
    }
    if attacker.race == Race::Dwarf && victim.creature_type() == Some(CreatureType::Giantkin) {
        modifier -= chance / 10.0;
    }
    if attacker.creature_type() == Some(CreatureType::Giantkin) && victim.race.is_small() {
        modifier -= chance / 10.0;
    }

    modifier
}

fn can_dodge(victim: &Creature, attacker: &Creature, ctx: &AttackContext) -> bool {
    if attacker.is_dm() {
        return false;
    }
    if attacker.is_monster() {
        if attacker.monster_flag(crate::actor::MonsterFlags::UN_DODGEABLE) {
            return false;
        }
        if attacker.monster_flag(crate::actor::MonsterFlags::UNKILLABLE) && !victim.is_staff() {
            return false;
        }
    }
    if victim.is_player() {
        if victim.player_flag(PlayerFlags::UNCONSCIOUS) || victim.player_flag(PlayerFlags::STUNNED)
        {
            return false;
        }
        if ctx.room_flags.contains(RoomFlags::UNDERWATER)
            && !victim.player_flag(PlayerFlags::FREE_ACTION)
        {
            return false;
        }
        if ctx.room_flags.contains(RoomFlags::NO_DODGE) {
            return false;
        }
        if !victim.can_see(attacker, ctx.catalog) {
            return false;
        }
        // A hiding player stays hidden rather than auto-dodging.
        if victim.player_flag(PlayerFlags::HIDDEN) {
            return false;
        }
    }
    true
}

fn dodge_chance(victim: &Creature, attacker: &Creature, difference: i32, ctx: &AttackContext) -> f64 {
    if !can_dodge(victim, attacker, ctx) {
        return 0.0;
    }
    let dex = victim.dexterity.cur() as f64;
    let mut chance = if victim.is_player() {
        match victim.class {
            CreatureClass::Ranger => dex * 0.06,
            CreatureClass::Thief => dex * 0.075,
            CreatureClass::Assassin => dex * 0.06,
            CreatureClass::Rogue => dex * 0.08,
            CreatureClass::Fighter | CreatureClass::Berserker => {
                if matches!(
                    victim.second_class(),
                    Some(CreatureClass::Thief) | Some(CreatureClass::Assassin)
                ) {
                    dex * 0.07
                } else {
                    1.0 + dex * 0.045
                }
            }
            CreatureClass::Bard
            | CreatureClass::Paladin
            | CreatureClass::Deathknight
            | CreatureClass::Werewolf
            | CreatureClass::Pureblood
            | CreatureClass::Monk => 2.0 + dex * 0.05,
            CreatureClass::Cleric => {
                if victim.second_class() == Some(CreatureClass::Assassin) {
                    dex * 0.06
                } else {
                    match victim.deity {
                        Some(Deity::Kamira) | Some(Deity::Arachnus) | Some(Deity::Linothan) => {
                            victim.piety.cur() as f64 * 0.07
                        }
                        _ => 2.0 + dex * 0.05,
                    }
                }
            }
            CreatureClass::Lich | CreatureClass::Mage => {
                if matches!(
                    victim.second_class(),
                    Some(CreatureClass::Thief) | Some(CreatureClass::Assassin)
                ) {
                    dex * 0.07
                } else {
                    1.0 + dex * 0.06
                }
            }
            _ => 0.0,
        }
    } else {
        5.0
    };

    chance += adjust_chance(victim.is_monster(), difference) as f64;
    chance.max(0.0)
}

fn can_parry(victim: &Creature, attacker: &Creature, ctx: &AttackContext) -> bool {
    if attacker.is_dm() {
        return false;
    }
    if victim.is_monster() {
        return true;
    }
    let Some(weapon) = victim.wielded() else {
        return false;
    };
    if weapon.weapon_category() == "ranged" || weapon.is_broken() {
        return false;
    }
    if victim.is_effected("hold-person", ctx.catalog) {
        return false;
    }
    if attacker
        .creature_type()
        .is_some_and(|t| t.unparryable())
    {
        return false;
    }
    victim.riposte_ready(ctx.now)
}

fn parry_chance(victim: &Creature, attacker: &Creature, difference: i32, ctx: &AttackContext) -> f64 {
    if victim.is_player() {
        if !can_dodge(victim, attacker, ctx) || !can_parry(victim, attacker, ctx) {
            return 0.0;
        }
        if !victim.knows_skill("parry") {
            return 0.0;
        }
    } else if !can_parry(victim, attacker, ctx) {
        return 0.0;
    }

    // Linothan's clerics parry on faith rather than reflexes.
    let attribute = if victim.class == CreatureClass::Cleric
        && victim.deity == Some(Deity::Linothan)
    {
        victim.piety.cur()
    } else {
        victim.dexterity.cur()
    };
    let mut chance = (attribute.max(80) - 80) as f64 * 0.03;
    chance += adjust_chance(victim.is_monster(), difference) as f64;

    if attacker.creature_type().is_some_and(|t| t.halves_parry()) {
        chance /= 2.0;
    }

    // Crowded fights leave no opening to turn a blade.
    chance -= 0.02 * ctx.enemy_count.saturating_sub(1) as f64;

    chance.max(0.0)
}

fn glancing_chance(victim: &Creature, attacker: &Creature, difference: i32) -> f64 {
    // Only monsters suffer glancing blows, and only from players or
    // pets of at most their level.
    if victim.is_player() || victim.is_pet() {
        return 0.0;
    }
    if attacker.is_monster() && !attacker.is_pet() {
        return 0.0;
    }
    if victim.level < attacker.level {
        return 0.0;
    }
    (10.0 + difference as f64 * 0.5).max(0.0)
}

fn block_chance(victim: &Creature, difference: i32) -> f64 {
    if victim.is_player() {
        if !victim.knows_skill("block") {
            return 0.0;
        }
        if victim.shield().is_none() {
            return 0.0;
        }
    }
    let mut chance = 5.0 + adjust_chance(victim.is_monster(), difference) as f64;
    if victim.is_monster() {
        chance = chance.min(5.0);
    }
    chance.max(0.0)
}

fn critical_chance(
    attacker: &Creature,
    victim: &Creature,
    weapon: Option<&Object>,
    difference: i32,
    ctx: &AttackContext,
) -> f64 {
    let mut chance = 5.0 - adjust_chance(attacker.is_monster(), difference) as f64;
    if attacker.class == CreatureClass::Cleric {
        if attacker.deity == Some(Deity::Mara)
            && ctx.is_night
            && weapon.is_some_and(|w| w.weapon_type() == "bow")
        {
            chance += 10.0;
        }
        if attacker.deity == Some(Deity::Linothan) && victim.is_undead() {
            chance += 5.0;
        }
    }
    chance.max(0.0)
}

fn fumble_chance(attacker: &Creature, weapon: Option<&Object>) -> f64 {
    let Some(weapon) = weapon else {
        return 0.0;
    };
    if weapon.flag_is_set(ObjectFlags::CURSED) || attacker.is_dm() {
        return 0.0;
    }
    let skill = attacker.skill_level(weapon.weapon_type());
    (2.0 - skill / 151.0).max(0.0)
}

/// Build the cutoff table for one swing. Exposed separately so the
/// deterministic-scenario tests can walk it without an RNG.
pub fn compute_cutoffs(
    attacker: &Creature,
    victim: &Creature,
    weapon: Option<&Object>,
    flags: ResultFlags,
    alt_skill: Option<i32>,
    ctx: &AttackContext,
) -> CutoffTable {
    let my_skill = alt_skill.unwrap_or_else(|| attacker.weapon_skill(weapon, ctx.catalog));
    let defense = victim.defense_skill(ctx.catalog);
    let difference = defense - my_skill;

    let mut miss = miss_chance(victim, difference);
    miss += miss_chance_modifier(attacker, victim, ctx, miss);
    miss = miss.max(0.0);
    if flags.contains(ResultFlags::DOUBLE_MISS) {
        miss *= 2.0;
    }

    let dodge = if flags.contains(ResultFlags::NO_DODGE) {
        0.0
    } else {
        dodge_chance(victim, attacker, difference, ctx)
    };
    let parry = if flags.contains(ResultFlags::NO_PARRY) {
        0.0
    } else {
        parry_chance(victim, attacker, difference, ctx)
    };
    let glancing = if flags.contains(ResultFlags::NO_GLANCING) {
        0.0
    } else {
        glancing_chance(victim, attacker, difference)
    };
    let block = if flags.contains(ResultFlags::NO_BLOCK) {
        0.0
    } else {
        block_chance(victim, difference)
    };
    let critical = if flags.contains(ResultFlags::NO_CRITICAL) || victim.immune_criticals() {
        0.0
    } else {
        critical_chance(attacker, victim, weapon, difference, ctx)
    };
    let fumble = if flags.contains(ResultFlags::NO_FUMBLE) {
        0.0
    } else {
        fumble_chance(attacker, weapon)
    };

    let mut table = CutoffTable {
        miss: (miss * 100.0) as i32,
        dodge: 0,
        parry: 0,
        glancing: 0,
        block: 0,
        critical: 0,
        fumble: 0,
    };
    table.dodge = table.miss + (dodge * 100.0) as i32;
    table.parry = table.dodge + (parry * 100.0) as i32;
    table.glancing = table.parry + (glancing * 100.0) as i32;
    table.block = table.glancing + (block * 100.0) as i32;
    table.critical = table.block + (critical * 100.0) as i32;
    table.fumble = table.critical + (fumble * 100.0) as i32;

    // An always-critical weapon either guarantees the critical or, when
    // the victim can't be critically hit, guarantees nothing at all.
    if weapon.is_some_and(|w| w.flag_is_set(ObjectFlags::ALWAYS_CRITICAL)) {
        if victim.monster_flag(crate::actor::MonsterFlags::NO_AUTO_CRIT)
            || victim.immune_criticals()
        {
            table = CutoffTable {
                miss: 10000,
                dodge: 10000,
                parry: 10000,
                glancing: 10000,
                block: 10000,
                critical: 10000,
                fumble: 10000,
            };
        } else {
            table = CutoffTable {
                miss: 0,
                dodge: 0,
                parry: 0,
                glancing: 0,
                block: 0,
                critical: 10000,
                fumble: 10000,
            };
        }
    }

    table
}

/// Resolve one swing into an attack result.
pub fn get_attack_result(
    attacker: &Creature,
    victim: &Creature,
    weapon: Option<&Object>,
    flags: ResultFlags,
    alt_skill: Option<i32>,
    ctx: &AttackContext,
    rng: &mut GameRng,
) -> AttackResult {
    let table = compute_cutoffs(attacker, victim, weapon, flags, alt_skill, ctx);
    let roll = rng.get(0, 9999) as i32;
    let mut result = table.select(roll);

    // A lucky victim turns a landed blow into thin air.
    if matches!(result, AttackResult::Hit | AttackResult::Critical) && victim.kamira_luck(rng) {
        result = AttackResult::Miss;
    }

    result
}

/// After a successful parry, roll the counter-swing: a restricted
/// attack from the victim that can only miss or land. Returns true
/// when the parry becomes a riposte.
pub fn riposte_roll(
    victim: &Creature,
    attacker: &Creature,
    ctx: &AttackContext,
    rng: &mut GameRng,
) -> bool {
    if !victim.can_riposte() {
        return false;
    }
    let weapon = victim.wielded();
    let result = get_attack_result(
        victim,
        attacker,
        weapon,
        ResultFlags::riposte(),
        None,
        ctx,
        rng,
    );
    result == AttackResult::Hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorId, Creature, CreatureClass, MonsterFlags, Race};
    use crate::effects::collection::AddEffect;
    use crate::effects::script::{NoopRunner, ParentRef};
    use crate::effects::EffectCtx;
    use crate::object::{DamageDice, Object, ObjectId, WearSlot};
    use crate::world::MessageLog;
    use proptest::prelude::*;

    fn test_player() -> Creature {
        let mut p = Creature::player(ActorId(1), "hero", CreatureClass::Fighter, Race::Human);
        p.level = 10;
        let data = p.player_data_mut().unwrap();
        data.skills.learn("sword", 100);
        data.skills.learn("defense", 100);
        data.skills.learn("parry", 100);
        p
    }

    fn test_monster() -> Creature {
        Creature::monster(ActorId(2), "orc", 10, 100, 100)
    }

    fn sword() -> Object {
        Object::weapon(ObjectId(1), "longsword", "sword", DamageDice::new(1, 8, 1))
    }

    fn add_effect(creature: &mut Creature, catalog: &EffectCatalog, req: AddEffect) {
        let mut runner = NoopRunner;
        let mut msgs = MessageLog::new();
        let mut ctx = EffectCtx {
            catalog,
            runner: &mut runner,
            msgs: &mut msgs,
            parent: ParentRef::Creature(creature.id),
            t: 0,
        };
        creature.effects.add(req.silent(), &mut ctx, None);
    }

    #[test]
    fn test_cutoffs_non_decreasing() {
        let catalog = EffectCatalog::standard();
        let ctx = AttackContext::new(&catalog);
        let attacker = test_player();
        let victim = test_monster();
        let weapon = sword();
        let table = compute_cutoffs(
            &attacker,
            &victim,
            Some(&weapon),
            ResultFlags::empty(),
            None,
            &ctx,
        );
        assert!(table.miss <= table.dodge);
        assert!(table.dodge <= table.parry);
        assert!(table.parry <= table.glancing);
        assert!(table.glancing <= table.block);
        assert!(table.block <= table.critical);
        assert!(table.critical <= table.fumble);
    }

    #[test]
    fn test_boundary_draws_select_each_outcome() {
        let catalog = EffectCatalog::standard();
        let ctx = AttackContext::new(&catalog);
        let attacker = test_player();
        let victim = test_monster();
        let weapon = sword();
        let table = compute_cutoffs(
            &attacker,
            &victim,
            Some(&weapon),
            ResultFlags::empty(),
            None,
            &ctx,
        );
        // A draw one below a cutoff lands in that cutoff's band,
        // provided the band is non-empty.
        if table.miss > 0 {
            assert_eq!(table.select(table.miss - 1), AttackResult::Miss);
        }
        if table.dodge > table.miss {
            assert_eq!(table.select(table.dodge - 1), AttackResult::Dodge);
        }
        if table.glancing > table.parry {
            assert_eq!(table.select(table.glancing - 1), AttackResult::Glancing);
        }
        if table.critical > table.block {
            assert_eq!(table.select(table.critical - 1), AttackResult::Critical);
        }
        assert_eq!(table.select(9999), AttackResult::Hit);
    }

    #[test]
    fn test_flag_suppression() {
        let catalog = EffectCatalog::standard();
        let ctx = AttackContext::new(&catalog);
        let attacker = test_player();
        let victim = test_monster();
        let weapon = sword();

        let base = compute_cutoffs(
            &attacker,
            &victim,
            Some(&weapon),
            ResultFlags::empty(),
            None,
            &ctx,
        );
        let no_glancing = compute_cutoffs(
            &attacker,
            &victim,
            Some(&weapon),
            ResultFlags::NO_GLANCING,
            None,
            &ctx,
        );
        assert_eq!(no_glancing.glancing, no_glancing.parry);
        assert!(base.glancing > base.parry);

        let doubled = compute_cutoffs(
            &attacker,
            &victim,
            Some(&weapon),
            ResultFlags::DOUBLE_MISS,
            None,
            &ctx,
        );
        assert_eq!(doubled.miss, base.miss * 2);
    }

    #[test]
    fn test_always_critical_weapon() {
        let catalog = EffectCatalog::standard();
        let ctx = AttackContext::new(&catalog);
        let attacker = test_player();
        let mut victim = test_monster();
        let mut weapon = sword();
        weapon.set_flag(ObjectFlags::ALWAYS_CRITICAL);

        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            let result = get_attack_result(
                &attacker,
                &victim,
                Some(&weapon),
                ResultFlags::empty(),
                None,
                &ctx,
                &mut rng,
            );
            assert_eq!(result, AttackResult::Critical);
        }

        victim.set_monster_flag(MonsterFlags::IMMUNE_CRITICAL);
        for _ in 0..100 {
            let result = get_attack_result(
                &attacker,
                &victim,
                Some(&weapon),
                ResultFlags::empty(),
                None,
                &ctx,
                &mut rng,
            );
            assert_eq!(result, AttackResult::Miss);
        }
    }

    #[test]
    fn test_block_requires_shield_and_skill() {
        let catalog = EffectCatalog::standard();
        let attacker = test_monster();
        let mut victim = test_player();
        let ctx = AttackContext::new(&catalog);

        // No block skill, no shield: zero chance at any difference.
        for difference in [-100, 0, 100] {
            assert_eq!(block_chance(&victim, difference), 0.0);
        }
        victim.player_data_mut().unwrap().skills.learn("block", 100);
        assert_eq!(block_chance(&victim, 0), 0.0);
        victim
            .equipment
            .equip(WearSlot::Shield, Object::shield(ObjectId(5), "kite shield"));
        assert!(block_chance(&victim, 0) > 0.0);
        let _ = (attacker, ctx);
    }

    #[test]
    fn test_blur_raises_and_faerie_fire_lowers_miss() {
        let catalog = EffectCatalog::standard();
        let attacker = test_player();
        let mut victim = test_monster();
        let ctx = AttackContext::new(&catalog);

        let plain = compute_cutoffs(
            &attacker,
            &victim,
            None,
            ResultFlags::empty(),
            None,
            &ctx,
        );
        add_effect(
            &mut victim,
            &catalog,
            AddEffect::new("blur").duration(60).strength(8),
        );
        let blurred = compute_cutoffs(
            &attacker,
            &victim,
            None,
            ResultFlags::empty(),
            None,
            &ctx,
        );
        assert_eq!(blurred.miss, plain.miss + 800);

        add_effect(
            &mut victim,
            &catalog,
            AddEffect::new("faerie-fire").duration(60).strength(8),
        );
        let lit = compute_cutoffs(
            &attacker,
            &victim,
            None,
            ResultFlags::empty(),
            None,
            &ctx,
        );
        assert_eq!(lit.miss, plain.miss);
    }

    #[test]
    fn test_dense_fog_skips_its_owner() {
        let catalog = EffectCatalog::standard();
        let attacker = test_player();
        let victim = test_monster();

        let mut fog = EffectCollection::new();
        let mut runner = NoopRunner;
        let mut msgs = MessageLog::new();
        let mut ectx = EffectCtx {
            catalog: &catalog,
            runner: &mut runner,
            msgs: &mut msgs,
            parent: ParentRef::Room(crate::world::RoomId(1)),
            t: 0,
        };
        fog.add(
            AddEffect::new("dense-fog")
                .duration(60)
                .strength(10)
                .owner(attacker.id)
                .silent(),
            &mut ectx,
            None,
        );

        let mut ctx = AttackContext::new(&catalog);
        ctx.room_effects = Some(&fog);
        let owned = compute_cutoffs(&attacker, &victim, None, ResultFlags::empty(), None, &ctx);

        let ctx_plain = AttackContext::new(&catalog);
        let plain = compute_cutoffs(
            &attacker,
            &victim,
            None,
            ResultFlags::empty(),
            None,
            &ctx_plain,
        );
        // The fog's owner sees through their own spell.
        assert_eq!(owned.miss, plain.miss);

        let mut stranger = test_player();
        stranger.id = ActorId(9);
        let fogged = compute_cutoffs(&stranger, &victim, None, ResultFlags::empty(), None, &ctx);
        assert_eq!(fogged.miss, plain.miss + 1000);
    }

    #[test]
    fn test_dodge_denied_in_no_dodge_room() {
        let catalog = EffectCatalog::standard();
        let attacker = test_monster();
        let victim = test_player();

        let mut ctx = AttackContext::new(&catalog);
        assert!(dodge_chance(&victim, &attacker, 0, &ctx) > 0.0);
        ctx.room_flags = RoomFlags::NO_DODGE;
        assert_eq!(dodge_chance(&victim, &attacker, 0, &ctx), 0.0);
    }

    #[test]
    fn test_parry_needs_weapon_and_cooldown() {
        let catalog = EffectCatalog::standard();
        let attacker = test_monster();
        let mut victim = test_player();
        let mut ctx = AttackContext::new(&catalog);

        // Unarmed player cannot parry.
        assert_eq!(parry_chance(&victim, &attacker, 0, &ctx), 0.0);
        victim.equipment.equip(WearSlot::Wield, sword());
        victim.dexterity.set_max(180);
        victim.dexterity.set_cur(180);
        assert!(parry_chance(&victim, &attacker, 0, &ctx) > 0.0);

        // On cooldown after a recent parry.
        victim.start_riposte_cooldown(100);
        ctx.now = 105;
        assert_eq!(parry_chance(&victim, &attacker, 0, &ctx), 0.0);
        ctx.now = 109;
        assert!(parry_chance(&victim, &attacker, 0, &ctx) > 0.0);
    }

    #[test]
    fn test_parry_halved_against_dragons_and_crowds() {
        let catalog = EffectCatalog::standard();
        let mut attacker = test_monster();
        let mut victim = test_player();
        victim.equipment.equip(WearSlot::Wield, sword());
        victim.dexterity.set_max(200);
        victim.dexterity.set_cur(200);
        let mut ctx = AttackContext::new(&catalog);

        let base = parry_chance(&victim, &attacker, 0, &ctx);
        attacker.monster_data_mut().unwrap().creature_type = CreatureType::Dragon;
        assert!((parry_chance(&victim, &attacker, 0, &ctx) - base / 2.0).abs() < 1e-9);

        attacker.monster_data_mut().unwrap().creature_type = CreatureType::Humanoid;
        ctx.enemy_count = 4;
        assert!((parry_chance(&victim, &attacker, 0, &ctx) - (base - 0.06)).abs() < 1e-9);

        attacker.monster_data_mut().unwrap().creature_type = CreatureType::Slime;
        assert_eq!(parry_chance(&victim, &attacker, 0, &ctx), 0.0);
    }

    #[test]
    fn test_glancing_only_for_monster_victims_at_level() {
        let player = test_player();
        let mut monster = test_monster();
        assert!(glancing_chance(&monster, &player, 0) > 0.0);
        assert_eq!(glancing_chance(&player, &monster, 0), 0.0);
        monster.level = 5;
        assert_eq!(glancing_chance(&monster, &player, 0), 0.0);
    }

    #[test]
    fn test_fumble_curve() {
        let mut attacker = test_player();
        let weapon = sword();
        assert_eq!(fumble_chance(&attacker, None), 0.0);
        let trained = fumble_chance(&attacker, Some(&weapon));
        assert!((trained - (2.0 - 100.0 / 151.0)).abs() < 1e-9);
        attacker.player_data_mut().unwrap().skills.learn("sword", 300);
        assert!(fumble_chance(&attacker, Some(&weapon)) < trained);
        assert!(fumble_chance(&attacker, Some(&weapon)) > 0.0);

        let mut cursed = sword();
        cursed.set_flag(ObjectFlags::CURSED);
        assert_eq!(fumble_chance(&attacker, Some(&cursed)), 0.0);
    }

    #[test]
    fn test_adjust_chance_asymmetry() {
        assert_eq!(adjust_chance(false, 50), 5);
        assert_eq!(adjust_chance(true, 50), 20);
        assert_eq!(adjust_chance(true, 8), 0);
        assert_eq!(adjust_chance(false, -50), -2);
        assert_eq!(adjust_chance(true, -50), -2);
    }

    #[test]
    fn test_seeded_draw_matches_hand_computed_table() {
        let catalog = EffectCatalog::standard();
        let ctx = AttackContext::new(&catalog);
        let attacker = test_player();
        let victim = test_monster();
        let weapon = sword();
        let flags = ResultFlags::empty();

        let table = compute_cutoffs(&attacker, &victim, Some(&weapon), flags, None, &ctx);
        let mut rng = GameRng::new(42);
        let mut expected = Vec::new();
        {
            // Replay the exact draw sequence against the table.
            let mut shadow = GameRng::new(42);
            for _ in 0..50 {
                let roll = shadow.get(0, 9999) as i32;
                let mut result = table.select(roll);
                if matches!(result, AttackResult::Hit | AttackResult::Critical)
                    && victim.kamira_luck(&mut shadow)
                {
                    result = AttackResult::Miss;
                }
                expected.push(result);
            }
        }
        for want in expected {
            let got = get_attack_result(
                &attacker,
                &victim,
                Some(&weapon),
                flags,
                None,
                &ctx,
                &mut rng,
            );
            assert_eq!(got, want);
        }
    }

    #[test]
    fn test_kamira_luck_turns_hits_into_misses() {
        let catalog = EffectCatalog::standard();
        let ctx = AttackContext::new(&catalog);
        let attacker = test_monster();
        let mut victim = test_player();
        victim.class = CreatureClass::Cleric;
        victim.deity = Some(Deity::Kamira);
        victim.level = 70;

        // With every other outcome suppressed only miss and hit remain;
        // the luck save must produce more misses than the base chance
        // alone would.
        let flags = ResultFlags::riposte();
        let mut rng = GameRng::new(7);
        let mut hits = 0;
        let mut misses = 0;
        for _ in 0..2000 {
            match get_attack_result(&attacker, &victim, None, flags, None, &ctx, &mut rng) {
                AttackResult::Hit => hits += 1,
                AttackResult::Miss => misses += 1,
                other => panic!("unexpected result {other}"),
            }
        }
        assert!(hits > 0);
        // Base doubled miss chance is well under 15%; the 10% luck save
        // pushes observed misses past that.
        assert!(misses * 100 / (hits + misses) > 15);
    }

    #[test]
    fn test_riposte_roll_requires_capability() {
        let catalog = EffectCatalog::standard();
        let ctx = AttackContext::new(&catalog);
        let mut rng = GameRng::new(42);
        let attacker = test_player();
        let low_monster = Creature::monster(ActorId(5), "rat", 2, 30, 30);
        assert!(!riposte_roll(&low_monster, &attacker, &ctx, &mut rng));

        let mut victim = test_player();
        victim.equipment.equip(WearSlot::Wield, sword());
        let outcomes: Vec<bool> = (0..200)
            .map(|_| riposte_roll(&victim, &attacker, &ctx, &mut rng))
            .collect();
        assert!(outcomes.iter().any(|&b| b));
    }

    proptest! {
        #[test]
        fn prop_cutoffs_monotonic_for_any_skill_gap(
            attack_skill in 0i32..300,
            defense_skill in 0i32..300,
            flag_bits in 0u32..128,
        ) {
            let catalog = EffectCatalog::standard();
            let ctx = AttackContext::new(&catalog);
            let mut attacker = test_player();
            attacker
                .player_data_mut()
                .unwrap()
                .skills
                .learn("sword", attack_skill);
            let mut victim = test_monster();
            victim.monster_data_mut().unwrap().defense_skill = defense_skill;
            let weapon = sword();
            let flags = ResultFlags::from_bits_truncate(flag_bits);

            let t = compute_cutoffs(&attacker, &victim, Some(&weapon), flags, None, &ctx);
            prop_assert!(0 <= t.miss);
            prop_assert!(t.miss <= t.dodge);
            prop_assert!(t.dodge <= t.parry);
            prop_assert!(t.parry <= t.glancing);
            prop_assert!(t.glancing <= t.block);
            prop_assert!(t.block <= t.critical);
            prop_assert!(t.critical <= t.fumble);
        }
    }
}
