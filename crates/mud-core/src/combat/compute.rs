//! Damage computation, split per attacker kind.
//!
//! The player path carries the class and deity special cases; the
//! monster path is the same pipeline with the flourishes stripped.

use crate::actor::{AdjustedAlignment, Creature, CreatureClass, CreatureKind, Deity, PlayerFlags, Race};
use crate::combat::damage::Damage;
use crate::combat::timer::DEFAULT_WEAPON_DELAY;
use crate::combat::{AttackResult, AttackType};
use crate::effects::catalog::EffectCatalog;
use crate::object::{Object, ObjectFlags};
use crate::rng::GameRng;
use crate::world::MessageLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Physical,
    Magical,
}

/// How the victim-side hook should treat the hit for off-guard
/// bookkeeping (the bonus pool passes through silently).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offguard {
    Remove,
    NoRemove,
    NoPrint,
}

/// Victim-side resistances, absorption and reflection. External to the
/// pipeline; it may shrink the damage in place or fill the reflected
/// channels.
pub trait DamageModifier {
    #[allow(clippy::too_many_arguments)]
    fn modify_damage(
        &mut self,
        victim: &Creature,
        attacker: &Creature,
        kind: DamageKind,
        damage: &mut Damage,
        weapon: Option<&Object>,
        offguard: Offguard,
        computing_bonus: bool,
    );
}

/// Hook that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughModifier;

impl DamageModifier for PassThroughModifier {
    fn modify_damage(
        &mut self,
        _victim: &Creature,
        _attacker: &Creature,
        _kind: DamageKind,
        _damage: &mut Damage,
        _weapon: Option<&Object>,
        _offguard: Offguard,
        _computing_bonus: bool,
    ) {
    }
}

/// Situational inputs the damage formulas need beyond the two actors.
pub struct DamageCtx<'a> {
    pub catalog: &'a EffectCatalog,
    pub is_night: bool,
    /// Flat bonus from packmates hunting together, for lycanthropes.
    pub pack_bonus: i32,
}

impl<'a> DamageCtx<'a> {
    pub fn new(catalog: &'a EffectCatalog) -> Self {
        Self {
            catalog,
            is_night: false,
            pack_bonus: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub damage: Damage,
    pub shattered: bool,
}

impl Creature {
    /// Shield block soaks half the incoming amount.
    pub fn compute_block(&self, damage: i32) -> i32 {
        damage / 2
    }
}

/// Compute the damage for an already-resolved attack.
#[allow(clippy::too_many_arguments)]
pub fn compute_damage(
    attacker: &Creature,
    victim: &Creature,
    weapon: Option<&Object>,
    attack_type: AttackType,
    result: AttackResult,
    compute_bonus: bool,
    multiplier: f64,
    ctx: &DamageCtx,
    modifier: &mut dyn DamageModifier,
    rng: &mut GameRng,
    msgs: &mut MessageLog,
) -> DamageOutcome {
    match attacker.kind {
        CreatureKind::Player(_) => player_damage(
            attacker,
            victim,
            weapon,
            attack_type,
            result,
            compute_bonus,
            multiplier,
            ctx,
            modifier,
            rng,
            msgs,
        ),
        CreatureKind::Monster(_) => monster_damage(
            attacker, victim, weapon, result, compute_bonus, ctx, modifier, rng, msgs,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn player_damage(
    attacker: &Creature,
    victim: &Creature,
    weapon: Option<&Object>,
    attack_type: AttackType,
    result: AttackResult,
    compute_bonus: bool,
    mut multiplier: f64,
    ctx: &DamageCtx,
    modifier: &mut dyn DamageModifier,
    rng: &mut GameRng,
    msgs: &mut MessageLog,
) -> DamageOutcome {
    let catalog = ctx.catalog;
    let mut attack_damage = Damage::new();
    let mut bonus_damage = Damage::new();
    let mut drain = 0;
    let mut shattered = false;
    let level = attacker.level;
    let strength = attacker.strength.cur();
    let is_werewolf = attacker.is_effected("lycanthropy", catalog);

    match attack_type {
        AttackType::Kick => {
            if compute_bonus {
                bonus_damage.set(attacker.base_damage() / 2);
            }
            attack_damage.set(rng.get(2, 6) as i32 + attacker.strength_bonus());
            if matches!(attacker.class, CreatureClass::Fighter | CreatureClass::Monk)
                && !attacker.has_second_class()
            {
                attack_damage.add(attacker.skill_level("kick") as i32 / 4);
            }
        }
        AttackType::Maul => {
            if compute_bonus {
                bonus_damage.set(attacker.base_damage() / 2);
            }
            attack_damage
                .set(rng.get(level as i64 / 2, level as i64 + 1) as i32 + strength / 10);
            attack_damage.add(rng.get(2, 4) as i32);
        }
        AttackType::Gore => {
            if compute_bonus {
                bonus_damage.set(attacker.base_damage() / 2);
            }
            attack_damage
                .set(rng.get(level as i64 / 2, level as i64 + 2) as i32 + strength / 10);
            attack_damage.add(rng.get(1, 3) as i32);
        }
        AttackType::Normal | AttackType::Bash | AttackType::Backstab => {
            if compute_bonus {
                bonus_damage.set(attacker.base_damage());
            }
            if weapon.is_none() {
                if attacker.class == CreatureClass::Monk {
                    let low = 1 + level as i64 / 4;
                    let high = (1 + level as i64) / 2;
                    attack_damage.set(
                        rng.get(1, 2) as i32 + level / 3 + rng.get(low, high) as i32,
                    );
                    if strength < 90 {
                        attack_damage.set((attack_damage.get() - (90 - strength) / 10).max(1));
                    }
                } else {
                    attack_damage.set(attacker.damage.roll(rng));
                    bonus_damage.set(bonus_damage.get() * 3 / 4);
                }
            }
        }
    }

    if let Some(weapon) = weapon {
        attack_damage.add(weapon.damage.roll(rng) + weapon.adjustment);

        // Deity weapon favor.
        if attacker.class == CreatureClass::Cleric {
            if attacker.deity == Some(Deity::Linothan) && weapon.weapon_type() == "great-sword" {
                attack_damage.set(attack_damage.get() * 120 / 100);
            }
            if attacker.deity == Some(Deity::Mara)
                && weapon.weapon_type() == "bow"
                && ctx.is_night
            {
                attack_damage.set(attack_damage.get() * 125 / 100);
            }
        }
    }

    if is_werewolf {
        attack_damage.add(ctx.pack_bonus);
    }

    if deity_hates(attacker, victim) {
        attack_damage.add(attack_damage.get() / 20);
    }

    attack_damage.set(attack_damage.get().max(1));

    // Acting against the moral grain halves every swing.
    if attacker.class == CreatureClass::Paladin {
        if attacker.deity == Some(Deity::Gradius) {
            let adjusted = attacker.adjusted_alignment();
            if adjusted < AdjustedAlignment::Pinkish || adjusted > AdjustedAlignment::Bluish {
                multiplier /= 2.0;
                msgs.push("Your dissonance with earth reduces your damage.");
            }
        } else if attacker.alignment < 0 {
            multiplier /= 2.0;
            msgs.push("Your evilness reduces your damage.");
        }
    }
    if attacker.class == CreatureClass::Deathknight
        && attacker.adjusted_alignment() > AdjustedAlignment::Neutral
    {
        multiplier /= 2.0;
        msgs.push("Your goodness reduces your damage.");
    }

    if compute_bonus {
        if attacker.class == CreatureClass::Paladin {
            let good_damage = rng.get(1, 1 + level as i64 / 3) as i32;
            if attacker.deity == Some(Deity::Gradius) {
                let adjusted = attacker.adjusted_alignment();
                if adjusted >= AdjustedAlignment::Pinkish
                    && adjusted <= AdjustedAlignment::Bluish
                    && victim.race != Race::Dwarf
                    && victim.deity != Some(Deity::Gradius)
                {
                    bonus_damage.add(good_damage);
                    msgs.push(format!(
                        "Your attunement with earth increased your damage by {good_damage}."
                    ));
                }
            } else if attacker.adjusted_alignment() >= AdjustedAlignment::Bluish
                && victim.alignment <= 0
            {
                bonus_damage.add(good_damage);
                msgs.push(format!(
                    "Your goodness increased your damage by {good_damage}."
                ));
            }
        }
        if attacker.class == CreatureClass::Deathknight
            && attacker.adjusted_alignment() <= AdjustedAlignment::Reddish
            && victim.adjusted_alignment() >= AdjustedAlignment::Neutral
        {
            // Drain lands once per swing series.
            drain = rng.get(1, 1 + level as i64 / 3) as i32;
        }
        if (attacker.class == CreatureClass::Berserker
            || (attacker.class == CreatureClass::Cleric && attacker.deity == Some(Deity::Ares))
            || attacker.is_staff())
            && attacker.is_effected("berserk", catalog)
            && weapon.is_some_and(|w| w.weapon_category() != "ranged")
        {
            bonus_damage.add(attack_damage.get() / 2);
        }
        if ((attacker.class == CreatureClass::Deathknight
            && attacker.adjusted_alignment() <= AdjustedAlignment::Reddish)
            || (attacker.class == CreatureClass::Paladin
                && attacker.adjusted_alignment() == AdjustedAlignment::RoyalBlue))
            && (attacker.is_effected("pray", catalog) || attacker.is_effected("dkpray", catalog))
        {
            bonus_damage.add(rng.get(1, 3) as i32);
        }
        if (is_werewolf || attacker.is_staff()) && attacker.is_effected("frenzy", catalog) {
            bonus_damage.add(rng.get(3, 5) as i32);
        }
        if (attacker.class == CreatureClass::Monk || attacker.is_staff())
            && attacker.player_flag(PlayerFlags::FOCUSED)
        {
            bonus_damage.add(rng.get(1, 3) as i32);
        }
    }

    // A monk with full hands, or a werewolf gripping anything but
    // claws, fights at half effectiveness.
    if attack_type != AttackType::Kick
        && (attacker.class == CreatureClass::Monk || is_werewolf)
    {
        if let Some(weapon) = weapon {
            let monk_mismatch = attacker.class == CreatureClass::Monk
                && !weapon.flag_is_set(ObjectFlags::MONK_WEAPON);
            let wolf_mismatch = is_werewolf
                && (!weapon.flag_is_set(ObjectFlags::WEREWOLF_WEAPON)
                    || weapon.weapon_type() != "claw");
            if monk_mismatch || wolf_mismatch {
                if attacker.class == CreatureClass::Monk {
                    msgs.push("How can you attack well with your hands full?");
                } else {
                    msgs.push("How can you attack well with your paws full?");
                }
                multiplier /= 2.0;
            }
        }
    }

    if multiplier > 0.0 {
        attack_damage.set((attack_damage.get() as f64 * multiplier) as i32);
        if compute_bonus && attack_type != AttackType::Backstab {
            bonus_damage.set((bonus_damage.get() as f64 * multiplier) as i32);
        }
    }

    match result {
        AttackResult::Critical => {
            let kind = match attack_type {
                AttackType::Bash => "bash",
                AttackType::Kick => "kick",
                _ => "hit",
            };
            msgs.push(format!("CRITICAL {kind}!"));
            let mult = rng.get(3, 5) as i32;
            attack_damage.set(attack_damage.get() * mult);
            drain *= mult;
            if compute_bonus {
                bonus_damage.set(bonus_damage.get() * mult);
            }
            if attack_type != AttackType::Kick && !attacker.is_staff() {
                if let Some(weapon) = weapon {
                    if weapon.flag_is_set(ObjectFlags::ALWAYS_CRITICAL)
                        && !weapon.flag_is_set(ObjectFlags::NEVER_SHATTER)
                    {
                        msgs.push(format!("Your {} shatters.", weapon.name));
                        shattered = true;
                    }
                }
            }
        }
        AttackResult::Glancing => {
            msgs.push("You only managed to score a glancing blow!");
            if rng.get(1, 2) == 1 {
                attack_damage.set(attack_damage.get() / 2);
                drain /= 2;
                if compute_bonus {
                    bonus_damage.set(bonus_damage.get() / 2);
                }
            } else {
                attack_damage.set(attack_damage.get() * 2 / 3);
                drain = drain * 2 / 3;
                if compute_bonus {
                    bonus_damage.set(bonus_damage.get() * 2 / 3);
                }
            }
        }
        AttackResult::Block => {
            attack_damage.set(victim.compute_block(attack_damage.get()));
            if compute_bonus {
                bonus_damage.set(victim.compute_block(bonus_damage.get()));
            }
        }
        _ => {}
    }

    modifier.modify_damage(
        victim,
        attacker,
        DamageKind::Physical,
        &mut attack_damage,
        weapon,
        Offguard::Remove,
        false,
    );
    if compute_bonus {
        modifier.modify_damage(
            victim,
            attacker,
            DamageKind::Physical,
            &mut bonus_damage,
            weapon,
            Offguard::NoPrint,
            true,
        );
        // Spread the bonus over the weapon's swing cadence.
        let delay = weapon.map_or(DEFAULT_WEAPON_DELAY, |w| w.delay);
        bonus_damage.set((bonus_damage.get() as i64 * delay / DEFAULT_WEAPON_DELAY) as i32);
        attack_damage.set_bonus(bonus_damage);
    }

    attack_damage.set_drain(drain);
    if !shattered {
        attack_damage.set(attack_damage.get().max(1));
    }

    DamageOutcome {
        damage: attack_damage,
        shattered,
    }
}

/// Clerics of a militant deity strike 5% harder at creatures their
/// faith abhors.
fn deity_hates(attacker: &Creature, victim: &Creature) -> bool {
    if attacker.class != CreatureClass::Cleric {
        return false;
    }
    match attacker.deity {
        Some(Deity::Enoch) | Some(Deity::Linothan) | Some(Deity::Ceris) => {
            victim.is_undead() && attacker.adjusted_alignment() >= AdjustedAlignment::Neutral
        }
        Some(Deity::Aramon) | Some(Deity::Arachnus) => {
            victim.adjusted_alignment() >= AdjustedAlignment::RoyalBlue
                && attacker.adjusted_alignment() <= AdjustedAlignment::Reddish
        }
        _ => false,
    }
}

#[allow(clippy::too_many_arguments)]
fn monster_damage(
    attacker: &Creature,
    victim: &Creature,
    weapon: Option<&Object>,
    result: AttackResult,
    compute_bonus: bool,
    _ctx: &DamageCtx,
    modifier: &mut dyn DamageModifier,
    rng: &mut GameRng,
    msgs: &mut MessageLog,
) -> DamageOutcome {
    let mut attack_damage = Damage::new();
    let mut bonus_damage = Damage::new();
    let mut drain = 0;

    if compute_bonus {
        bonus_damage.set(attacker.base_damage());
    }

    match weapon {
        Some(weapon) => attack_damage.add(weapon.damage.roll(rng) + weapon.adjustment),
        None => attack_damage.add(attacker.damage.roll(rng)),
    }
    attack_damage.add(attacker.strength_bonus());

    match result {
        AttackResult::Critical => {
            msgs.push(format!("{} made a critical hit.", attacker.name));
            let mult = rng.get(2, 5) as i32;
            attack_damage.set(attack_damage.get() * mult);
            drain *= mult;
            // Monster weapons never shatter.
        }
        AttackResult::Block => {
            attack_damage.set(victim.compute_block(attack_damage.get()));
            if compute_bonus {
                bonus_damage.set(victim.compute_block(bonus_damage.get()));
            }
        }
        _ => {}
    }

    modifier.modify_damage(
        victim,
        attacker,
        DamageKind::Physical,
        &mut attack_damage,
        weapon,
        Offguard::Remove,
        false,
    );
    if compute_bonus {
        modifier.modify_damage(
            victim,
            attacker,
            DamageKind::Physical,
            &mut bonus_damage,
            weapon,
            Offguard::NoPrint,
            true,
        );
        attack_damage.set_bonus(bonus_damage);
    }

    attack_damage.set_drain(drain);
    attack_damage.set(attack_damage.get().max(1));

    DamageOutcome {
        damage: attack_damage,
        shattered: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorId, Race};
    use crate::object::{DamageDice, ObjectId};

    fn test_player() -> Creature {
        let mut p = Creature::player(ActorId(1), "hero", CreatureClass::Fighter, Race::Human);
        p.level = 10;
        p
    }

    fn test_monster() -> Creature {
        Creature::monster(ActorId(2), "orc", 10, 100, 100)
    }

    /// Weapon with a fixed 5-damage roll so ratios are exact.
    fn flat_sword() -> Object {
        Object::weapon(ObjectId(1), "training sword", "sword", DamageDice::new(0, 0, 5))
    }

    fn run(
        attacker: &Creature,
        victim: &Creature,
        weapon: Option<&Object>,
        result: AttackResult,
        compute_bonus: bool,
        rng: &mut GameRng,
    ) -> DamageOutcome {
        let catalog = EffectCatalog::standard();
        let ctx = DamageCtx::new(&catalog);
        let mut msgs = MessageLog::new();
        compute_damage(
            attacker,
            victim,
            weapon,
            AttackType::Normal,
            result,
            compute_bonus,
            1.0,
            &ctx,
            &mut PassThroughModifier,
            rng,
            &mut msgs,
        )
    }

    #[test]
    fn test_damage_floor() {
        let mut rng = GameRng::new(42);
        let attacker = test_player();
        let victim = test_monster();
        // A worthless weapon still lands for at least 1.
        let feather =
            Object::weapon(ObjectId(3), "feather", "sword", DamageDice::new(0, 0, -10));
        for _ in 0..50 {
            let out = run(&attacker, &victim, Some(&feather), AttackResult::Hit, true, &mut rng);
            assert!(out.damage.get() >= 1);
        }
    }

    #[test]
    fn test_player_critical_multiplier_range() {
        let attacker = test_player();
        let victim = test_monster();
        let sword = flat_sword();
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            let out = run(&attacker, &victim, Some(&sword), AttackResult::Critical, false, &mut rng);
            // Base damage is exactly 5; the critical multiplier is 3..=5.
            assert!(out.damage.get() % 5 == 0);
            let ratio = out.damage.get() / 5;
            assert!((3..=5).contains(&ratio), "ratio {ratio} out of range");
        }
    }

    #[test]
    fn test_monster_critical_multiplier_range() {
        let attacker = test_monster();
        let victim = test_player();
        let sword = flat_sword();
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            let out = run(&attacker, &victim, Some(&sword), AttackResult::Critical, false, &mut rng);
            // Base is 5 + strength bonus 0.
            let ratio = out.damage.get() / 5;
            assert!((2..=5).contains(&ratio), "ratio {ratio} out of range");
        }
    }

    #[test]
    fn test_block_halves() {
        let attacker = test_monster();
        let victim = test_player();
        let sword = flat_sword();
        let mut rng = GameRng::new(42);
        let out = run(&attacker, &victim, Some(&sword), AttackResult::Block, false, &mut rng);
        assert_eq!(out.damage.get(), 2);
    }

    #[test]
    fn test_glancing_reduces() {
        let attacker = test_player();
        let victim = test_monster();
        let big = Object::weapon(ObjectId(4), "maul", "great-mace", DamageDice::new(0, 0, 30));
        let mut rng = GameRng::new(42);
        for _ in 0..50 {
            let out = run(&attacker, &victim, Some(&big), AttackResult::Glancing, false, &mut rng);
            // Either half or two-thirds of 30.
            assert!(out.damage.get() == 15 || out.damage.get() == 20);
        }
    }

    #[test]
    fn test_shatter_only_always_critical_weapons() {
        let attacker = test_player();
        let victim = test_monster();
        let mut rng = GameRng::new(42);

        let plain = flat_sword();
        for _ in 0..100 {
            let out = run(&attacker, &victim, Some(&plain), AttackResult::Critical, false, &mut rng);
            assert!(!out.shattered);
        }

        let mut glassy = flat_sword();
        glassy.set_flag(ObjectFlags::ALWAYS_CRITICAL);
        let out = run(&attacker, &victim, Some(&glassy), AttackResult::Critical, false, &mut rng);
        assert!(out.shattered);

        glassy.set_flag(ObjectFlags::NEVER_SHATTER);
        let out = run(&attacker, &victim, Some(&glassy), AttackResult::Critical, false, &mut rng);
        assert!(!out.shattered);
    }

    #[test]
    fn test_evil_paladin_damage_halved() {
        let catalog = EffectCatalog::standard();
        let ctx = DamageCtx::new(&catalog);
        let mut msgs = MessageLog::new();
        let mut rng = GameRng::new(42);

        let mut paladin = test_player();
        paladin.class = CreatureClass::Paladin;
        paladin.alignment = -300;
        let victim = test_monster();
        let sword = flat_sword();
        let out = compute_damage(
            &paladin,
            &victim,
            Some(&sword),
            AttackType::Normal,
            AttackResult::Hit,
            false,
            1.0,
            &ctx,
            &mut PassThroughModifier,
            &mut rng,
            &mut msgs,
        );
        assert_eq!(out.damage.get(), 2);
        assert!(msgs.turn().iter().any(|m| m.contains("evilness")));
    }

    #[test]
    fn test_deathknight_drain() {
        let mut dk = test_player();
        dk.class = CreatureClass::Deathknight;
        dk.alignment = -400;
        let mut victim = test_monster();
        victim.alignment = 100;
        let sword = flat_sword();
        let mut rng = GameRng::new(42);
        let out = run(&dk, &victim, Some(&sword), AttackResult::Hit, true, &mut rng);
        assert!(out.damage.drain() >= 1);
        assert!(out.damage.drain() <= 1 + dk.level / 3);
    }

    #[test]
    fn test_bonus_pool_attached() {
        let attacker = test_player();
        let victim = test_monster();
        let sword = flat_sword();
        let mut rng = GameRng::new(42);
        let out = run(&attacker, &victim, Some(&sword), AttackResult::Hit, true, &mut rng);
        // Fighter at level 10: attack power 280, base damage 18.
        assert_eq!(out.damage.bonus(), 18);
        let without = run(&attacker, &victim, Some(&sword), AttackResult::Hit, false, &mut rng);
        assert_eq!(without.damage.bonus(), 0);
    }

    #[test]
    fn test_reflection_hook_is_consulted() {
        struct Thorns;
        impl DamageModifier for Thorns {
            fn modify_damage(
                &mut self,
                _victim: &Creature,
                _attacker: &Creature,
                _kind: DamageKind,
                damage: &mut Damage,
                _weapon: Option<&Object>,
                _offguard: Offguard,
                computing_bonus: bool,
            ) {
                if !computing_bonus {
                    damage.set_physical_reflected(3);
                    damage.set(damage.get() - 2);
                }
            }
        }

        let catalog = EffectCatalog::standard();
        let ctx = DamageCtx::new(&catalog);
        let mut msgs = MessageLog::new();
        let mut rng = GameRng::new(42);
        let attacker = test_monster();
        let victim = test_player();
        let sword = flat_sword();
        let out = compute_damage(
            &attacker,
            &victim,
            Some(&sword),
            AttackType::Normal,
            AttackResult::Hit,
            false,
            1.0,
            &ctx,
            &mut Thorns,
            &mut rng,
            &mut msgs,
        );
        assert_eq!(out.damage.get(), 3);
        assert_eq!(out.damage.physical_reflected(), 3);
    }
}
