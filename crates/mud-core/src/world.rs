//! The world arena: creatures, rooms, the message buffer, the effect
//! pulse driver and the attack command path.

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, Creature, MonsterFlags, PlayerFlags};
use crate::combat::compute::{compute_damage, DamageCtx, DamageModifier};
use crate::combat::resolve::{get_attack_result, riposte_roll, AttackContext};
use crate::combat::{AttackResult, AttackType, ResultFlags, DEFAULT_WEAPON_DELAY};
use crate::effects::catalog::EffectCatalog;
use crate::effects::collection::AddEffect;
use crate::effects::script::{ParentRef, ScriptRunner};
use crate::effects::{EffectCollection, EffectCtx, RemovedEffect};
use crate::object::{Object, ObjectFlags, WearSlot};
use crate::rng::GameRng;
use crate::unique::UniqueLedger;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RoomId(pub u32);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RoomFlags: u32 {
        const NO_DODGE   = 1 << 0;
        const UNDERWATER = 1 << 1;
    }
}

impl Serialize for RoomFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoomFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(RoomFlags::from_bits_truncate(u32::deserialize(
            deserializer,
        )?))
    }
}

/// Turn messages plus a rolling history. Combat and effect code push
/// into the current turn; the driver flushes it between ticks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    turn: Vec<String>,
    history: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: impl Into<String>) {
        self.turn.push(msg.into());
    }

    pub fn turn(&self) -> &[String] {
        &self.turn
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Move the current turn's messages into history.
    pub fn end_turn(&mut self) {
        self.history.append(&mut self.turn);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exit {
    pub name: String,
    pub to: RoomId,
    pub effects: EffectCollection,
}

impl Exit {
    pub fn new(name: &str, to: RoomId) -> Self {
        Self {
            name: name.to_string(),
            to,
            effects: EffectCollection::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub flags: RoomFlags,
    pub effects: EffectCollection,
    pub exits: Vec<Exit>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            flags: RoomFlags::empty(),
            effects: EffectCollection::new(),
            exits: Vec::new(),
        }
    }

    /// Whether this room still needs effect pulsing.
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty() || self.exits.iter().any(|e| !e.effects.is_empty())
    }
}

/// Report of one resolved swing.
#[derive(Debug, Clone)]
pub struct AttackReport {
    pub result: AttackResult,
    pub damage: i32,
    pub drain: i32,
    /// Counter-damage the victim landed on a riposte.
    pub riposte_damage: i32,
    pub shattered: bool,
    pub weapon_broke: bool,
    pub fumbled_weapon: Option<Object>,
    pub victim_died: bool,
    pub attacker_died: bool,
}

#[derive(Debug, Clone)]
pub enum AttackOutcome {
    /// Attacker or victim id is not in the world.
    NoSuchCombatant,
    /// Attack timer has not expired; the wait message was issued.
    Wait(String),
    /// The victim cannot be harmed with this weapon.
    CantHit(String),
    Resolved(AttackReport),
}

/// Single-threaded game world. All mutation happens on the tick
/// thread; combat and effects receive `&mut` slices of it.
pub struct World {
    creatures: Vec<Creature>,
    index: HashMap<ActorId, usize>,
    player_order: Vec<ActorId>,
    monster_order: Vec<ActorId>,
    pub rooms: HashMap<RoomId, Room>,
    /// Rooms registered for effect pulsing. Lazily pruned.
    pulse_rooms: Vec<RoomId>,
    pub catalog: EffectCatalog,
    pub ledger: UniqueLedger,
    pub msgs: MessageLog,
    pub rng: GameRng,
    pub is_night: bool,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            creatures: Vec::new(),
            index: HashMap::new(),
            player_order: Vec::new(),
            monster_order: Vec::new(),
            rooms: HashMap::new(),
            pulse_rooms: Vec::new(),
            catalog: EffectCatalog::standard(),
            ledger: UniqueLedger::new(),
            msgs: MessageLog::new(),
            rng: GameRng::new(seed),
            is_night: false,
        }
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.insert(room.id, room);
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    pub fn add_creature(&mut self, creature: Creature) -> ActorId {
        let id = creature.id;
        if creature.is_player() {
            self.player_order.push(id);
        } else {
            self.monster_order.push(id);
        }
        self.index.insert(id, self.creatures.len());
        self.creatures.push(creature);
        id
    }

    pub fn creature(&self, id: ActorId) -> Option<&Creature> {
        self.index.get(&id).map(|&i| &self.creatures[i])
    }

    pub fn creature_mut(&mut self, id: ActorId) -> Option<&mut Creature> {
        self.index.get(&id).map(|&i| &mut self.creatures[i])
    }

    /// Remove a dead creature and clear the weak owner references it
    /// left behind on everyone else's effects.
    pub fn remove_creature(&mut self, id: ActorId) -> Option<Creature> {
        let pos = self.index.remove(&id)?;
        let gone = self.creatures.remove(pos);
        self.player_order.retain(|p| *p != id);
        self.monster_order.retain(|m| *m != id);
        self.index.clear();
        for (i, c) in self.creatures.iter().enumerate() {
            self.index.insert(c.id, i);
        }
        for c in &mut self.creatures {
            c.effects.remove_owner(id);
        }
        for room in self.rooms.values_mut() {
            room.effects.remove_owner(id);
            for exit in &mut room.exits {
                exit.effects.remove_owner(id);
            }
        }
        Some(gone)
    }

    pub fn register_pulse_room(&mut self, id: RoomId) {
        if !self.pulse_rooms.contains(&id) {
            self.pulse_rooms.push(id);
        }
    }

    pub fn pulse_room_count(&self) -> usize {
        self.pulse_rooms.len()
    }

    /// Add an effect to a room and register it for pulsing.
    pub fn add_room_effect(
        &mut self,
        room_id: RoomId,
        req: AddEffect,
        runner: &mut dyn ScriptRunner,
        t: i64,
    ) -> bool {
        let catalog = &self.catalog;
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return false;
        };
        let mut ctx = EffectCtx {
            catalog,
            runner,
            msgs: &mut self.msgs,
            parent: ParentRef::Room(room_id),
            t,
        };
        let added = room.effects.add(req, &mut ctx, None).is_some();
        if added && !self.pulse_rooms.contains(&room_id) {
            self.pulse_rooms.push(room_id);
        }
        added
    }

    /// Add an effect to a room exit and register the room for pulsing.
    pub fn add_exit_effect(
        &mut self,
        room_id: RoomId,
        exit: usize,
        req: AddEffect,
        runner: &mut dyn ScriptRunner,
        t: i64,
    ) -> bool {
        let catalog = &self.catalog;
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return false;
        };
        let Some(exit_ref) = room.exits.get_mut(exit) else {
            return false;
        };
        let mut ctx = EffectCtx {
            catalog,
            runner,
            msgs: &mut self.msgs,
            parent: ParentRef::Exit(room_id, exit),
            t,
        };
        let added = exit_ref.effects.add(req, &mut ctx, None).is_some();
        if added && !self.pulse_rooms.contains(&room_id) {
            self.pulse_rooms.push(room_id);
        }
        added
    }

    /// One effect tick: players in login order, then monsters, then
    /// the registered rooms. Rooms with nothing left to pulse fall out
    /// of the index.
    pub fn pulse_effects(&mut self, t: i64, runner: &mut dyn ScriptRunner) -> Vec<RemovedEffect> {
        let mut removed = Vec::new();

        let order: Vec<ActorId> = self
            .player_order
            .iter()
            .chain(self.monster_order.iter())
            .copied()
            .collect();
        for id in order {
            if let Some(&i) = self.index.get(&id) {
                removed.extend(self.creatures[i].pulse_effects(
                    t,
                    &self.catalog,
                    runner,
                    &mut self.msgs,
                ));
            }
        }

        let pulse_rooms = std::mem::take(&mut self.pulse_rooms);
        for room_id in &pulse_rooms {
            if let Some(room) = self.rooms.get_mut(room_id) {
                let mut ctx = EffectCtx {
                    catalog: &self.catalog,
                    runner,
                    msgs: &mut self.msgs,
                    parent: ParentRef::Room(*room_id),
                    t,
                };
                removed.extend(room.effects.pulse(&mut ctx, None));
                for (i, exit) in room.exits.iter_mut().enumerate() {
                    let mut ctx = EffectCtx {
                        catalog: &self.catalog,
                        runner,
                        msgs: &mut self.msgs,
                        parent: ParentRef::Exit(*room_id, i),
                        t,
                    };
                    removed.extend(exit.effects.pulse(&mut ctx, None));
                }
            }
        }
        self.pulse_rooms = pulse_rooms
            .into_iter()
            .filter(|id| self.rooms.get(id).is_some_and(Room::has_effects))
            .collect();

        removed
    }

    /// Non-pet monsters in the room hostile to `victim`, excluding its
    /// own group. Feeds the parry crowd penalty.
    fn enemies_near(&self, victim: &Creature) -> u32 {
        self.monster_order
            .iter()
            .filter_map(|id| self.creature(*id))
            .filter(|m| {
                m.id != victim.id
                    && m.room == victim.room
                    && !m.is_pet()
                    && (m.group.is_none() || m.group != victim.group)
            })
            .count() as u32
    }

    /// Flat bonus from packmates: other lycanthropes of the same group
    /// hunting in the same room.
    fn pack_bonus(&self, attacker: &Creature) -> i32 {
        if attacker.group.is_none() || !attacker.is_effected("lycanthropy", &self.catalog) {
            return 0;
        }
        let packmates = self
            .creatures
            .iter()
            .filter(|c| {
                c.id != attacker.id
                    && c.group == attacker.group
                    && c.room == attacker.room
                    && c.is_effected("lycanthropy", &self.catalog)
            })
            .count() as i32;
        packmates * 2
    }

    /// Whether the attacker's weapon can harm the victim at all.
    fn can_hit(&self, attacker: &Creature, victim: &Creature) -> Result<(), String> {
        let weapon = attacker.wielded();

        if victim.is_effected("mist", &self.catalog)
            && !attacker.player_flag(PlayerFlags::MISTBANE)
            && !weapon.is_some_and(|w| w.flag_is_set(ObjectFlags::CAN_HIT_MIST))
        {
            return Err(format!("Your attack passes right through {}.", victim.name));
        }

        let required = if victim.monster_flag(MonsterFlags::PLUS_THREE) {
            3
        } else if victim.monster_flag(MonsterFlags::PLUS_TWO) {
            2
        } else if victim.monster_flag(MonsterFlags::ENCHANTED_WEAPONS_ONLY)
            || victim.player_flag(PlayerFlags::ENCHANT_ONLY)
        {
            1
        } else {
            0
        };
        if required > 0 {
            let adjustment = weapon.map_or(0, |w| w.adjustment);
            if adjustment < required {
                return Err(format!(
                    "You need at least a +{required} weapon to harm {}.",
                    victim.name
                ));
            }
        }

        Ok(())
    }

    /// Resolve one attack command. `now_ds` is the wall clock in
    /// deciseconds; effect and cooldown math runs on whole seconds.
    pub fn attack(
        &mut self,
        attacker_id: ActorId,
        victim_id: ActorId,
        attack_type: AttackType,
        modifier: &mut dyn DamageModifier,
        now_ds: i64,
    ) -> AttackOutcome {
        let now = now_ds / 10;
        let (Some(&ai), Some(&vi)) = (self.index.get(&attacker_id), self.index.get(&victim_id))
        else {
            return AttackOutcome::NoSuchCombatant;
        };
        if ai == vi {
            return AttackOutcome::NoSuchCombatant;
        }

        if let Some(msg) = self.creatures[ai].check_attack_timer(now_ds) {
            self.msgs.push(msg.clone());
            return AttackOutcome::Wait(msg);
        }

        if let Err(msg) = self.can_hit(&self.creatures[ai], &self.creatures[vi]) {
            self.msgs.push(msg.clone());
            return AttackOutcome::CantHit(msg);
        }

        let enemy_count = self.enemies_near(&self.creatures[vi]);
        let pack_bonus = self.pack_bonus(&self.creatures[ai]);
        let weapon = self.creatures[ai].wielded().cloned();

        let mut result;
        let mut riposte_damage = 0;
        let damage;
        let shattered;
        {
            let attacker = &self.creatures[ai];
            let victim = &self.creatures[vi];
            let room = self.rooms.get(&victim.room);
            let mut ctx = AttackContext::new(&self.catalog);
            ctx.room_effects = room.map(|r| &r.effects);
            ctx.room_flags = room.map_or(RoomFlags::empty(), |r| r.flags);
            ctx.enemy_count = enemy_count;
            ctx.is_night = self.is_night;
            ctx.now = now;

            result = get_attack_result(
                attacker,
                victim,
                weapon.as_ref(),
                ResultFlags::empty(),
                None,
                &ctx,
                &mut self.rng,
            );

            if result == AttackResult::Parry
                && riposte_roll(victim, attacker, &ctx, &mut self.rng)
            {
                result = AttackResult::Riposte;
            }

            let mut dmg_ctx = DamageCtx::new(&self.catalog);
            dmg_ctx.is_night = self.is_night;
            dmg_ctx.pack_bonus = pack_bonus;

            match result {
                AttackResult::Hit
                | AttackResult::Critical
                | AttackResult::Glancing
                | AttackResult::Block => {
                    let out = compute_damage(
                        attacker,
                        victim,
                        weapon.as_ref(),
                        attack_type,
                        result,
                        true,
                        1.0,
                        &dmg_ctx,
                        modifier,
                        &mut self.rng,
                        &mut self.msgs,
                    );
                    damage = out.damage;
                    shattered = out.shattered;
                }
                AttackResult::Riposte => {
                    let out = compute_damage(
                        victim,
                        attacker,
                        victim.wielded(),
                        AttackType::Normal,
                        AttackResult::Hit,
                        false,
                        1.0,
                        &dmg_ctx,
                        modifier,
                        &mut self.rng,
                        &mut self.msgs,
                    );
                    riposte_damage = if victim.is_monster() {
                        (out.damage.get() / 2).max(1)
                    } else {
                        out.damage.get()
                    };
                    damage = crate::combat::Damage::new();
                    shattered = false;
                }
                _ => {
                    damage = crate::combat::Damage::new();
                    shattered = false;
                }
            }
        }

        let mut report = AttackReport {
            result,
            damage: 0,
            drain: 0,
            riposte_damage,
            shattered,
            weapon_broke: false,
            fumbled_weapon: None,
            victim_died: false,
            attacker_died: false,
        };

        let delay = weapon.as_ref().map_or(DEFAULT_WEAPON_DELAY, |w| w.delay);
        let attacker = &mut self.creatures[ai];
        attacker.attack_timer.update(now_ds, Some(delay));

        match result {
            AttackResult::Hit
            | AttackResult::Critical
            | AttackResult::Glancing
            | AttackResult::Block => {
                report.damage = damage.get();
                report.drain = damage.drain();
                if shattered {
                    if let Some(broken) = attacker.equipment.unequip(WearSlot::Wield) {
                        if let Some(tag) = &broken.lore_tag {
                            self.ledger.release_owner(tag, attacker_id);
                        }
                    }
                } else if let Some(w) = attacker.equipment.wielded_mut() {
                    w.decrement_shots();
                    if w.is_broken() {
                        report.weapon_broke = true;
                        self.msgs.push(format!("Your {} just broke.", w.name));
                    }
                }
                if report.drain > 0 {
                    attacker.hp.increase(report.drain);
                }
            }
            AttackResult::Fumble => {
                report.fumbled_weapon = attacker.equipment.unequip(WearSlot::Wield);
                if report.fumbled_weapon.is_some() {
                    self.msgs.push("You FUMBLED your weapon.");
                }
            }
            AttackResult::Riposte => {
                attacker.hp.decrease(riposte_damage);
                report.attacker_died = attacker.hp.cur() == 0;
            }
            _ => {}
        }

        if result == AttackResult::Riposte {
            let victim = &mut self.creatures[vi];
            victim.start_riposte_cooldown(now);
        } else if result == AttackResult::Parry {
            let victim = &mut self.creatures[vi];
            victim.start_riposte_cooldown(now);
        }

        if report.damage > 0 {
            let victim = &mut self.creatures[vi];
            victim.hp.decrease(report.damage);
            if victim.hp.cur() == 0 && !victim.monster_flag(MonsterFlags::UNKILLABLE) {
                report.victim_died = true;
                self.msgs
                    .push(format!("You killed {}.", victim.name));
            }
        }

        AttackOutcome::Resolved(report)
    }
}
