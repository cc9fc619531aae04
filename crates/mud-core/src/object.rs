//! Objects (weapons, shields, worn gear) and the equipment slot array.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::rng::GameRng;

/// Stable object identifier. Effect appliers hold these weakly and
/// resolve them through the owner's equipment at use time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ObjectType {
    Weapon,
    Armor,
    Shield,
    Misc,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ObjectFlags: u32 {
        const TWO_HANDED      = 1 << 0;
        const SILVER          = 1 << 1;
        const ALWAYS_CRITICAL = 1 << 2;
        const NEVER_SHATTER   = 1 << 3;
        const CAN_HIT_MIST    = 1 << 4;
        const SMALL_BOW       = 1 << 5;
        const CURSED          = 1 << 6;
        const STARTING        = 1 << 7;
        const MONK_WEAPON     = 1 << 8;
        const WEREWOLF_WEAPON = 1 << 9;
    }
}

// Manual serde impl for ObjectFlags
impl Serialize for ObjectFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(ObjectFlags::from_bits_truncate(bits))
    }
}

/// Damage-roll distribution: `number`d`sides` + `plus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageDice {
    pub number: u32,
    pub sides: u32,
    pub plus: i32,
}

impl DamageDice {
    pub fn new(number: u32, sides: u32, plus: i32) -> Self {
        Self {
            number,
            sides,
            plus,
        }
    }

    pub fn roll(&self, rng: &mut GameRng) -> i32 {
        rng.dice(self.number, self.sides) as i32 + self.plus
    }

    pub fn average(&self) -> f64 {
        self.number as f64 * (self.sides as f64 + 1.0) / 2.0 + self.plus as f64
    }
}

/// Wear locations. Exactly one item per slot; empty slots are `None`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(usize)]
pub enum WearSlot {
    Wield = 0,
    Held = 1,
    Shield = 2,
    Hands = 3,
    Body = 4,
    Head = 5,
    Feet = 6,
    Neck = 7,
}

pub const WEAR_SLOTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
    pub otype: ObjectType,
    /// Weapon sub-type key ("sword", "bow", ...); doubles as the skill
    /// name a player trains for it.
    pub subtype: String,
    pub damage: DamageDice,
    /// Enchantment bonus, signed. Gates enchant-only victims and adds
    /// to damage.
    pub adjustment: i32,
    pub shots_cur: i32,
    pub shots_max: i32,
    /// Swing delay in deciseconds.
    pub delay: i64,
    pub flags: ObjectFlags,
    /// Remaining duration of an effect this object applies while worn,
    /// kept in sync by the effect pulse.
    pub effect_duration: i64,
    /// Lore/unique tag for the scarce-item ownership ledger.
    pub lore_tag: Option<String>,
}

impl Object {
    pub fn weapon(id: ObjectId, name: &str, subtype: &str, damage: DamageDice) -> Self {
        Self {
            id,
            name: name.to_string(),
            otype: ObjectType::Weapon,
            subtype: subtype.to_string(),
            damage,
            adjustment: 0,
            shots_cur: 100,
            shots_max: 100,
            delay: crate::combat::timer::DEFAULT_WEAPON_DELAY,
            flags: ObjectFlags::empty(),
            effect_duration: 0,
            lore_tag: None,
        }
    }

    pub fn shield(id: ObjectId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            otype: ObjectType::Shield,
            subtype: String::new(),
            damage: DamageDice::default(),
            adjustment: 0,
            shots_cur: 100,
            shots_max: 100,
            delay: crate::combat::timer::DEFAULT_WEAPON_DELAY,
            flags: ObjectFlags::empty(),
            effect_duration: 0,
            lore_tag: None,
        }
    }

    pub fn flag_is_set(&self, flag: ObjectFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: ObjectFlags) {
        self.flags.insert(flag);
    }

    /// Sub-type key, or "none" for non-weapons.
    pub fn weapon_type(&self) -> &str {
        if self.otype != ObjectType::Weapon || self.subtype.is_empty() {
            "none"
        } else {
            &self.subtype
        }
    }

    /// Skill-group category for the sub-type.
    pub fn weapon_category(&self) -> &'static str {
        match self.weapon_type() {
            "sword" | "great-sword" | "axe" | "great-axe" | "claw" | "scythe" => "slashing",
            "dagger" | "rapier" | "spear" | "polearm" => "piercing",
            "mace" | "great-mace" | "hammer" | "great-hammer" | "club" | "staff" => "crushing",
            "bow" | "crossbow" | "sling" | "thrown" => "ranged",
            "whip" | "arcane-weapon" | "divine-weapon" => "chopping",
            _ => "none",
        }
    }

    pub fn needs_two_hands(&self) -> bool {
        if self.flag_is_set(ObjectFlags::TWO_HANDED) {
            return true;
        }
        match self.weapon_type() {
            "great-sword" | "great-axe" | "great-mace" | "great-hammer" | "polearm" => true,
            "bow" | "crossbow" => !self.flag_is_set(ObjectFlags::SMALL_BOW),
            _ => false,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.shots_cur < 1
    }

    /// Break the object outright (shatter, applier-effect expiry).
    pub fn break_object(&mut self) {
        self.shots_cur = 0;
    }

    pub fn decrement_shots(&mut self) {
        self.shots_cur = (self.shots_cur - 1).max(0);
    }
}

/// The wear-slot array. One optional object per slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    slots: [Option<Object>; WEAR_SLOTS],
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: WearSlot) -> Option<&Object> {
        self.slots[slot as usize].as_ref()
    }

    pub fn get_mut(&mut self, slot: WearSlot) -> Option<&mut Object> {
        self.slots[slot as usize].as_mut()
    }

    /// Equip into a slot, returning whatever was there.
    pub fn equip(&mut self, slot: WearSlot, object: Object) -> Option<Object> {
        self.slots[slot as usize].replace(object)
    }

    pub fn unequip(&mut self, slot: WearSlot) -> Option<Object> {
        self.slots[slot as usize].take()
    }

    pub fn wielded(&self) -> Option<&Object> {
        self.get(WearSlot::Wield)
    }

    pub fn wielded_mut(&mut self) -> Option<&mut Object> {
        self.get_mut(WearSlot::Wield)
    }

    /// Find a worn object by id along with its slot.
    pub fn find(&self, id: ObjectId) -> Option<(WearSlot, &Object)> {
        use strum::IntoEnumIterator;
        WearSlot::iter().find_map(|slot| {
            self.get(slot)
                .filter(|o| o.id == id)
                .map(|o| (slot, o))
        })
    }

    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.slots.iter().flatten()
    }
}
