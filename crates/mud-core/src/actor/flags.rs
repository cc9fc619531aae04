//! Player and monster flag sets.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PlayerFlags: u32 {
        const UNCONSCIOUS  = 1 << 0;
        const STUNNED      = 1 << 1;
        const HIDDEN       = 1 << 2;
        const FREE_ACTION  = 1 << 3;
        const FOCUSED      = 1 << 4;
        const MISTBANE     = 1 << 5;
        /// Only enchanted weapons can land on this player.
        const ENCHANT_ONLY = 1 << 6;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MonsterFlags: u32 {
        const UN_DODGEABLE           = 1 << 0;
        const UNKILLABLE             = 1 << 1;
        const NO_AUTO_CRIT           = 1 << 2;
        const IMMUNE_CRITICAL        = 1 << 3;
        const ENCHANTED_WEAPONS_ONLY = 1 << 4;
        const PLUS_TWO               = 1 << 5;
        const PLUS_THREE             = 1 << 6;
        const CAN_RIPOSTE            = 1 << 7;
        const PET                    = 1 << 8;
    }
}

// Manual serde impls - flags persist as raw bits
impl Serialize for PlayerFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PlayerFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(PlayerFlags::from_bits_truncate(u32::deserialize(
            deserializer,
        )?))
    }
}

impl Serialize for MonsterFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MonsterFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(MonsterFlags::from_bits_truncate(u32::deserialize(
            deserializer,
        )?))
    }
}
