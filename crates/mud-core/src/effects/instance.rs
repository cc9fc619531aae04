//! A single applied effect.

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::object::{Equipment, ObjectId};
use crate::save::SaveError;

/// Sentinel duration for effects that never decay.
pub const PERMANENT: i64 = -1;

/// One effect applied to a creature, room or exit.
///
/// Owner and applier are weak ids: the caster logging out or the source
/// object being destroyed leaves them dangling, and resolution simply
/// finds nothing. Lifetime is owned by the parent's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    name: String,
    duration: i64,
    strength: i32,
    extra: i32,
    #[serde(default)]
    last_mod: i64,
    #[serde(default)]
    last_pulse: i64,
    #[serde(default)]
    owner: Option<ActorId>,
    #[serde(default)]
    applier: Option<ObjectId>,
}

impl EffectInstance {
    pub fn new(name: &str, t: i64) -> Self {
        Self {
            name: name.to_string(),
            duration: 0,
            strength: 0,
            extra: 0,
            last_mod: t,
            last_pulse: t,
            owner: None,
            applier: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: i64) {
        self.duration = duration;
    }

    pub fn is_permanent(&self) -> bool {
        self.duration == PERMANENT
    }

    pub fn strength(&self) -> i32 {
        self.strength
    }

    pub fn set_strength(&mut self, strength: i32) {
        self.strength = strength;
    }

    pub fn extra(&self) -> i32 {
        self.extra
    }

    pub fn set_extra(&mut self, extra: i32) {
        self.extra = extra;
    }

    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }

    pub fn is_owner(&self, actor: ActorId) -> bool {
        self.owner == Some(actor)
    }

    pub fn applier(&self) -> Option<ObjectId> {
        self.applier
    }

    pub fn set_applier(&mut self, applier: Option<ObjectId>) {
        self.applier = applier;
    }

    /// Decay by the wall-clock seconds elapsed since the last update,
    /// flooring at zero. Returns true when the effect just expired.
    ///
    /// When the applier is a still-worn object, its displayed duration
    /// is written back so the item stays in sync with the effect.
    pub fn update_last_mod(&mut self, t: i64, equipment: Option<&mut Equipment>) -> bool {
        if self.is_permanent() {
            self.last_mod = t;
            return false;
        }
        let elapsed = (t - self.last_mod).max(0);
        self.last_mod = t;
        self.duration = (self.duration - elapsed).max(0);
        if let (Some(equipment), Some(applier)) = (equipment, self.applier) {
            if let Some(object) = equipment.find_mut(applier) {
                object.effect_duration = self.duration;
            }
        }
        self.duration == 0
    }

    /// Whether the pulse script is due, and if so, stamp the pulse time.
    pub fn time_for_pulse(&mut self, t: i64, pulse_delay: i64) -> bool {
        if t - self.last_pulse < pulse_delay {
            return false;
        }
        self.last_pulse = t;
        true
    }

    pub fn to_node(&self) -> Result<serde_json::Value, SaveError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Restore from a node, validating the effect still exists in the
    /// catalog. Timestamps restart at load time.
    pub fn from_node(
        node: serde_json::Value,
        catalog: &crate::effects::catalog::EffectCatalog,
        t: i64,
    ) -> Result<Self, SaveError> {
        let mut instance: EffectInstance = serde_json::from_value(node)?;
        if catalog.get(&instance.name).is_none() {
            return Err(SaveError::UnknownEffect(instance.name));
        }
        instance.last_mod = t;
        instance.last_pulse = t;
        Ok(instance)
    }
}
