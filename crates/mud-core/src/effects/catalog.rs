//! Shared, data-driven effect templates.
//!
//! Catalog entries are read-only at runtime. Instances reference them by
//! name; an unknown name makes the add path a silent no-op.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::save::SaveError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectCatalogEntry {
    pub name: String,
    pub display: String,
    /// Base-effect aliases this effect also satisfies (a bard song may
    /// count as both "fly" and "levitate").
    #[serde(default)]
    pub base_effects: Vec<String>,
    /// Mutually-exclusive counterpart cured on application.
    #[serde(default)]
    pub opposite_effect: Option<String>,
    #[serde(default)]
    pub uses_strength: bool,
    #[serde(default)]
    pub pulsed: bool,
    /// Seconds between pulse-script invocations.
    #[serde(default)]
    pub pulse_delay: i64,
    #[serde(default)]
    pub is_spell: bool,
    #[serde(default)]
    pub effect_type: String,
    #[serde(default)]
    pub default_duration: i64,
    #[serde(default = "default_strength")]
    pub default_strength: i32,
    #[serde(default)]
    pub compute_script: Option<String>,
    #[serde(default)]
    pub pre_apply_script: Option<String>,
    #[serde(default)]
    pub apply_script: Option<String>,
    #[serde(default)]
    pub post_apply_script: Option<String>,
    #[serde(default)]
    pub pulse_script: Option<String>,
    #[serde(default)]
    pub unapply_script: Option<String>,
}

fn default_strength() -> i32 {
    1
}

impl EffectCatalogEntry {
    pub fn new(name: &str, display: &str, duration: i64) -> Self {
        Self {
            name: name.to_string(),
            display: display.to_string(),
            base_effects: Vec::new(),
            opposite_effect: None,
            uses_strength: false,
            pulsed: false,
            pulse_delay: 0,
            is_spell: false,
            effect_type: String::new(),
            default_duration: duration,
            default_strength: 1,
            compute_script: None,
            pre_apply_script: None,
            apply_script: None,
            post_apply_script: None,
            pulse_script: None,
            unapply_script: None,
        }
    }

    pub fn spell(mut self) -> Self {
        self.is_spell = true;
        self
    }

    pub fn with_strength(mut self, strength: i32) -> Self {
        self.uses_strength = true;
        self.default_strength = strength;
        self
    }

    pub fn pulsed(mut self, delay: i64, script: &str) -> Self {
        self.pulsed = true;
        self.pulse_delay = delay;
        self.pulse_script = Some(script.to_string());
        self
    }

    pub fn opposite(mut self, name: &str) -> Self {
        self.opposite_effect = Some(name.to_string());
        self
    }

    pub fn base(mut self, name: &str) -> Self {
        self.base_effects.push(name.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectCatalog {
    entries: HashMap<String, EffectCatalogEntry>,
}

impl EffectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&EffectCatalogEntry> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, entry: EffectCatalogEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a catalog from a structured node (array of entries).
    pub fn from_node(node: serde_json::Value) -> Result<Self, SaveError> {
        let entries: Vec<EffectCatalogEntry> = serde_json::from_value(node)?;
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry);
        }
        Ok(catalog)
    }

    pub fn to_node(&self) -> Result<serde_json::Value, SaveError> {
        let entries: Vec<&EffectCatalogEntry> = self.entries.values().collect();
        Ok(serde_json::to_value(entries)?)
    }

    /// The stock effects combat reads. Worlds extend or replace this
    /// from data files.
    pub fn standard() -> Self {
        let mut c = Self::new();
        c.insert(EffectCatalogEntry::new("bless", "Bless", 600).spell().opposite("curse"));
        c.insert(EffectCatalogEntry::new("curse", "Curse", 600).spell().opposite("bless"));
        c.insert(EffectCatalogEntry::new("protection", "Protection", 600).spell());
        c.insert(EffectCatalogEntry::new("blur", "Blur", 300).spell().with_strength(5));
        c.insert(EffectCatalogEntry::new("true-sight", "True Sight", 600).spell());
        c.insert(EffectCatalogEntry::new("faerie-fire", "Faerie Fire", 300).spell().with_strength(5));
        c.insert(EffectCatalogEntry::new("dense-fog", "Dense Fog", 120).spell().with_strength(10));
        c.insert(EffectCatalogEntry::new("mist", "Mist", -1));
        c.insert(EffectCatalogEntry::new("lycanthropy", "Lycanthropy", -1));
        c.insert(EffectCatalogEntry::new("berserk", "Berserk", 60));
        c.insert(EffectCatalogEntry::new("frenzy", "Frenzy", 60));
        c.insert(EffectCatalogEntry::new("pray", "Pray", 300));
        c.insert(EffectCatalogEntry::new("dkpray", "Dark Prayer", 300));
        c.insert(EffectCatalogEntry::new("hold-person", "Hold Person", 30).spell());
        c.insert(EffectCatalogEntry::new("blindness", "Blindness", 120).spell());
        c.insert(EffectCatalogEntry::new("confusion", "Confusion", 120));
        c.insert(EffectCatalogEntry::new("death-sickness", "Death Sickness", 600));
        c.insert(
            EffectCatalogEntry::new("poison", "Poison", 120)
                .with_strength(5)
                .pulsed(20, "pulse:poison"),
        );
        c.insert(
            EffectCatalogEntry::new("regeneration", "Regeneration", 120)
                .spell()
                .with_strength(5)
                .pulsed(15, "pulse:regeneration"),
        );
        c
    }
}
