//! Named-skill table for players.
//!
//! Skills are keyed by name ("sword", "defense", "block", "parry", ...)
//! and hold a gained value in 0..=300. Monsters store flat weapon and
//! defense skill integers instead and never touch this table.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub const MAX_SKILL_GAINED: i32 = 300;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillTable {
    skills: HashMap<String, i32>,
}

impl SkillTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gained value for a skill; `None` when the skill is unknown.
    pub fn gained(&self, name: &str) -> Option<i32> {
        self.skills.get(name).copied()
    }

    pub fn knows(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Learn a skill at the given gained value (clamped into range).
    pub fn learn(&mut self, name: &str, gained: i32) {
        self.skills
            .insert(name.to_string(), gained.clamp(0, MAX_SKILL_GAINED));
    }

    pub fn improve(&mut self, name: &str, amount: i32) {
        if let Some(gained) = self.skills.get_mut(name) {
            *gained = (*gained + amount).clamp(0, MAX_SKILL_GAINED);
        }
    }

    pub fn forget(&mut self, name: &str) {
        self.skills.remove(name);
    }
}
