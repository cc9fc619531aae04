//! Ownership ledger for unique and lore items.
//!
//! Tagged items exist in limited numbers world-wide; the ledger tracks
//! who holds one so acquisition can be refused and a shattered copy
//! frees its slot.

use hashbrown::HashMap;

use crate::actor::ActorId;

#[derive(Debug, Clone)]
struct UniqueEntry {
    limit: usize,
    owners: Vec<ActorId>,
}

#[derive(Debug, Clone, Default)]
pub struct UniqueLedger {
    entries: HashMap<String, UniqueEntry>,
}

impl UniqueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lore tag with its world-wide copy limit. Untagged
    /// items never pass through the ledger.
    pub fn register(&mut self, tag: &str, limit: usize) {
        self.entries
            .entry(tag.to_string())
            .or_insert(UniqueEntry {
                limit,
                owners: Vec::new(),
            })
            .limit = limit;
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn owner_count(&self, tag: &str) -> usize {
        self.entries.get(tag).map_or(0, |e| e.owners.len())
    }

    /// Whether `who` may take a copy. Unregistered tags are
    /// unrestricted; existing owners may always keep theirs.
    pub fn can_own(&self, tag: &str, who: ActorId) -> bool {
        match self.entries.get(tag) {
            None => true,
            Some(e) => e.owners.contains(&who) || e.owners.len() < e.limit,
        }
    }

    /// Record ownership. Returns false when the limit refuses it.
    pub fn add_owner(&mut self, tag: &str, who: ActorId) -> bool {
        match self.entries.get_mut(tag) {
            None => true,
            Some(e) => {
                if e.owners.contains(&who) {
                    return true;
                }
                if e.owners.len() >= e.limit {
                    return false;
                }
                e.owners.push(who);
                true
            }
        }
    }

    /// Release one copy held by `who`, freeing the slot for someone
    /// else. No-op when they hold none.
    pub fn release_owner(&mut self, tag: &str, who: ActorId) {
        if let Some(e) = self.entries.get_mut(tag) {
            if let Some(pos) = e.owners.iter().position(|o| *o == who) {
                e.owners.remove(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_enforced() {
        let mut ledger = UniqueLedger::new();
        ledger.register("excalibur", 1);
        assert!(ledger.add_owner("excalibur", ActorId(1)));
        assert!(!ledger.can_own("excalibur", ActorId(2)));
        assert!(!ledger.add_owner("excalibur", ActorId(2)));
        // The holder itself still passes the gate.
        assert!(ledger.can_own("excalibur", ActorId(1)));
    }

    #[test]
    fn test_release_frees_slot() {
        let mut ledger = UniqueLedger::new();
        ledger.register("excalibur", 1);
        ledger.add_owner("excalibur", ActorId(1));
        ledger.release_owner("excalibur", ActorId(1));
        assert_eq!(ledger.owner_count("excalibur"), 0);
        assert!(ledger.can_own("excalibur", ActorId(2)));
    }

    #[test]
    fn test_unregistered_tag_unrestricted() {
        let mut ledger = UniqueLedger::new();
        assert!(ledger.can_own("stick", ActorId(1)));
        assert!(ledger.add_owner("stick", ActorId(1)));
        assert_eq!(ledger.owner_count("stick"), 0);
    }
}
