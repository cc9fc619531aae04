//! Ordered collection of effects on one actor, room or exit.

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::effects::catalog::{EffectCatalog, EffectCatalogEntry};
use crate::effects::instance::{EffectInstance, PERMANENT};
use crate::effects::script::{ParentRef, ScriptRunner};
use crate::object::{Equipment, ObjectId};
use crate::world::MessageLog;

/// Everything an effect operation needs besides the collection itself.
pub struct EffectCtx<'a> {
    pub catalog: &'a EffectCatalog,
    pub runner: &'a mut dyn ScriptRunner,
    pub msgs: &'a mut MessageLog,
    pub parent: ParentRef,
    /// Wall-clock seconds.
    pub t: i64,
}

/// Request for `EffectCollection::add`. `duration`/`strength` of `None`
/// keep whatever the compute script produced.
#[derive(Debug, Clone, Default)]
pub struct AddEffect {
    pub name: String,
    pub duration: Option<i64>,
    pub strength: Option<i32>,
    pub owner: Option<ActorId>,
    pub applier: Option<ObjectId>,
    pub show: bool,
    /// Keep the applier reference after post-apply. Only sensible for
    /// equipped-object appliers.
    pub keep_applier: bool,
}

impl AddEffect {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            show: true,
            ..Self::default()
        }
    }

    pub fn duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn permanent(mut self) -> Self {
        self.duration = Some(PERMANENT);
        self
    }

    pub fn strength(mut self, strength: i32) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn applier(mut self, applier: ObjectId) -> Self {
        self.applier = Some(applier);
        self.keep_applier = true;
        self
    }

    pub fn silent(mut self) -> Self {
        self.show = false;
        self
    }
}

/// What fell off during a remove or pulse sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEffect {
    pub name: String,
    /// A worn applier object broken by the removal.
    pub broken_applier: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectCollection {
    effects: Vec<EffectInstance>,
}

impl EffectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectInstance> {
        self.effects.iter()
    }

    pub fn get_exact(&self, name: &str) -> Option<&EffectInstance> {
        self.effects.iter().find(|e| e.name() == name)
    }

    pub fn get_exact_mut(&mut self, name: &str) -> Option<&mut EffectInstance> {
        self.effects.iter_mut().find(|e| e.name() == name)
    }

    /// Exact-name or base-effect-alias lookup. When several instances
    /// satisfy a base-effect query, the strongest wins.
    pub fn get(&self, name: &str, catalog: &EffectCatalog) -> Option<&EffectInstance> {
        self.effects
            .iter()
            .filter(|e| {
                e.name() == name
                    || catalog
                        .get(e.name())
                        .is_some_and(|entry| entry.base_effects.iter().any(|b| b == name))
            })
            .max_by_key(|e| e.strength())
    }

    pub fn is_effected(&self, name: &str, catalog: &EffectCatalog) -> bool {
        self.get(name, catalog).is_some()
    }

    /// Effect strength, or 0 when absent.
    pub fn strength(&self, name: &str, catalog: &EffectCatalog) -> i32 {
        self.get(name, catalog).map_or(0, |e| e.strength())
    }

    /// Overwrite policy. Object-sourced (applier-set) effects cannot be
    /// overwritten by recasting; a permanent effect beats a non-permanent
    /// one regardless of strength; a weaker effect never overwrites; a
    /// non-permanent effect never replaces a permanent one.
    fn will_overwrite(new: &EffectInstance, existing: &EffectInstance) -> bool {
        if new.is_permanent() && !existing.is_permanent() {
            return true;
        }
        if existing.applier().is_some() {
            return false;
        }
        if new.strength() < existing.strength() {
            return false;
        }
        if existing.is_permanent() && !new.is_permanent() {
            return false;
        }
        true
    }

    fn run_hook(
        runner: &mut dyn ScriptRunner,
        script: Option<&str>,
        effect: &mut EffectInstance,
        parent: ParentRef,
    ) -> bool {
        match script {
            Some(script) => {
                let applier = effect.applier();
                runner.run(script, effect, parent, applier)
            }
            None => true,
        }
    }

    /// Add an effect. Unknown names are a silent no-op. Returns the
    /// inserted instance, or `None` when it was rejected.
    pub fn add(
        &mut self,
        req: AddEffect,
        ctx: &mut EffectCtx,
        mut equipment: Option<&mut Equipment>,
    ) -> Option<&EffectInstance> {
        let entry = ctx.catalog.get(&req.name)?;

        let mut new = EffectInstance::new(&req.name, ctx.t);
        new.set_duration(entry.default_duration);
        new.set_strength(entry.default_strength);
        new.set_owner(req.owner);
        new.set_applier(req.applier);

        // Compute may rewrite duration and strength. Its result is
        // advisory; a broken script producing an out-of-range negative
        // duration gets clamped to a minute instead of aborting.
        Self::run_hook(
            ctx.runner,
            entry.compute_script.as_deref(),
            &mut new,
            ctx.parent,
        );
        if new.duration() < PERMANENT {
            new.set_duration(60);
        }
        if let Some(duration) = req.duration {
            new.set_duration(duration);
        }
        if let Some(strength) = req.strength {
            new.set_strength(strength);
        }

        let had_old = match self.get_exact(&req.name) {
            Some(old) => {
                if !Self::will_overwrite(&new, old) {
                    if req.show && matches!(ctx.parent, ParentRef::Creature(_)) {
                        ctx.msgs.push("The effect didn't take hold.");
                    }
                    return None;
                }
                true
            }
            None => false,
        };

        // Pre-apply runs before the replaced effect is removed.
        Self::run_hook(
            ctx.runner,
            entry.pre_apply_script.as_deref(),
            &mut new,
            ctx.parent,
        );
        self.remove(&req.name, false, true, None, ctx, equipment.as_deref_mut());

        // Announce only on a fresh application, not an overwrite.
        if !had_old && req.show {
            ctx.msgs.push(format!("{} takes hold.", entry.display));
        }

        Self::run_hook(
            ctx.runner,
            entry.apply_script.as_deref(),
            &mut new,
            ctx.parent,
        );
        self.effects.push(new);

        if let Some(inserted) = self.effects.last_mut() {
            Self::run_hook(
                ctx.runner,
                entry.post_apply_script.as_deref(),
                inserted,
                ctx.parent,
            );
            if !req.keep_applier {
                inserted.set_applier(None);
            }
        }

        self.effects.last()
    }

    /// Remove an exact-name effect. Refuses permanents unless allowed,
    /// and honors a from-applier match. Runs the un-apply script and
    /// breaks a still-worn applier object.
    pub fn remove(
        &mut self,
        name: &str,
        show: bool,
        remove_permanent: bool,
        from_applier: Option<ObjectId>,
        ctx: &mut EffectCtx,
        equipment: Option<&mut Equipment>,
    ) -> Option<RemovedEffect> {
        let idx = self.effects.iter().position(|e| e.name() == name)?;
        {
            let e = &self.effects[idx];
            if e.is_permanent() && !remove_permanent {
                return None;
            }
            if from_applier.is_some() && e.applier() != from_applier {
                return None;
            }
        }
        let mut e = self.effects.remove(idx);
        let entry = ctx.catalog.get(name);
        if let Some(entry) = entry {
            Self::run_hook(
                ctx.runner,
                entry.unapply_script.as_deref(),
                &mut e,
                ctx.parent,
            );
            if show {
                ctx.msgs.push(format!("{} wears off.", entry.display));
            }
        }

        let mut broken = None;
        if let (Some(equipment), Some(applier)) = (equipment, e.applier()) {
            if let Some((slot, _)) = equipment.find(applier) {
                if let Some(mut object) = equipment.unequip(slot) {
                    object.break_object();
                    ctx.msgs.push(format!("Your {} breaks apart.", object.name));
                    broken = Some(applier);
                }
            }
        }

        Some(RemovedEffect {
            name: name.to_string(),
            broken_applier: broken,
        })
    }

    /// One tick: decay every instance by elapsed time, remove the ones
    /// that hit zero, and fire due pulse scripts on the rest.
    pub fn pulse(
        &mut self,
        ctx: &mut EffectCtx,
        mut equipment: Option<&mut Equipment>,
    ) -> Vec<RemovedEffect> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.effects.len() {
            let expired = self.effects[i].update_last_mod(ctx.t, equipment.as_deref_mut());
            if expired {
                let name = self.effects[i].name().to_string();
                if let Some(gone) =
                    self.remove(&name, true, true, None, ctx, equipment.as_deref_mut())
                {
                    removed.push(gone);
                }
                continue;
            }
            if let Some(entry) = ctx.catalog.get(self.effects[i].name()) {
                if entry.pulsed && self.effects[i].time_for_pulse(ctx.t, entry.pulse_delay) {
                    Self::run_hook(
                        ctx.runner,
                        entry.pulse_script.as_deref(),
                        &mut self.effects[i],
                        ctx.parent,
                    );
                }
            }
            i += 1;
        }
        removed
    }

    /// Clear the weak owner back-reference everywhere it matches
    /// (the owning creature is gone).
    pub fn remove_owner(&mut self, owner: ActorId) {
        for e in &mut self.effects {
            if e.is_owner(owner) {
                e.set_owner(None);
            }
        }
    }

    /// Remove the catalog-declared opposite of an effect (curing
    /// "curse" when "bless" lands, and so on).
    pub fn remove_opposite(
        &mut self,
        entry: &EffectCatalogEntry,
        ctx: &mut EffectCtx,
        equipment: Option<&mut Equipment>,
    ) -> Option<RemovedEffect> {
        let opposite = entry.opposite_effect.clone()?;
        self.remove(&opposite, true, false, None, ctx, equipment)
    }
}
