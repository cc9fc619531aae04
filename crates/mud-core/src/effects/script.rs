//! Script hook seam for effect lifecycle customization.
//!
//! The engine treats scripts as opaque callables: they get the mutable
//! effect instance, the parent it is attached to, and the applier id,
//! and answer with a success boolean. The boolean is advisory; the
//! structural bookkeeping in the collection runs regardless.

use crate::actor::ActorId;
use crate::effects::instance::EffectInstance;
use crate::object::ObjectId;
use crate::world::RoomId;

/// What an effect is attached to. Weak by construction: holders resolve
/// these ids through the world at use time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Creature(ActorId),
    Room(RoomId),
    Exit(RoomId, usize),
}

pub trait ScriptRunner {
    fn run(
        &mut self,
        script: &str,
        effect: &mut EffectInstance,
        parent: ParentRef,
        applier: Option<ObjectId>,
    ) -> bool;
}

/// Runner that succeeds and leaves the instance untouched. The default
/// for worlds without an embedded interpreter, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunner;

impl ScriptRunner for NoopRunner {
    fn run(
        &mut self,
        _script: &str,
        _effect: &mut EffectInstance,
        _parent: ParentRef,
        _applier: Option<ObjectId>,
    ) -> bool {
        true
    }
}
