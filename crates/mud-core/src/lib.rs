//! mud-core: combat resolution and status-effect engine for a
//! persistent multiplayer dungeon.
//!
//! Pure game logic with no I/O: callers own the clock, the network and
//! the data files, and drive everything through the [`world::World`]
//! arena or the lower-level combat and effect modules directly. All
//! randomness flows through one seeded [`rng::GameRng`] so a whole
//! fight replays deterministically from a seed.

pub mod actor;
pub mod combat;
pub mod effects;
pub mod object;
pub mod rng;
pub mod save;
pub mod stats;
pub mod unique;
pub mod world;

pub use actor::{ActorId, Creature, CreatureClass, CreatureKind};
pub use combat::{AttackResult, AttackType, Damage};
pub use effects::{AddEffect, EffectCatalog, EffectCollection, EffectInstance};
pub use rng::GameRng;
pub use world::{AttackOutcome, MessageLog, Room, RoomId, World};

/// Chance rolls resolve on a 0..10000 integer scale (hundredths of a
/// percent).
pub const CHANCE_SCALE: i32 = 10000;

/// Skill ratings cap at 300 points (30 nominal levels of training).
pub const MAX_SKILL: i32 = 300;
