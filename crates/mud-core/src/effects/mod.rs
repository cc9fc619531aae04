//! Status effects: catalog templates, applied instances, per-parent
//! collections and the script hook seam.

pub mod catalog;
pub mod collection;
pub mod instance;
pub mod script;

pub use catalog::{EffectCatalog, EffectCatalogEntry};
pub use collection::{AddEffect, EffectCollection, EffectCtx, RemovedEffect};
pub use instance::{EffectInstance, PERMANENT};
pub use script::{NoopRunner, ParentRef, ScriptRunner};
