//! Entity graph data types.
mod change;
mod common;
mod entity;

pub use change::{AttributeChange, AttributeValue, ChangeSource, DeclaredChange};
pub use common::{Ability, EntityId, Sex};
pub use entity::{ActiveEffect, Entity, EntityKind, LevelRecord, Profile};
