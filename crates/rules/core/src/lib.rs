//! Inheritable attribute resolution and prerequisite evaluation.
//!
//! `rules-core` resolves attribute values that characters inherit from the
//! entities they own (classes, feats, gear, effects) and decides whether a
//! character meets a prerequisite expression. Both are pure functions over an
//! in-memory entity graph; the two meet only through the [`CharacterSheet`]
//! accessor trait.
//!
//! Everything ambient (owner lookup, item-only deny-list, cache) is passed in
//! explicitly through a [`Resolver`].
pub mod attribute;
pub mod cache;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod prerequisite;
pub mod sheet;

pub use attribute::{
    AttributeFilter, AttributeQuery, ParseReduceError, Predicate, Reduce, Resolved, Resolver,
};
pub use cache::{CacheStats, ResolutionCache};
pub use config::RulesConfig;
pub use error::{CatalogError, ErrorSeverity, RulesError};
pub use lookup::{EntityLookup, NoLookup, index_entities};
pub use model::{
    Ability, ActiveEffect, AttributeChange, AttributeValue, ChangeSource, DeclaredChange, Entity,
    EntityId, EntityKind, LevelRecord, Profile, Sex,
};
pub use prerequisite::{
    Evaluator, Failure, Holding, Prerequisite, PrerequisiteReport, Success, meets_prerequisites,
};
pub use sheet::{ActorSheet, CharacterSheet};
