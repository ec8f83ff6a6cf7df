//! Data-driven rules content and loaders.
//!
//! This crate turns data files into the inputs `rules-core` resolves over:
//! - Reference catalog of feats, talents, classes, gear (RON)
//! - Character roster, each character owning its items (RON)
//! - Rules configuration (TOML)
//!
//! A [`Library`] joins catalog and roster into the [`rules_core::EntityLookup`]
//! the resolver uses to find the owner of a change.

pub mod library;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use library::Library;

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, ConfigLoader, ContentFactory, RosterLoader};
