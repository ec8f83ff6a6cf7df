//! Character roster loader.

use std::path::Path;

use rules_core::Entity;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub characters: Vec<Entity>,
}

/// Loader for characters and everything they own.
pub struct RosterLoader;

impl RosterLoader {
    /// Load characters from a RON file.
    ///
    /// Only actor kinds (`Character`, `Npc`) may sit at the top level.
    pub fn load(path: &Path) -> LoadResult<Vec<Entity>> {
        let content = read_file(path)?;
        let roster: Roster = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        if let Some(stray) = roster.characters.iter().find(|entity| !entity.kind.is_actor()) {
            anyhow::bail!(
                "Roster entry '{}' is a {}, not a character",
                stray.name,
                stray.kind
            );
        }
        Ok(roster.characters)
    }
}
