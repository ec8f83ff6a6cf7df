//! Content factory for building a validated library from data files.

use std::path::{Path, PathBuf};

use rules_core::{Entity, RulesConfig};

use crate::library::Library;
use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult, RosterLoader};

/// Content factory that loads all rules content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── rules.toml
/// ├── catalog.ron
/// └── roster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "rules.toml";
    pub const CATALOG_FILE: &'static str = "catalog.ron";
    pub const ROSTER_FILE: &'static str = "roster.ron";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load rules configuration from `rules.toml`, or defaults when the file
    /// is absent.
    pub fn load_config(&self) -> LoadResult<RulesConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no rules config; using defaults");
            return Ok(RulesConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load reference entries from `catalog.ron`.
    pub fn load_catalog(&self) -> LoadResult<Vec<Entity>> {
        let path = self.data_dir.join(Self::CATALOG_FILE);
        CatalogLoader::load(&path)
    }

    /// Load characters from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Vec<Entity>> {
        let path = self.data_dir.join(Self::ROSTER_FILE);
        RosterLoader::load(&path)
    }

    /// Load catalog and roster and validate them together.
    ///
    /// Fails on duplicate ids and prerequisite cycles. References to unknown
    /// names only produce a warning; [`Library::unresolved_references`]
    /// lists them.
    pub fn load_library(&self) -> LoadResult<Library> {
        let library = Library::new(self.load_catalog()?, self.load_roster()?)
            .map_err(|e| anyhow::anyhow!("Invalid content in {}: {}", self.data_dir.display(), e))?;

        let unresolved = library.unresolved_references();
        if !unresolved.is_empty() {
            tracing::warn!(
                count = unresolved.len(),
                "prerequisites reference names missing from the catalog"
            );
        }
        Ok(library)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
