//! Reference catalog loader.

use std::path::Path;

use rules_core::Entity;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCatalog {
    pub entities: Vec<Entity>,
}

/// Loader for the reference catalog (feats, talents, classes, gear).
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load catalog entries from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<Entity>> {
        let content = read_file(path)?;
        let catalog: EntityCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse entity catalog RON: {}", e))?;

        Ok(catalog.entities)
    }
}
