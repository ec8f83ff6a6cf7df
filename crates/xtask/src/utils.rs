//! Utility functions for xtask commands

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;

use rules_content::{ContentFactory, Library};
use rules_core::{Entity, RulesConfig};

/// Loaded and validated content.
pub struct Content {
    pub config: RulesConfig,
    pub library: Library,
}

/// Load configuration and library from the data directory
pub fn load_content(data_dir: Option<PathBuf>) -> Result<Content> {
    let data_dir = crate::dirs::data_dir(data_dir)?;
    let factory = ContentFactory::new(&data_dir);

    let config = factory
        .load_config()
        .with_context(|| format!("Failed to load rules config from {}", data_dir.display()))?;
    let library = factory.load_library()?;

    Ok(Content { config, library })
}

/// Find a roster character by name
pub fn find_character<'a>(library: &'a Library, name: &str) -> Result<&'a Entity> {
    library.character(name).ok_or_else(|| {
        let known: Vec<&str> = library
            .roster()
            .iter()
            .map(|entity| entity.name.as_str())
            .collect();
        anyhow!(
            "Character not found: {}\n\nAvailable characters: {}",
            name,
            known.join(", ")
        )
    })
}
