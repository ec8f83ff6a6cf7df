//! Rules configuration loader.

use std::path::Path;

use rules_core::RulesConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for rules configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys left out of the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<RulesConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RulesConfig> {
        let config: RulesConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules config TOML: {}", e))?;

        if config.max_prerequisite_depth == 0 {
            anyhow::bail!("max_prerequisite_depth must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = ConfigLoader::parse("max_prerequisite_depth = 8\n").unwrap();
        assert_eq!(config.max_prerequisite_depth, 8);
        assert!(config.is_item_only("damage"));
    }

    #[test]
    fn deny_list_is_replaced_not_merged() {
        let config = ConfigLoader::parse("item_only_attributes = [\"ammo\"]\n").unwrap();
        assert!(config.is_item_only("ammo"));
        assert!(!config.is_item_only("damage"));
    }

    #[test]
    fn zero_depth_is_rejected() {
        assert!(ConfigLoader::parse("max_prerequisite_depth = 0\n").is_err());
    }
}
