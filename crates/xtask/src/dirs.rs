//! Data directory discovery
//!
//! Resolution order:
//! 1. `--data-dir` argument
//! 2. `RULES_DATA_DIR` environment variable (also read from `.env`)
//! 3. `./data`

use anyhow::Result;
use std::path::PathBuf;

/// Environment variable naming the content directory.
pub const DATA_DIR_ENV: &str = "RULES_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "data";

/// Get the content data directory
pub fn data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let dir = explicit
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    if !dir.is_dir() {
        anyhow::bail!(
            "Data directory does not exist: {}\n\nHint: pass --data-dir or set {}",
            dir.display(),
            DATA_DIR_ENV
        );
    }

    Ok(dir)
}
