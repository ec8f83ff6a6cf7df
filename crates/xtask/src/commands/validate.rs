//! Validate rules content
//!
//! Loading already rejects duplicate ids and prerequisite cycles; this
//! command additionally lists references to names nothing defines.

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use crate::utils::load_content;

/// Validate catalog and roster content
#[derive(Parser)]
pub struct Validate {
    /// Fail when prerequisites reference unknown names
    #[arg(long)]
    strict: bool,

    /// Custom data directory (defaults to $RULES_DATA_DIR or ./data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        let content = load_content(self.data_dir)?;
        let library = &content.library;

        println!("{}", style("=== Content Summary ===").bold().green());
        println!("  Catalog entries: {}", library.catalog().len());
        println!("  Characters: {}", library.roster().len());
        println!(
            "  Prerequisite depth limit: {}",
            content.config.max_prerequisite_depth
        );
        println!(
            "  Item-only attributes: {}",
            content.config.item_only_attributes.len()
        );
        println!();

        let unresolved = library.unresolved_references();
        if unresolved.is_empty() {
            println!("{}", style("✓ No unresolved references").green());
            return Ok(());
        }

        println!(
            "{}",
            style(format!("{} unresolved references:", unresolved.len()))
                .yellow()
                .bold()
        );
        for reference in &unresolved {
            println!("  {} → {}", reference.from, reference.to);
        }

        if self.strict {
            anyhow::bail!("{} unresolved references", unresolved.len());
        }
        Ok(())
    }
}
