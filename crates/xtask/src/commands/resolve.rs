//! Resolve inheritable attributes for a roster character
//!
//! Prints either the reduced value or, without `--reduce`, every surviving
//! change with the source that declared it.

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use rules_core::{
    AttributeChange, AttributeQuery, Predicate, Reduce, ResolutionCache, Resolved, Resolver,
};

use crate::utils::{find_character, load_content};

/// Resolve an inheritable attribute
#[derive(Parser)]
pub struct Resolve {
    /// Character name (case-insensitive)
    #[arg(value_name = "CHARACTER")]
    character: String,

    /// Attribute key to resolve (repeatable; none means every key)
    #[arg(short, long = "key", value_name = "KEY")]
    keys: Vec<String>,

    /// Reduction strategy (SUM, MAX, MIN, FIRST, OR, AND, VALUES, UNIQUE,
    /// SUMMARY, MAPPED:<inner>)
    #[arg(short, long, value_name = "STRATEGY")]
    reduce: Option<Reduce>,

    /// Drop item-only attributes (damage, cost, ...)
    #[arg(long)]
    actor_inheritable: bool,

    /// Only walk equipped items
    #[arg(long)]
    equipped_only: bool,

    /// Skip prerequisite gating
    #[arg(long)]
    ungated: bool,

    /// Custom data directory (defaults to $RULES_DATA_DIR or ./data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable listing
    Summary,
    /// Full JSON output
    Json,
}

impl Resolve {
    pub fn execute(self) -> Result<()> {
        let content = load_content(self.data_dir)?;
        let character = find_character(&content.library, &self.character)?;

        let cache = ResolutionCache::new();
        let resolver = Resolver::new(&content.library, &content.config).with_cache(&cache);

        let mut query = AttributeQuery::new().entity(character).keys(self.keys.iter().cloned());
        if let Some(strategy) = self.reduce.clone() {
            query = query.reduce(strategy);
        }
        if self.actor_inheritable {
            query = query.actor_inheritable();
        }
        if self.equipped_only {
            query = query.item_filter(Predicate::equipped());
        }
        if self.ungated {
            query = query.recursive();
        }

        let resolved = resolver.get_inheritable_attribute(&query);

        let stats = cache.stats();
        tracing::debug!(hits = stats.hits, misses = stats.misses, "resolution cache");

        match self.format {
            OutputFormat::Summary => print_summary(&character.name, &self.keys, &resolved),
            OutputFormat::Json => print_json(&resolved)?,
        }

        Ok(())
    }
}

fn print_summary(character: &str, keys: &[String], resolved: &Resolved) {
    let label = if keys.is_empty() {
        "all attributes".to_string()
    } else {
        keys.join(", ")
    };
    println!(
        "{} {} {}",
        style(character).bold().cyan(),
        style("→").dim(),
        style(label).bold()
    );
    println!();

    match resolved {
        Resolved::Changes(changes) => print_changes(changes),
        Resolved::Mapped(groups) => {
            for (key, value) in groups {
                println!("  {} {}", style(format!("{key}:")).yellow(), render(value));
            }
        }
        other => println!("  {}", render(other)),
    }
}

fn print_changes(changes: &[AttributeChange]) {
    if changes.is_empty() {
        println!("  {}", style("(no changes)").dim());
        return;
    }
    for change in changes {
        let marker = if change.is_override { " [override]" } else { "" };
        println!(
            "  {} = {}{}  {}",
            style(&change.key).yellow(),
            change.value,
            style(marker).magenta(),
            style(format!("from {}", change.source)).dim()
        );
    }
}

fn render(resolved: &Resolved) -> String {
    match resolved {
        Resolved::Number(value) => value.to_string(),
        Resolved::Flag(flag) => flag.to_string(),
        Resolved::Value(Some(value)) => value.to_string(),
        Resolved::Value(None) => "(none)".to_string(),
        Resolved::Values(values) => {
            let values: Vec<String> = values.iter().map(ToString::to_string).collect();
            format!("[{}]", values.join(", "))
        }
        Resolved::Summary(text) => text.clone(),
        Resolved::Changes(changes) => format!("{} changes", changes.len()),
        Resolved::Mapped(groups) => format!("{} keys", groups.len()),
    }
}

fn print_json(resolved: &Resolved) -> Result<()> {
    let json = serde_json::to_string_pretty(resolved)?;
    println!("{}", json);
    Ok(())
}
