//! Check a roster character against catalog prerequisites

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use rules_core::{Entity, PrerequisiteReport, Resolver};

use crate::utils::{find_character, load_content};

/// Check prerequisites of catalog entries
#[derive(Parser)]
pub struct Check {
    /// Character name (case-insensitive)
    #[arg(value_name = "CHARACTER")]
    character: String,

    /// Catalog entries to check (defaults to every entry with a prerequisite)
    #[arg(value_name = "ENTRY")]
    entries: Vec<String>,

    /// Log unmet prerequisites as warnings
    #[arg(long)]
    notify: bool,

    /// Show successes and informational failures too
    #[arg(short, long)]
    verbose: bool,

    /// Custom data directory (defaults to $RULES_DATA_DIR or ./data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let content = load_content(self.data_dir)?;
        let library = &content.library;
        let character = find_character(library, &self.character)?;
        let resolver = Resolver::new(library, &content.config);

        let entries: Vec<&Entity> = if self.entries.is_empty() {
            library
                .catalog()
                .iter()
                .filter(|entry| entry.prerequisite.is_some())
                .collect()
        } else {
            self.entries
                .iter()
                .map(|name| {
                    library
                        .entry(name)
                        .ok_or_else(|| anyhow::anyhow!("Catalog entry not found: {}", name))
                })
                .collect::<Result<_>>()?
        };

        println!(
            "{} {}",
            style("Character:").bold().cyan(),
            character.name
        );
        println!();

        let mut met = 0;
        for entry in &entries {
            let prerequisites: Vec<_> = entry.prerequisite.iter().cloned().collect();
            let report = resolver.meets_prerequisites(Some(character), &prerequisites, self.notify);
            if !report.does_fail {
                met += 1;
            }
            print_report(entry, &report, self.verbose);
        }

        println!();
        println!(
            "{} {}/{} met",
            style("Result:").bold().cyan(),
            met,
            entries.len()
        );
        Ok(())
    }
}

fn print_report(entry: &Entity, report: &PrerequisiteReport, verbose: bool) {
    let mark = if report.does_fail {
        style("✗").red().bold()
    } else {
        style("✓").green().bold()
    };
    println!("{} {} {}", mark, style(&entry.name).bold(), style(entry.kind).dim());

    for failure in &report.failures {
        if failure.fail {
            println!("    {} {}", style("unmet:").red(), failure.message);
        } else if verbose {
            println!("    {} {}", style("note:").yellow(), failure.message);
        }
    }
    if verbose {
        for failure in &report.silent_failures {
            println!("    {} {}", style("detail:").dim(), failure.message);
        }
        for success in &report.successes {
            println!(
                "    {} {} (x{})",
                style("met:").green(),
                success.prerequisite,
                success.count
            );
        }
    }
}
