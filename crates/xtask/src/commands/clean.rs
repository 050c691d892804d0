//! Clean server logs command
//!
//! Deletes rotated backend and frontend log files.
//!
//! Safety: Always prompts for confirmation before deletion.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};

use crate::dirs::{self, LogKind};

/// Clean server logs
#[derive(Parser, Debug)]
pub struct Clean {
    /// Only clean this log (defaults to both)
    #[arg(long, value_enum)]
    pub only: Option<LogKind>,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        let log_dir = dirs::log_dir();

        let kinds: &[LogKind] = match self.only {
            Some(LogKind::Backend) => &[LogKind::Backend],
            Some(LogKind::Frontend) => &[LogKind::Frontend],
            None => &[LogKind::Backend, LogKind::Frontend],
        };

        let mut targets = Vec::new();
        for kind in kinds {
            targets.extend(dirs::list_logs(&log_dir, *kind)?);
        }

        if targets.is_empty() {
            println!("{}", style("Nothing to clean - no log files yet").dim());
            return Ok(());
        }

        println!("{}", style("🧹 Clean Score Server Logs").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for path in &targets {
            println!("  {} {}", style("→").cyan(), style(path.display()).dim());
        }
        println!();

        if !self.yes && !confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for path in targets {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete: {}", path.display()))?;
        }

        println!("{}", style("✓ Cleanup complete!").green().bold());
        Ok(())
    }
}

/// Prompt user for confirmation
fn confirm() -> Result<bool> {
    print!("{} ", style("Proceed? [y/N]").yellow().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
