//! Development tasks for the score server
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, Keygen, SignSubmission, TailLogs};

/// Development tasks for the score server
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the score server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate a new receipt signing key
    Keygen(Keygen),

    /// Sign a score claim and print the /submit body
    SignSubmission(SignSubmission),

    /// Monitor server logs in real-time
    TailLogs(TailLogs),

    /// Delete server log files
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for LOG_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::Keygen(cmd) => cmd.execute(),
        Command::SignSubmission(cmd) => cmd.execute(),
        Command::TailLogs(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
