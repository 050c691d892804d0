//! Server signing key generation command.

use anyhow::Result;
use clap::Parser;
use console::style;
use game_server::crypto::address_of;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

/// Generate a new receipt signing key
#[derive(Debug, Parser)]
pub struct Keygen {
    /// Print only the `SERVER_SIGNING_KEY=...` line (for piping into .env)
    #[arg(long)]
    pub env: bool,
}

impl Keygen {
    pub fn execute(&self) -> Result<()> {
        let key = SigningKey::random(&mut OsRng);
        let secret = format!("0x{}", hex::encode(key.to_bytes()));
        let address = address_of(key.verifying_key()).to_checksum(None);

        if self.env {
            println!("SERVER_SIGNING_KEY={}", secret);
            return Ok(());
        }

        println!("{}", style("🔑 Generated receipt signing key").green().bold());
        println!();
        println!("Trusted address: {}", style(&address).cyan());
        println!();
        println!("Add this to your .env (keep it secret):");
        println!("  SERVER_SIGNING_KEY={}", secret);

        Ok(())
    }
}
