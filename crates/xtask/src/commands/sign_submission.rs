//! Build a signed `/submit` body for manual testing.
//!
//! Signs the claim the browser client would sign, so the server can be
//! exercised with curl:
//!
//! ```text
//! cargo xtask sign-submission --session <id> --hits 3 | \
//!     curl -H 'content-type: application/json' -d @- localhost:8000/submit
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use game_server::crypto::{address_of, sign_personal_message};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use types::{ClaimMessage, RawHits, SubmitRequest};

/// Sign a score claim and print the `/submit` request body
#[derive(Debug, Parser)]
pub struct SignSubmission {
    /// Session id returned by `/start`
    #[arg(long)]
    pub session: String,

    /// Claimed hit count
    #[arg(long)]
    pub hits: i64,

    /// Player private key (hex); a throwaway key is generated when omitted
    #[arg(long, env = "PLAYER_KEY")]
    pub key: Option<String>,

    /// Claim timestamp in unix seconds (defaults to now)
    #[arg(long)]
    pub timestamp: Option<i64>,
}

impl SignSubmission {
    pub fn execute(&self) -> Result<()> {
        let key = match &self.key {
            Some(secret) => parse_key(secret)?,
            None => SigningKey::random(&mut OsRng),
        };
        let timestamp = match self.timestamp {
            Some(timestamp) => timestamp,
            None => i64::try_from(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())?,
        };

        let request = build_submission(&key, &self.session, self.hits, timestamp)?;
        println!("{}", serde_json::to_string_pretty(&request)?);
        Ok(())
    }
}

fn parse_key(secret: &str) -> Result<SigningKey> {
    let bytes = hex::decode(secret.trim().trim_start_matches("0x"))
        .context("Player key is not valid hex")?;
    SigningKey::from_slice(&bytes).context("Player key is not a valid secp256k1 scalar")
}

/// Signs the claim as the browser client does and wraps it in a submit body.
pub fn build_submission(
    key: &SigningKey,
    session_id: &str,
    hits: i64,
    timestamp: i64,
) -> Result<SubmitRequest> {
    let claim = ClaimMessage {
        hits,
        session_id: session_id.to_string(),
        timestamp,
    };
    let message = serde_json::to_string(&claim)?;
    let signature = sign_personal_message(key, message.as_bytes())?;

    Ok(SubmitRequest {
        session_id: Some(session_id.into()),
        hits: Some(RawHits::Integer(hits)),
        player_address: Some(address_of(key.verifying_key()).to_checksum(None).into()),
        message: Some(message.into()),
        signature: Some(signature.to_hex().into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_server::crypto::SignatureVerifier;
    use types::WireText;

    #[test]
    fn submission_verifies_against_its_address() {
        let key = parse_key("0x0101010101010101010101010101010101010101010101010101010101010101")
            .unwrap();
        let request = build_submission(&key, "abc", 4, 1_700_000_000).unwrap();

        fn text(field: &Option<WireText>) -> &str {
            field.as_ref().and_then(WireText::as_str).unwrap()
        }
        let message = text(&request.message);
        assert_eq!(
            message,
            r#"{"hits":4,"sessionId":"abc","timestamp":1700000000}"#
        );
        assert!(SignatureVerifier.verify(
            text(&request.player_address),
            message,
            text(&request.signature),
        ));
    }
}
