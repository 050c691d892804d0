//! Server-side score signing.

use std::fmt;

use alloy_primitives::Address;
use k256::ecdsa::SigningKey;

use super::signature::{RecoverableSignature, SignatureError, address_of, sign_personal_message};

/// Holds the trusted server key and signs score receipts with it.
#[derive(Clone)]
pub struct ScoreSigner {
    key: SigningKey,
    address: Address,
}

impl ScoreSigner {
    pub fn new(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// Parses a 32-byte hex secret, with or without a `0x` prefix.
    pub fn from_hex(secret: &str) -> Result<Self, SignatureError> {
        let secret = secret.trim();
        let digits = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = hex::decode(digits)?;
        let key = SigningKey::from_slice(&bytes).map_err(|_| SignatureError::InvalidKey)?;
        Ok(Self::new(key))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 form of the signer address, handed to clients as `trusted`.
    pub fn trusted_identity(&self) -> String {
        self.address.to_checksum(None)
    }

    /// The exact text a receipt signature covers.
    pub fn canonical_message(score: u64, player_address: &str, timestamp: i64) -> String {
        format!(
            "score:{}|address:{}|timestamp:{}",
            score,
            player_address.to_lowercase(),
            timestamp
        )
    }

    /// Signs a receipt and returns the `0x`-prefixed signature hex.
    pub fn sign(
        &self,
        score: u64,
        player_address: &str,
        timestamp: i64,
    ) -> Result<String, SignatureError> {
        let message = Self::canonical_message(score, player_address, timestamp);
        let signature = sign_personal_message(&self.key, message.as_bytes())?;
        Ok(signature.to_hex())
    }

    /// Recovers the signer of a receipt, for clients checking it against `trusted`.
    pub fn recover_receipt_signer(
        score: u64,
        player_address: &str,
        timestamp: i64,
        signature: &str,
    ) -> Result<Address, SignatureError> {
        let message = Self::canonical_message(score, player_address, timestamp);
        RecoverableSignature::parse(signature)?.recover(message.as_bytes())
    }
}

impl fmt::Debug for ScoreSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreSigner")
            .field("address", &self.trusted_identity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn canonical_message_lowercases_address() {
        assert_eq!(
            ScoreSigner::canonical_message(12, "0xAbCd", 1_700_000_000),
            "score:12|address:0xabcd|timestamp:1700000000"
        );
    }

    #[test]
    fn receipts_recover_to_trusted_identity() {
        let signer = ScoreSigner::from_hex(SECRET).unwrap();
        let player = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

        let sig = signer.sign(42, player, 1_700_000_123).unwrap();
        let recovered =
            ScoreSigner::recover_receipt_signer(42, player, 1_700_000_123, &sig).unwrap();
        assert_eq!(recovered, signer.address());

        // Tampering with the score changes the recovered signer.
        let forged = ScoreSigner::recover_receipt_signer(43, player, 1_700_000_123, &sig).unwrap();
        assert_ne!(forged, signer.address());
    }

    #[test]
    fn accepts_secret_without_prefix_and_rejects_garbage() {
        let with = ScoreSigner::from_hex(SECRET).unwrap();
        let without = ScoreSigner::from_hex(&SECRET[2..]).unwrap();
        assert_eq!(with.address(), without.address());

        assert!(ScoreSigner::from_hex("").is_err());
        assert!(ScoreSigner::from_hex("0x1234").is_err());
        assert!(ScoreSigner::from_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn debug_does_not_leak_the_key() {
        let signer = ScoreSigner::from_hex(SECRET).unwrap();
        let rendered = format!("{signer:?}");
        assert!(!rendered.contains(&SECRET[2..]));
        assert!(rendered.contains(&signer.trusted_identity()));
    }
}
