//! Recoverable secp256k1 signatures over personal messages.
//!
//! Messages are hashed the way wallets do for `personal_sign`:
//! `keccak256("\x19Ethereum Signed Message:\n" + len + message)`. The 65-byte
//! wire form is `r ‖ s ‖ v`, with `v` either `0/1` or `27/28`.

use alloy_primitives::{Address, eip191_hash_message, keccak256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use thiserror::Error;

const SIGNATURE_LEN: usize = 65;
const LEGACY_V_OFFSET: u8 = 27;

/// Errors produced while decoding, signing, or recovering signatures.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("signature must be 65 bytes, got {0}")]
    Length(usize),

    #[error("unsupported recovery byte {0}")]
    RecoveryByte(u8),

    #[error("signature has a non-canonical high s value")]
    HighS,

    #[error("invalid signing key")]
    InvalidKey,

    #[error("ecdsa failure: {0}")]
    Ecdsa(#[from] k256::ecdsa::Error),
}

/// A decoded `r ‖ s ‖ v` signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Decodes a hex signature, with or without a `0x` prefix.
    ///
    /// High-`s` signatures are rejected so a given (message, key) pair has a
    /// single accepted encoding.
    pub fn parse(input: &str) -> Result<Self, SignatureError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)?;
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::Length(bytes.len()));
        }

        let signature = Signature::from_slice(&bytes[..64])?;
        if signature.normalize_s().is_some() {
            return Err(SignatureError::HighS);
        }

        let v = bytes[64];
        let parity = if v >= LEGACY_V_OFFSET {
            v - LEGACY_V_OFFSET
        } else {
            v
        };
        if parity > 1 {
            return Err(SignatureError::RecoveryByte(v));
        }
        let recovery_id = RecoveryId::from_byte(parity).ok_or(SignatureError::RecoveryByte(v))?;

        Ok(Self {
            signature,
            recovery_id,
        })
    }

    /// Recovers the address that signed `message`.
    pub fn recover(&self, message: &[u8]) -> Result<Address, SignatureError> {
        let digest = eip191_hash_message(message);
        let key =
            VerifyingKey::recover_from_prehash(digest.as_slice(), &self.signature, self.recovery_id)?;
        Ok(address_of(&key))
    }

    /// `r ‖ s` bytes; identical for every accepted encoding of this signature.
    pub fn replay_key(&self) -> [u8; 64] {
        let mut key = [0u8; 64];
        key.copy_from_slice(&self.signature.to_bytes());
        key
    }

    /// `0x`-prefixed hex with a legacy `v` of 27/28, the form wallets emit.
    pub fn to_hex(&self) -> String {
        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.extend_from_slice(&self.signature.to_bytes());
        bytes.push(self.recovery_id.to_byte() + LEGACY_V_OFFSET);
        format!("0x{}", hex::encode(bytes))
    }
}

/// Signs `message` with the personal-message scheme.
pub fn sign_personal_message(
    key: &SigningKey,
    message: &[u8],
) -> Result<RecoverableSignature, SignatureError> {
    let digest = eip191_hash_message(message);
    let (signature, recovery_id) = key.sign_prehash_recoverable(digest.as_slice())?;
    Ok(RecoverableSignature {
        signature,
        recovery_id,
    })
}

/// Address derived from an uncompressed public key: last 20 bytes of its keccak hash.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SigningKey {
        SigningKey::from_slice(&[byte; 32]).unwrap()
    }

    #[test]
    fn sign_then_recover_yields_signer_address() {
        let signer = key(7);
        let sig = sign_personal_message(&signer, b"hello").unwrap();

        let recovered = sig.recover(b"hello").unwrap();
        assert_eq!(recovered, address_of(signer.verifying_key()));
    }

    #[test]
    fn recover_over_other_message_yields_other_address() {
        let signer = key(7);
        let sig = sign_personal_message(&signer, b"hello").unwrap();

        let recovered = sig.recover(b"hellO").unwrap();
        assert_ne!(recovered, address_of(signer.verifying_key()));
    }

    #[test]
    fn known_private_key_maps_to_known_address() {
        // Private key 0x...01 is the generator point.
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let signer = SigningKey::from_slice(&secret).unwrap();
        assert_eq!(
            address_of(signer.verifying_key()).to_checksum(None),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn hex_round_trip_preserves_signature_in_every_v_encoding() {
        let sig = sign_personal_message(&key(3), b"msg").unwrap();
        let encoded = sig.to_hex();
        assert!(encoded.starts_with("0x"));
        assert_eq!(encoded.len(), 132);

        assert_eq!(RecoverableSignature::parse(&encoded).unwrap(), sig);
        assert_eq!(RecoverableSignature::parse(&encoded[2..]).unwrap(), sig);
        assert_eq!(
            RecoverableSignature::parse(&encoded.to_uppercase().replacen("0X", "0x", 1)).unwrap(),
            sig
        );

        let mut raw = hex::decode(&encoded[2..]).unwrap();
        raw[64] -= 27;
        let zero_based = RecoverableSignature::parse(&hex::encode(&raw)).unwrap();
        assert_eq!(zero_based, sig);
        assert_eq!(zero_based.replay_key(), sig.replay_key());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            RecoverableSignature::parse("zz"),
            Err(SignatureError::Hex(_))
        ));
        assert!(matches!(
            RecoverableSignature::parse("0xabcd"),
            Err(SignatureError::Length(2))
        ));

        let sig = sign_personal_message(&key(3), b"msg").unwrap();
        let mut raw = hex::decode(&sig.to_hex()[2..]).unwrap();
        raw[64] = 30;
        assert!(matches!(
            RecoverableSignature::parse(&hex::encode(&raw)),
            Err(SignatureError::RecoveryByte(30))
        ));
    }

    #[test]
    fn rejects_high_s_twin() {
        let sig = sign_personal_message(&key(9), b"msg").unwrap();
        let raw = hex::decode(&sig.to_hex()[2..]).unwrap();

        // s' = n - s recovers the same key with flipped parity.
        let low = Signature::from_slice(&raw[..64]).unwrap();
        let (r, s) = low.split_scalars();
        let high = Signature::from_scalars(r, -*s).unwrap();
        let mut twin = high.to_bytes().to_vec();
        twin.push(raw[64] ^ 1);

        assert!(matches!(
            RecoverableSignature::parse(&hex::encode(twin)),
            Err(SignatureError::HighS)
        ));
    }
}
