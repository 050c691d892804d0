//! Authentication of client claims.

use super::signature::RecoverableSignature;

/// Checks that a claimed address produced a personal-message signature.
///
/// Stateless; one instance can be shared across every in-flight request.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// True iff `signature` over `message` recovers to `claimed_address`
    /// (compared case-insensitively).
    ///
    /// Decoding and recovery failures are logged and reported as `false`.
    pub fn verify(&self, claimed_address: &str, message: &str, signature: &str) -> bool {
        let recovered = RecoverableSignature::parse(signature)
            .and_then(|sig| sig.recover(message.as_bytes()));

        match recovered {
            Ok(address) => address
                .to_checksum(None)
                .eq_ignore_ascii_case(claimed_address),
            Err(err) => {
                tracing::warn!("Signature verification error: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{address_of, sign_personal_message};
    use k256::ecdsa::SigningKey;

    fn wallet(byte: u8) -> (SigningKey, String) {
        let key = SigningKey::from_slice(&[byte; 32]).unwrap();
        let address = address_of(key.verifying_key()).to_checksum(None);
        (key, address)
    }

    #[test]
    fn accepts_matching_signer_in_any_case() {
        let (key, address) = wallet(21);
        let sig = sign_personal_message(&key, b"{\"timestamp\":1}").unwrap().to_hex();

        let verifier = SignatureVerifier;
        assert!(verifier.verify(&address, "{\"timestamp\":1}", &sig));
        assert!(verifier.verify(&address.to_lowercase(), "{\"timestamp\":1}", &sig));
        assert!(verifier.verify(
            &format!("0x{}", address[2..].to_uppercase()),
            "{\"timestamp\":1}",
            &sig
        ));
    }

    #[test]
    fn rejects_other_signers_and_tampered_messages() {
        let verifier = SignatureVerifier;

        for seed in 1..=8u8 {
            let (key, address) = wallet(seed);
            let (_, other) = wallet(seed.wrapping_add(100));
            let message = format!("{{\"timestamp\":{seed}}}");
            let sig = sign_personal_message(&key, message.as_bytes())
                .unwrap()
                .to_hex();

            assert!(verifier.verify(&address, &message, &sig));
            assert!(!verifier.verify(&other, &message, &sig));
            assert!(!verifier.verify(&address, &format!("{message} "), &sig));
        }
    }

    #[test]
    fn malformed_signatures_are_false_not_errors() {
        let (_, address) = wallet(5);
        let verifier = SignatureVerifier;
        assert!(!verifier.verify(&address, "msg", ""));
        assert!(!verifier.verify(&address, "msg", "0xnothex"));
        assert!(!verifier.verify(&address, "msg", &format!("0x{}", "11".repeat(65))));
    }
}
