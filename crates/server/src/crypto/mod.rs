//! Personal-message signing primitives.
//!
//! - [`signature`] decodes, signs, and recovers `r ‖ s ‖ v` signatures
//! - [`verifier`] authenticates client claims
//! - [`signer`] produces receipts with the trusted server key
//! - [`address`] validates player address syntax
pub mod address;
pub mod signature;
pub mod signer;
pub mod verifier;

pub use address::{is_address, parse_address};
pub use signature::{RecoverableSignature, SignatureError, address_of, sign_personal_message};
pub use signer::ScoreSigner;
pub use verifier::SignatureVerifier;
