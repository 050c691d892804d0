//! Player address syntax checks.

use alloy_primitives::Address;

/// Returns true when `input` is a syntactically valid account address.
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and
/// all-uppercase forms carry no checksum; mixed case must match EIP-55.
pub fn is_address(input: &str) -> bool {
    parse_address(input).is_some()
}

/// Parses `input` under the rules of [`is_address`].
pub fn parse_address(input: &str) -> Option<Address> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let bytes = hex::decode(digits).ok()?;
    let address = Address::from_slice(&bytes);

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        let checksummed = address.to_checksum(None);
        if &checksummed[2..] != digits {
            return None;
        }
    }

    Some(address)
}
