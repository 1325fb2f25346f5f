//! Account address derivation from public keys.
//!
//! Address format: `tess_` + hex(public_key, 64 chars) + hex(checksum, 8 chars).
//! Checksum: first 4 bytes of Blake2b-256(public_key).
//! Total address length: 5 (prefix) + 64 + 8 = 77 characters.

use tessera_types::{Address, PublicKey};

/// Prefix for all Tessera addresses.
const PREFIX: &str = "tess_";
/// Hex characters encoding the 32-byte public key.
const PUBKEY_CHARS: usize = 64;
/// Hex characters encoding the 4-byte checksum.
const CHECKSUM_CHARS: usize = 8;

/// Derive a `tess_`-prefixed address from a public key.
///
/// Process:
/// 1. Compute checksum = Blake2b-256(public_key)[0..4]
/// 2. Address = "tess_" + hex(public_key) + hex(checksum)
pub fn derive_address(public_key: &PublicKey) -> Address {
    let checksum = crate::blake2b_256(public_key.as_bytes());
    Address::new(format!(
        "{}{}{}",
        PREFIX,
        hex::encode(public_key.as_bytes()),
        hex::encode(&checksum[..4])
    ))
}

/// Extract the public key bytes from a valid Tessera address.
///
/// Returns `None` if the address is malformed or has an invalid checksum.
pub fn decode_address(address: &str) -> Option<[u8; 32]> {
    let encoded = address.strip_prefix(PREFIX)?;
    if encoded.len() != PUBKEY_CHARS + CHECKSUM_CHARS {
        return None;
    }

    let mut pubkey = [0u8; 32];
    hex::decode_to_slice(&encoded[..PUBKEY_CHARS], &mut pubkey).ok()?;

    let mut checksum = [0u8; 4];
    hex::decode_to_slice(&encoded[PUBKEY_CHARS..], &mut checksum).ok()?;

    let expected = crate::blake2b_256(&pubkey);
    if checksum != expected[..4] {
        return None;
    }
    Some(pubkey)
}

/// Whether a string is a well-formed Tessera address with a valid checksum.
pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}
