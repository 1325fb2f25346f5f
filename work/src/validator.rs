//! PoW validation (single-shot, no search).

use tessera_crypto::blake2b_256;
use tessera_types::BlockHash;

/// Compute the work value for a (block hash, nonce) pair: the first 8
/// little-endian bytes of blake2b(block_hash ‖ nonce_le).
pub fn work_value(block_hash: &BlockHash, nonce: u64) -> u64 {
    let mut input = [0u8; 40];
    input[0..32].copy_from_slice(block_hash.as_bytes());
    input[32..40].copy_from_slice(&nonce.to_le_bytes());
    let hash = blake2b_256(&input);
    u64::from_le_bytes(hash[0..8].try_into().expect("8-byte slice"))
}

/// Validate that a nonce meets the minimum difficulty for a block hash.
pub fn validate_work(block_hash: &BlockHash, nonce: u64, min_difficulty: u64) -> bool {
    work_value(block_hash, nonce) >= min_difficulty
}
