//! Cryptographic primitives for the Tessera ledger.
//!
//! - **Ed25519** for block sealing and transaction signatures
//! - **Blake2b-256** for block and transaction hashing
//! - Address derivation with `tess_` prefix, hex encoding, and checksum

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, derive_address, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
