//! Proof-of-work sealing for the Tessera ledger.
//!
//! Difficulty convention: the work value is the first 8 little-endian bytes
//! of blake2b(block_hash ‖ nonce). A nonce is valid when its work value is
//! `>=` the chain's difficulty threshold — higher threshold = harder.

pub mod error;
pub mod generator;
pub mod validator;

pub use error::WorkError;
pub use generator::WorkGenerator;
pub use validator::{validate_work, work_value};

/// The result of PoW generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkNonce(pub u64);
