//! Transaction types for the Tessera ledger.
//!
//! A transaction is an immutable record of one value transfer. Mint
//! transactions (`from: None`) create new supply and are used for block
//! rewards and genesis allocations.

pub mod error;
pub mod transaction;
pub mod validation;

pub use error::TransactionError;
pub use transaction::Transaction;
pub use validation::{check_amount, AcceptAll, Ed25519Verifier, TransactionVerifier};
