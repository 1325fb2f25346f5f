use crate::strategy::SealError;
use thiserror::Error;

/// Rejection reasons for `submit_transaction`. The pool is unchanged on
/// every error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("transaction amount must be greater than zero")]
    InvalidAmount,

    #[error("transaction signature verification failed")]
    BadSignature,

    #[error("transaction is already pooled or chained")]
    DuplicateTransaction,

    #[error("insufficient balance for {address}: balance {balance}, needed {amount}")]
    InsufficientBalance {
        address: String,
        balance: u128,
        amount: u128,
    },
}

/// Rejection reasons for block production. The pool is unchanged on every
/// error; the producer may retry later.
#[derive(Debug, Error)]
pub enum ProductionError {
    #[error("producer {0} is not eligible to seal the next block")]
    NotEligible(String),

    #[error("pending pool is empty and this chain forbids empty blocks")]
    EmptyPool,

    #[error("sealing failed: {0}")]
    Sealing(#[from] SealError),

    /// The sealed block no longer extends the tip — a competing block won
    /// the race while sealing ran. The candidate is discarded, nothing was
    /// applied.
    #[error("candidate was superseded by a competing block")]
    Superseded,

    /// A locally produced block failed validation. This implies a bug, not
    /// bad input, and the mutation path must stop rather than corrupt state.
    #[error("locally produced block failed validation: {0}")]
    Invariant(Box<ValidationError>),
}

/// Rejection reasons for `append_block` and full-chain validation. The chain
/// is unchanged on every error — no partial application is ever observable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("chain is empty")]
    EmptyChain,

    #[error("genesis block is malformed: {0}")]
    BadGenesis(String),

    #[error("remote chain was built on a different genesis block")]
    GenesisMismatch,

    #[error("block index {found} does not follow tip (expected {expected})")]
    NonSequentialIndex { expected: u64, found: u64 },

    #[error("block {index} does not link to its predecessor's hash")]
    BrokenLinkage { index: u64 },

    #[error("block {index} hash does not recompute from its contents")]
    HashMismatch { index: u64 },

    #[error("block {index} seal is invalid: {source}")]
    Seal { index: u64, source: SealError },

    #[error("block {index} contains a zero-amount transfer")]
    InvalidAmount { index: u64 },

    #[error("block {index} contains a transaction with a bad signature")]
    BadSignature { index: u64 },

    #[error("block {index} contains a transaction that is already chained")]
    DuplicateTransaction { index: u64 },

    #[error("block {index} overdraws {address}: balance {balance}, needed {amount}")]
    InsufficientBalance {
        index: u64,
        address: String,
        balance: u128,
        amount: u128,
    },

    #[error("snapshot integrity hash does not match its contents")]
    CorruptSnapshot,
}
