//! The consensus seam.
//!
//! The trait lives with the ledger core; the three mode implementations
//! (PoW / PoS / PoA) live in `tessera-consensus`. A chain uses exactly one
//! strategy for its whole lifetime.

use crate::block::{Block, BlockProof};
use tessera_registry::ValidatorRegistry;
use tessera_transactions::Transaction;
use tessera_types::{Address, BlockHash, ConsensusMode, Timestamp};
use thiserror::Error;

/// Why a seal could not be produced or did not validate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SealError {
    #[error("block carries an unsealed candidate proof")]
    Unsealed,

    #[error("proof kind does not match the chain's consensus mode")]
    WrongProofKind,

    #[error("work value {value:#018x} is below the difficulty threshold {threshold:#018x}")]
    BelowDifficulty { value: u64, threshold: u64 },

    #[error("seal signature verification failed")]
    BadSignature,

    #[error("producer address does not decode to a public key")]
    UndecodableProducer,

    #[error("producer {producer} is not the expected leader {expected}")]
    WrongLeader { producer: String, expected: String },

    #[error("producer {0} is not an active authority for this height")]
    NotAuthority(String),

    #[error("producer {0} is not eligible at this height")]
    NotEligible(String),

    #[error("no signing key configured for sealing")]
    MissingSigner,

    #[error("sealing was cancelled")]
    Cancelled,
}

/// Pluggable algorithm selecting and validating the next block.
///
/// Per production cycle: build an unsealed candidate, seal it (PoW searches
/// for a nonce, PoS/PoA sign — no search), and validate the seal on append.
/// `seal` may take unbounded wall-clock time under PoW and is therefore run
/// off the serialized mutation path by the node; `abort_seal` cancels it.
pub trait ConsensusStrategy: Send + Sync {
    /// The mode this strategy implements.
    fn mode(&self) -> ConsensusMode;

    /// Construct an unsealed candidate from pending transactions and the
    /// chain tip. The proof is a placeholder and the hash is zero until
    /// [`ConsensusStrategy::seal`] runs.
    fn build_candidate(
        &self,
        transactions: Vec<Transaction>,
        previous: &Block,
        producer: &Address,
        timestamp: Timestamp,
    ) -> Block {
        Block {
            index: previous.index + 1,
            timestamp,
            transactions,
            previous_hash: previous.hash,
            producer: producer.clone(),
            proof: BlockProof::Unsealed,
            hash: BlockHash::ZERO,
        }
    }

    /// Compute the candidate's hash and proof. For PoW this is the nonce
    /// search; for PoS/PoA a deterministic signature step.
    fn seal(&self, candidate: Block) -> Result<Block, SealError>;

    /// Check the proof on a block whose hash has already been recomputed
    /// and matched by the caller.
    fn validate_seal(
        &self,
        block: &Block,
        previous: &Block,
        registry: &ValidatorRegistry,
    ) -> Result<(), SealError>;

    /// Whether `producer` may seal the block at `height` on top of
    /// `previous`. PoW: always. PoS: stake floor plus elected leader.
    /// PoA: active status plus round-robin turn.
    fn is_eligible(
        &self,
        producer: &Address,
        height: u64,
        previous: &Block,
        registry: &ValidatorRegistry,
    ) -> bool;

    /// Cancel an in-flight [`ConsensusStrategy::seal`]. Default no-op;
    /// PoW overrides this to trip its search flag.
    fn abort_seal(&self) {}
}
