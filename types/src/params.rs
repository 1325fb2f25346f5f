//! Chain parameters — the per-chain configuration fixed at genesis.
//!
//! The consensus mode is fixed for the lifetime of a chain; blocks carry no
//! per-block mode tag. Networks differ only in their parameter values.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// The consensus algorithm governing block production for a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusMode {
    /// Open participation; blocks sealed by nonce search.
    ProofOfWork,
    /// Stake-weighted deterministic leader election; blocks sealed by signature.
    ProofOfStake,
    /// Fixed authority list, round-robin; blocks sealed by signature.
    ProofOfAuthority,
}

impl ConsensusMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProofOfWork => "pow",
            Self::ProofOfStake => "pos",
            Self::ProofOfAuthority => "poa",
        }
    }
}

/// All chain parameters stored by every node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// The consensus algorithm for this chain.
    pub consensus_mode: ConsensusMode,

    /// Reward minted to the producer of each block, in raw units.
    pub mining_reward: u128,

    /// Minimum stake for PoS eligibility, in raw units.
    pub minimum_stake: u128,

    /// PoW difficulty threshold. The work value — the first 8 little-endian
    /// bytes of blake2b(block_hash ‖ nonce) — must be `>=` this threshold.
    /// Higher threshold = harder. Zero disables the search (dev networks).
    pub work_difficulty: u64,

    /// Whether a producer may seal a block containing only the reward
    /// transaction. PoW chains typically allow this; PoS/PoA typically don't.
    pub allow_empty_blocks: bool,

    /// The fixed authority list for PoA chains. Ignored by other modes.
    pub authorities: Vec<Address>,

    /// Maximum number of pooled transactions included per block, not counting
    /// the reward transaction.
    pub max_block_transactions: usize,
}

impl ChainParams {
    /// Mainnet defaults — the intended configuration for the live network.
    pub fn mainnet_defaults() -> Self {
        Self {
            consensus_mode: ConsensusMode::ProofOfStake,
            mining_reward: 100,
            minimum_stake: 1_000,
            work_difficulty: 0xffff_c000_0000_0000,
            allow_empty_blocks: false,
            authorities: Vec::new(),
            max_block_transactions: 512,
        }
    }
}

/// Default is the mainnet configuration.
impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet_defaults()
    }
}
