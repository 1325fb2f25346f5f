//! Consensus strategies for the Tessera ledger.
//!
//! Three implementations of the [`ConsensusStrategy`] trait from
//! `tessera-ledger`: proof-of-work (open participation, nonce search),
//! proof-of-stake (deterministic stake-weighted leader election), and
//! proof-of-authority (fixed list, round-robin). A chain runs exactly one,
//! selected by its `ChainParams`.

pub mod poa;
pub mod pos;
pub mod pow;

pub use poa::ProofOfAuthority;
pub use pos::ProofOfStake;
pub use pow::ProofOfWork;

use std::sync::Arc;
use tessera_ledger::ConsensusStrategy;
use tessera_types::{Amount, ChainParams, ConsensusMode, KeyPair};

/// Build the strategy for a chain's parameters.
///
/// `signer` is the local producer identity for PoS/PoA sealing; without it
/// the strategy can validate but not seal. PoW needs no key.
pub fn strategy_for(params: &ChainParams, signer: Option<KeyPair>) -> Arc<dyn ConsensusStrategy> {
    match params.consensus_mode {
        ConsensusMode::ProofOfWork => Arc::new(ProofOfWork::new(params.work_difficulty)),
        ConsensusMode::ProofOfStake => {
            let minimum_stake = Amount::new(params.minimum_stake);
            Arc::new(match signer {
                Some(keypair) => ProofOfStake::with_signer(minimum_stake, keypair),
                None => ProofOfStake::new(minimum_stake),
            })
        }
        ConsensusMode::ProofOfAuthority => {
            let authorities = params.authorities.clone();
            Arc::new(match signer {
                Some(keypair) => ProofOfAuthority::with_signer(authorities, keypair),
                None => ProofOfAuthority::new(authorities),
            })
        }
    }
}
