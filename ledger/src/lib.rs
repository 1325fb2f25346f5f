//! The Tessera ledger core.
//!
//! The [`Ledger`] is the single source of truth for chain state and the only
//! component allowed to mutate the chain or the pending pool. Consensus is
//! pluggable through the [`ConsensusStrategy`] trait defined here and
//! implemented per mode in `tessera-consensus`.

pub mod block;
pub mod chain;
pub mod error;
pub mod genesis;
pub mod pool;
pub mod snapshot;
pub mod strategy;

pub use block::{Block, BlockProof};
pub use chain::Ledger;
pub use error::{ProductionError, SubmitError, ValidationError};
pub use genesis::{create_genesis_block, genesis_hash, initial_params, GenesisConfig};
pub use pool::TransactionPool;
pub use snapshot::LedgerSnapshot;
pub use strategy::{ConsensusStrategy, SealError};
