//! Sync coordination — deciding whether remote blocks and chains enter the
//! local ledger.
//!
//! Fork choice: the longest valid chain wins, with full revalidation from
//! genesis before any swap; equal-length chains keep the local one
//! (first-seen wins, deterministic). A single block that extends the tip is
//! appended directly; one that claims a greater height without linking is
//! queued as longer-chain evidence for the caller to follow up with a full
//! chain.

use crate::error::NodeError;
use crate::service::LedgerService;
use tessera_ledger::{Block, ValidationError};
use thiserror::Error;

/// Outcome of ingesting a single remote block.
#[derive(Debug)]
pub enum BlockIngest {
    /// The block extended the local tip.
    Accepted,
    /// The block does not link to our tip but claims a greater height —
    /// fetch the full chain and call [`SyncCoordinator::receive_chain`].
    Queued,
    /// The block is invalid or stale.
    Rejected(NodeError),
}

/// Outcome of ingesting a full remote chain.
#[derive(Debug)]
pub enum ChainIngest {
    /// The remote chain replaced the local one.
    Adopted { height: u64 },
    /// The remote chain lost fork choice.
    Ignored(ForkChoiceRejected),
}

/// Why a remote chain was not adopted.
#[derive(Debug, Error)]
pub enum ForkChoiceRejected {
    #[error("remote chain (height {remote}) is not longer than local (height {local})")]
    NotLonger { local: u64, remote: u64 },

    #[error("remote chain failed validation: {0}")]
    Invalid(ValidationError),

    #[error("ledger service has stopped")]
    ServiceStopped,
}

/// External-facing ingestion of remote blocks and chains.
///
/// All validation happens on the ledger's serialized mutation path; the
/// coordinator only routes and interprets outcomes.
pub struct SyncCoordinator {
    service: LedgerService,
}

impl SyncCoordinator {
    pub fn new(service: LedgerService) -> Self {
        Self { service }
    }

    /// Ingest one remote block.
    pub async fn receive_block(&self, block: Block) -> BlockIngest {
        let tip = self.service.chain_tip().await;
        if block.previous_hash == tip.hash && block.index == tip.index + 1 {
            return match self.service.append_block(block).await {
                Ok(()) => BlockIngest::Accepted,
                Err(err) => BlockIngest::Rejected(err),
            };
        }
        if block.index > tip.index {
            tracing::debug!(
                index = block.index,
                local = tip.index,
                "unlinked block claims greater height; queueing for chain comparison"
            );
            return BlockIngest::Queued;
        }
        BlockIngest::Rejected(NodeError::Validation(
            ValidationError::NonSequentialIndex {
                expected: tip.index + 1,
                found: block.index,
            },
        ))
    }

    /// Ingest a full remote chain. Never partially adopts: the whole chain
    /// revalidates from genesis on the serialized path or nothing changes.
    pub async fn receive_chain(&self, remote: Vec<Block>) -> ChainIngest {
        match self.service.adopt_chain(remote).await {
            Ok(height) => ChainIngest::Adopted { height },
            Err(err) => {
                tracing::debug!(reason = %err, "remote chain ignored");
                ChainIngest::Ignored(err)
            }
        }
    }
}
