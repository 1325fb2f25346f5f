//! The block record — one immutable ledger step.

use serde::{Deserialize, Serialize};
use tessera_crypto::blake2b_256_multi;
use tessera_transactions::Transaction;
use tessera_types::{Address, BlockHash, Signature, Timestamp, TxHash};

/// The seal attached to a block by the chain's consensus mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockProof {
    /// The genesis block carries no proof (index 0 only).
    Genesis,
    /// A candidate that has not been sealed yet. Never valid on-chain.
    Unsealed,
    /// PoW nonce whose work value meets the chain difficulty.
    Work(u64),
    /// PoS/PoA producer signature over the block hash.
    Signature(Signature),
}

/// An immutable record of one ledger step.
///
/// The hash is Blake2b-256 over the canonical encoding of every field
/// except `proof` and `hash` itself, so it is recomputable from the block
/// contents alone; the proof is checked against the hash by the active
/// consensus strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Sequential position, 0 for genesis.
    pub index: u64,
    /// Production time, informational only.
    pub timestamp: Timestamp,
    /// Execution order is stored order. Never reordered after append.
    pub transactions: Vec<Transaction>,
    /// Hash of the predecessor; `BlockHash::ZERO` for genesis.
    pub previous_hash: BlockHash,
    /// The validator or miner that produced this block.
    pub producer: Address,
    /// Mode-specific seal.
    pub proof: BlockProof,
    /// Self-hash over the canonical fields.
    pub hash: BlockHash,
}

impl Block {
    /// Compute the canonical block hash.
    pub fn compute_hash(&self) -> BlockHash {
        let index = self.index.to_le_bytes();
        let timestamp = self.timestamp.as_secs().to_le_bytes();
        let tx_count = (self.transactions.len() as u64).to_le_bytes();
        let tx_hashes: Vec<TxHash> = self.transactions.iter().map(Transaction::hash).collect();

        let mut parts: Vec<&[u8]> = Vec::with_capacity(5 + tx_hashes.len());
        parts.push(&index);
        parts.push(&timestamp);
        parts.push(self.previous_hash.as_bytes());
        parts.push(self.producer.as_str().as_bytes());
        parts.push(&tx_count);
        for h in &tx_hashes {
            parts.push(h.as_bytes());
        }
        BlockHash::new(blake2b_256_multi(&parts))
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}
