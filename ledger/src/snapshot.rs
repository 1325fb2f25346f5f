//! Ledger snapshots — restart-safe serialization of chain and registry.
//!
//! A snapshot is never the source of truth while a node runs; it is written
//! by a pluggable sink after each successful append and loaded once at
//! startup. The integrity hash is computed deterministically over the
//! contents so a restored ledger can detect tampering or truncation before
//! replaying the chain.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use tessera_crypto::blake2b_256_multi;
use tessera_registry::ValidatorEntry;
use tessera_types::ChainParams;

/// Current snapshot schema version.
const SNAPSHOT_VERSION: u32 = 1;

/// A point-in-time capture of chain, params, and registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Schema version for compatibility.
    pub version: u32,
    /// The chain parameters the ledger ran with.
    pub params: ChainParams,
    /// The full ordered block sequence, genesis first.
    pub blocks: Vec<Block>,
    /// Registry entries in address order.
    pub validators: Vec<ValidatorEntry>,
    /// Blake2b-256 over the serialized contents.
    pub hash: [u8; 32],
}

impl LedgerSnapshot {
    /// Create a snapshot and stamp its integrity hash.
    pub fn create(params: ChainParams, blocks: Vec<Block>, validators: Vec<ValidatorEntry>) -> Self {
        let mut snapshot = Self {
            version: SNAPSHOT_VERSION,
            params,
            blocks,
            validators,
            hash: [0u8; 32],
        };
        snapshot.hash = snapshot.compute_hash();
        snapshot
    }

    /// Compute the integrity hash over params, blocks, and validators.
    fn compute_hash(&self) -> [u8; 32] {
        let version = self.version.to_le_bytes();
        let params = bincode::serialize(&self.params).expect("params serialization cannot fail");
        let blocks = bincode::serialize(&self.blocks).expect("block serialization cannot fail");
        let validators =
            bincode::serialize(&self.validators).expect("registry serialization cannot fail");
        blake2b_256_multi(&[&version[..], &params[..], &blocks[..], &validators[..]])
    }

    /// Verify the integrity hash matches the contents.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("snapshot serialization cannot fail")
    }

    /// Deserialize a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        bincode::deserialize(bytes).map_err(|e| e.to_string())
    }

    /// Height of the snapshot's chain tip.
    pub fn height(&self) -> u64 {
        self.blocks.last().map(|b| b.index).unwrap_or(0)
    }
}
