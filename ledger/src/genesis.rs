//! Genesis block creation — the first block on each network.
//!
//! The genesis block has `previous_hash: BlockHash::ZERO`, no proof, and
//! mints the initial allocations. Each network (live, test, dev) has its own
//! canonical producer address and parameter set so genesis hashes are unique
//! and deterministic per network.

use crate::block::{Block, BlockProof};
use tessera_transactions::Transaction;
use tessera_types::{Address, Amount, BlockHash, ChainParams, ConsensusMode, NetworkId, Timestamp};

/// Configuration for creating a genesis block.
pub struct GenesisConfig {
    /// Which network this genesis is for.
    pub network: NetworkId,
    /// Initial supply, minted in genesis in the given order.
    pub allocations: Vec<(Address, Amount)>,
}

impl GenesisConfig {
    /// A genesis with no initial allocations.
    pub fn empty(network: NetworkId) -> Self {
        Self {
            network,
            allocations: Vec::new(),
        }
    }
}

/// Create the genesis block for a given configuration.
///
/// Genesis is the one block with no predecessor and no consensus proof; every
/// transaction in it is a mint. Its hash is fully determined by the network
/// and the allocations.
pub fn create_genesis_block(config: &GenesisConfig) -> Block {
    let timestamp = genesis_timestamp(&config.network);
    let transactions = config
        .allocations
        .iter()
        .map(|(to, amount)| Transaction::mint(to.clone(), *amount, timestamp))
        .collect();

    let mut block = Block {
        index: 0,
        timestamp,
        transactions,
        previous_hash: BlockHash::ZERO,
        producer: genesis_producer(&config.network),
        proof: BlockProof::Genesis,
        hash: BlockHash::ZERO,
    };
    block.hash = block.compute_hash();
    block
}

/// The deterministic hash of a network's allocation-free genesis block.
/// Useful for hardcoding known genesis hashes for sync handshakes.
pub fn genesis_hash(network: NetworkId) -> BlockHash {
    create_genesis_block(&GenesisConfig::empty(network)).hash
}

/// Return the initial chain params for a network.
pub fn initial_params(network: &NetworkId) -> ChainParams {
    match network {
        NetworkId::Live => ChainParams::mainnet_defaults(),
        NetworkId::Test => {
            let mut params = ChainParams::mainnet_defaults();
            // Test network lowers the entry bar for faster iteration.
            params.minimum_stake = 0;
            params.work_difficulty = 0xff00_0000_0000_0000;
            params
        }
        NetworkId::Dev => {
            let mut params = ChainParams::mainnet_defaults();
            // Dev network disables the PoW search and all stake floors.
            params.consensus_mode = ConsensusMode::ProofOfWork;
            params.minimum_stake = 0;
            params.work_difficulty = 0;
            params.allow_empty_blocks = true;
            params
        }
    }
}

/// Canonical genesis producer address per network.
///
/// These are sentinel addresses with no corresponding key: genesis carries
/// no seal, so its producer never needs to sign anything.
fn genesis_producer(network: &NetworkId) -> Address {
    match network {
        NetworkId::Live => Address::new("tess_genesis_live"),
        NetworkId::Test => Address::new("tess_genesis_test"),
        NetworkId::Dev => Address::new("tess_genesis_dev"),
    }
}

/// Genesis timestamp per network.
fn genesis_timestamp(network: &NetworkId) -> Timestamp {
    match network {
        // Live: 2026-03-01 00:00:00 UTC
        NetworkId::Live => Timestamp::new(1_772_323_200),
        // Test: 2025-09-01 00:00:00 UTC
        NetworkId::Test => Timestamp::new(1_756_684_800),
        // Dev: epoch 0
        NetworkId::Dev => Timestamp::new(0),
    }
}
