//! The `Ledger` — single source of truth for chain state.
//!
//! Owns the block sequence, the pending pool, the validator registry, and a
//! running balance cache. Every mutation is atomic: a rejected transaction or
//! block leaves the ledger exactly as it was. Callers that need concurrency
//! serialize mutations externally (see `tessera-node`).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::block::{Block, BlockProof};
use crate::error::{ProductionError, SubmitError, ValidationError};
use crate::pool::TransactionPool;
use crate::snapshot::LedgerSnapshot;
use crate::strategy::{ConsensusStrategy, SealError};
use tessera_registry::{RegistryError, ValidatorRegistry, ValidatorStatus};
use tessera_transactions::{check_amount, Transaction, TransactionVerifier};
use tessera_types::{Address, Amount, ChainParams, Timestamp, TxHash};

/// Apply one transaction to a balance map. Mint transactions only credit;
/// transfers debit the sender first. Returns the sender and its balance when
/// funds are insufficient; the map is unchanged in that case.
fn apply_transaction(
    balances: &mut HashMap<Address, Amount>,
    tx: &Transaction,
) -> Result<(), (Address, Amount)> {
    if let Some(from) = &tx.from {
        let balance = balances.get(from).copied().unwrap_or(Amount::ZERO);
        let remaining = balance
            .checked_sub(tx.amount)
            .ok_or_else(|| (from.clone(), balance))?;
        balances.insert(from.clone(), remaining);
    }
    let credited = balances.entry(tx.to.clone()).or_insert(Amount::ZERO);
    *credited = credited.saturating_add(tx.amount);
    Ok(())
}

/// Structural validation of a genesis block.
fn validate_genesis(block: &Block) -> Result<(), ValidationError> {
    if block.index != 0 {
        return Err(ValidationError::BadGenesis("index is not zero".into()));
    }
    if !block.previous_hash.is_zero() {
        return Err(ValidationError::BadGenesis(
            "previous hash is not the zero sentinel".into(),
        ));
    }
    if block.proof != BlockProof::Genesis {
        return Err(ValidationError::BadGenesis("proof is not the genesis proof".into()));
    }
    if block.hash != block.compute_hash() {
        return Err(ValidationError::HashMismatch { index: 0 });
    }
    if block.transactions.iter().any(|tx| !tx.is_mint()) {
        return Err(ValidationError::BadGenesis(
            "genesis may only contain mint transactions".into(),
        ));
    }
    Ok(())
}

/// Replay a full chain from genesis, validating every block, and return the
/// resulting balances and the set of chained transaction hashes.
///
/// Seal validation covers proof kind, work/signature correctness, and
/// registry membership; the live leader-turn check additionally applied at
/// the tip by [`Ledger::append_block`] is waived for historical blocks (the
/// registry records only its current state).
fn replay_chain(
    blocks: &[Block],
    strategy: &dyn ConsensusStrategy,
    verifier: &dyn TransactionVerifier,
    registry: &ValidatorRegistry,
) -> Result<(HashMap<Address, Amount>, HashSet<TxHash>), ValidationError> {
    let genesis = blocks.first().ok_or(ValidationError::EmptyChain)?;
    validate_genesis(genesis)?;

    let mut balances = HashMap::new();
    let mut chained = HashSet::new();

    for (position, block) in blocks.iter().enumerate() {
        if position > 0 {
            let previous = &blocks[position - 1];
            if block.index != previous.index + 1 {
                return Err(ValidationError::NonSequentialIndex {
                    expected: previous.index + 1,
                    found: block.index,
                });
            }
            if block.previous_hash != previous.hash {
                return Err(ValidationError::BrokenLinkage { index: block.index });
            }
            if block.hash != block.compute_hash() {
                return Err(ValidationError::HashMismatch { index: block.index });
            }
            strategy
                .validate_seal(block, previous, registry)
                .map_err(|source| ValidationError::Seal {
                    index: block.index,
                    source,
                })?;
        }

        let mut seen = HashSet::new();
        for tx in &block.transactions {
            let hash = tx.hash();
            if chained.contains(&hash) || !seen.insert(hash) {
                return Err(ValidationError::DuplicateTransaction { index: block.index });
            }
            if !tx.is_mint() && tx.amount.is_zero() {
                return Err(ValidationError::InvalidAmount { index: block.index });
            }
            if !verifier.verify(tx) {
                return Err(ValidationError::BadSignature { index: block.index });
            }
            apply_transaction(&mut balances, tx).map_err(|(address, balance)| {
                ValidationError::InsufficientBalance {
                    index: block.index,
                    address: address.to_string(),
                    balance: balance.raw(),
                    amount: tx.amount.raw(),
                }
            })?;
        }
        chained.extend(seen);
    }

    Ok((balances, chained))
}

/// The authoritative ordered block sequence plus derived account state.
pub struct Ledger {
    params: ChainParams,
    strategy: Arc<dyn ConsensusStrategy>,
    verifier: Arc<dyn TransactionVerifier>,
    blocks: Vec<Block>,
    pool: TransactionPool,
    registry: ValidatorRegistry,
    /// Running balance cache; rebuilt from a full replay on chain adoption.
    balances: HashMap<Address, Amount>,
    /// Hashes of every transaction included in the chain.
    chained: HashSet<TxHash>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("params", &self.params)
            .field("blocks", &self.blocks.len())
            .field("balances", &self.balances.len())
            .field("chained", &self.chained.len())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create a ledger from its genesis block.
    pub fn new(
        genesis: Block,
        params: ChainParams,
        strategy: Arc<dyn ConsensusStrategy>,
        verifier: Arc<dyn TransactionVerifier>,
    ) -> Result<Self, ValidationError> {
        let registry = ValidatorRegistry::new();
        let blocks = vec![genesis];
        let (balances, chained) =
            replay_chain(&blocks, strategy.as_ref(), verifier.as_ref(), &registry)?;
        Ok(Self {
            params,
            strategy,
            verifier,
            blocks,
            pool: TransactionPool::new(),
            registry,
            balances,
            chained,
        })
    }

    /// Rebuild a ledger from a snapshot, revalidating the whole chain.
    /// The restored ledger answers `derive_balance` identically to the
    /// ledger the snapshot was taken from.
    pub fn restore(
        snapshot: LedgerSnapshot,
        strategy: Arc<dyn ConsensusStrategy>,
        verifier: Arc<dyn TransactionVerifier>,
    ) -> Result<Self, ValidationError> {
        if !snapshot.verify() {
            return Err(ValidationError::CorruptSnapshot);
        }
        let registry = ValidatorRegistry::from_entries(snapshot.validators);
        let (balances, chained) = replay_chain(
            &snapshot.blocks,
            strategy.as_ref(),
            verifier.as_ref(),
            &registry,
        )?;
        Ok(Self {
            params: snapshot.params,
            strategy,
            verifier,
            blocks: snapshot.blocks,
            pool: TransactionPool::new(),
            registry,
            balances,
            chained,
        })
    }

    /// Capture the current chain and registry as a snapshot.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::create(
            self.params.clone(),
            self.blocks.clone(),
            self.registry.iter().cloned().collect(),
        )
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// A shared handle to the chain's strategy, for callers that seal off
    /// the serialized mutation path.
    pub fn strategy(&self) -> Arc<dyn ConsensusStrategy> {
        Arc::clone(&self.strategy)
    }

    /// The latest block. The chain always holds at least genesis.
    pub fn chain_tip(&self) -> &Block {
        self.blocks.last().expect("chain always holds genesis")
    }

    /// Index of the latest block.
    pub fn height(&self) -> u64 {
        self.chain_tip().index
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending_count(&self) -> usize {
        self.pool.len()
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Balance of an address, served from the running cache. The cache is
    /// kept equal to a full-chain replay (see `balances_match_replay` tests).
    pub fn derive_balance(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(Amount::ZERO)
    }

    /// Sum of all balances. Grows only through mints (genesis allocations,
    /// block rewards, submitted mint transactions).
    pub fn total_supply(&self) -> Amount {
        self.balances
            .values()
            .fold(Amount::ZERO, |acc, b| acc.saturating_add(*b))
    }

    // ── Registry passthroughs (share the ledger's serialization point) ──

    pub fn register_validator(&mut self, address: Address, initial_stake: Amount) {
        self.registry.register(address, initial_stake);
    }

    pub fn adjust_stake(&mut self, address: &Address, delta: i128) -> Result<Amount, RegistryError> {
        self.registry.adjust_stake(address, delta)
    }

    pub fn set_validator_status(
        &mut self,
        address: &Address,
        status: ValidatorStatus,
    ) -> Result<(), RegistryError> {
        self.registry.set_status(address, status)
    }

    /// Active validators meeting the chain's stake floor, in address order.
    pub fn active_validators(&self) -> Vec<Address> {
        self.registry
            .active_eligible(Amount::new(self.params.minimum_stake))
            .into_iter()
            .map(|e| e.address.clone())
            .collect()
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Accept a transaction into the pending pool.
    ///
    /// Balance sufficiency is checked optimistically here and re-checked at
    /// block-build and append time, since later submissions can invalidate
    /// it. The pool is unchanged on every rejection.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<TxHash, SubmitError> {
        check_amount(&tx).map_err(|_| SubmitError::InvalidAmount)?;
        if !self.verifier.verify(&tx) {
            return Err(SubmitError::BadSignature);
        }
        let hash = tx.hash();
        if self.chained.contains(&hash) || self.pool.contains(&hash) {
            return Err(SubmitError::DuplicateTransaction);
        }
        if let Some(from) = &tx.from {
            let balance = self.derive_balance(from);
            if balance < tx.amount {
                return Err(SubmitError::InsufficientBalance {
                    address: from.to_string(),
                    balance: balance.raw(),
                    amount: tx.amount.raw(),
                });
            }
        }
        self.pool.insert(tx);
        Ok(hash)
    }

    /// Build an unsealed candidate for `producer` from the current pool and
    /// tip. Pooled transactions that would overdraw when replayed in order
    /// are left out (they stay pooled); the reward transaction is appended
    /// last, before sealing fixes the hash.
    pub fn build_candidate(
        &self,
        producer: &Address,
        timestamp: Timestamp,
    ) -> Result<Block, ProductionError> {
        let previous = self.chain_tip();
        // Timestamps strictly increase along the chain, so every per-block
        // reward mint hashes uniquely even for one producer within a second.
        let timestamp = Timestamp::new(timestamp.as_secs().max(previous.timestamp.as_secs() + 1));
        if !self
            .strategy
            .is_eligible(producer, previous.index + 1, previous, &self.registry)
        {
            return Err(ProductionError::NotEligible(producer.to_string()));
        }

        let mut scratch = self.balances.clone();
        let mut included = Vec::new();
        for tx in self.pool.snapshot(self.params.max_block_transactions) {
            if apply_transaction(&mut scratch, &tx).is_ok() {
                included.push(tx);
            }
        }
        if included.is_empty() && !self.params.allow_empty_blocks {
            return Err(ProductionError::EmptyPool);
        }
        included.push(Transaction::reward(
            producer.clone(),
            Amount::new(self.params.mining_reward),
            timestamp,
        ));
        Ok(self
            .strategy
            .build_candidate(included, previous, producer, timestamp))
    }

    /// Build, seal, and append a block in one step.
    ///
    /// This is the inline production path for modes whose sealing is fast
    /// (PoS/PoA). PoW production runs `build_candidate`, seals off the
    /// serialized path, then re-enters through `append_block`.
    pub fn produce_block(&mut self, producer: &Address) -> Result<Block, ProductionError> {
        let candidate = self.build_candidate(producer, Timestamp::now())?;
        let sealed = self.strategy.seal(candidate)?;
        match self.append_block(sealed.clone()) {
            Ok(()) => Ok(sealed),
            // A block we just built and sealed against our own tip must
            // validate; anything else is a bug, not bad input.
            Err(err) => Err(ProductionError::Invariant(Box::new(err))),
        }
    }

    /// Validate and append a block — locally produced or received from a
    /// peer. The chain, pool, balances, and registry are untouched on every
    /// rejection; on success the whole block applies at once.
    pub fn append_block(&mut self, block: Block) -> Result<(), ValidationError> {
        {
            let previous = self.chain_tip();
            if block.index != previous.index + 1 {
                return Err(ValidationError::NonSequentialIndex {
                    expected: previous.index + 1,
                    found: block.index,
                });
            }
            if block.previous_hash != previous.hash {
                return Err(ValidationError::BrokenLinkage { index: block.index });
            }
            if block.hash != block.compute_hash() {
                return Err(ValidationError::HashMismatch { index: block.index });
            }
            self.strategy
                .validate_seal(&block, previous, &self.registry)
                .map_err(|source| ValidationError::Seal {
                    index: block.index,
                    source,
                })?;
            if !self
                .strategy
                .is_eligible(&block.producer, block.index, previous, &self.registry)
            {
                return Err(ValidationError::Seal {
                    index: block.index,
                    source: SealError::NotEligible(block.producer.to_string()),
                });
            }
        }

        // Replay every transaction in stored order against the state as of
        // this block, on scratch state. Nothing commits until all pass.
        let mut scratch = self.balances.clone();
        let mut seen: HashSet<TxHash> = HashSet::new();
        for tx in &block.transactions {
            let hash = tx.hash();
            if self.chained.contains(&hash) || !seen.insert(hash) {
                return Err(ValidationError::DuplicateTransaction { index: block.index });
            }
            if !tx.is_mint() && tx.amount.is_zero() {
                return Err(ValidationError::InvalidAmount { index: block.index });
            }
            if !self.verifier.verify(tx) {
                return Err(ValidationError::BadSignature { index: block.index });
            }
            apply_transaction(&mut scratch, tx).map_err(|(address, balance)| {
                ValidationError::InsufficientBalance {
                    index: block.index,
                    address: address.to_string(),
                    balance: balance.raw(),
                    amount: tx.amount.raw(),
                }
            })?;
        }

        // Commit.
        self.balances = scratch;
        self.chained.extend(seen.iter().copied());
        self.pool.remove_all(&seen);
        self.registry.record_produced(&block.producer, block.index);
        tracing::debug!(
            index = block.index,
            producer = %block.producer,
            transactions = block.transactions.len(),
            "block appended"
        );
        self.blocks.push(block);
        Ok(())
    }

    /// Replace the whole chain with a remote one, atomically.
    ///
    /// The remote chain must share our genesis and revalidate in full; on
    /// success balances and the chained-transaction set are rebuilt from the
    /// replay, pooled transactions now on-chain are dropped, and transfers
    /// from orphaned local blocks are re-offered to the pool (orphaned
    /// rewards are not re-minted). Fork choice — whether to call this at all
    /// — belongs to the sync layer.
    pub fn replace_chain(&mut self, remote: Vec<Block>) -> Result<(), ValidationError> {
        let remote_genesis = remote.first().ok_or(ValidationError::EmptyChain)?;
        if *remote_genesis != self.blocks[0] {
            return Err(ValidationError::GenesisMismatch);
        }
        let (balances, chained) = replay_chain(
            &remote,
            self.strategy.as_ref(),
            self.verifier.as_ref(),
            &self.registry,
        )?;

        let old_height = self.height();
        let orphaned = std::mem::replace(&mut self.blocks, remote);
        self.balances = balances;
        self.chained = chained;
        self.pool.remove_all(&self.chained);

        let mut reoffered = 0usize;
        for block in &orphaned {
            for tx in &block.transactions {
                if tx.is_mint() || self.chained.contains(&tx.hash()) {
                    continue;
                }
                if self.submit_transaction(tx.clone()).is_ok() {
                    reoffered += 1;
                }
            }
        }
        tracing::info!(
            old_height,
            new_height = self.height(),
            reoffered,
            "adopted replacement chain"
        );
        Ok(())
    }
}
