//! Proof-of-work: open participation, sealing by nonce search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tessera_ledger::{Block, BlockProof, ConsensusStrategy, SealError};
use tessera_registry::ValidatorRegistry;
use tessera_types::{Address, ConsensusMode};
use tessera_work::{validate_work, work_value, WorkGenerator};

/// Seals blocks by searching for a nonce whose work value meets the chain
/// difficulty. Anyone may produce; there is no registry gate.
///
/// The search can take unbounded wall-clock time, so the node runs `seal`
/// off the serialized mutation path and calls `abort_seal` when a competing
/// block lands first.
pub struct ProofOfWork {
    difficulty: u64,
    cancel: Arc<AtomicBool>,
}

impl ProofOfWork {
    pub fn new(difficulty: u64) -> Self {
        Self {
            difficulty,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn difficulty(&self) -> u64 {
        self.difficulty
    }
}

impl ConsensusStrategy for ProofOfWork {
    fn mode(&self) -> ConsensusMode {
        ConsensusMode::ProofOfWork
    }

    fn seal(&self, mut candidate: Block) -> Result<Block, SealError> {
        self.cancel.store(false, Ordering::Relaxed);
        candidate.hash = candidate.compute_hash();
        let nonce = WorkGenerator
            .generate(&candidate.hash, self.difficulty, &self.cancel)
            .map_err(|_| SealError::Cancelled)?;
        candidate.proof = BlockProof::Work(nonce.0);
        Ok(candidate)
    }

    fn validate_seal(
        &self,
        block: &Block,
        _previous: &Block,
        _registry: &ValidatorRegistry,
    ) -> Result<(), SealError> {
        match block.proof {
            BlockProof::Work(nonce) => {
                if validate_work(&block.hash, nonce, self.difficulty) {
                    Ok(())
                } else {
                    Err(SealError::BelowDifficulty {
                        value: work_value(&block.hash, nonce),
                        threshold: self.difficulty,
                    })
                }
            }
            BlockProof::Unsealed => Err(SealError::Unsealed),
            _ => Err(SealError::WrongProofKind),
        }
    }

    fn is_eligible(
        &self,
        _producer: &Address,
        _height: u64,
        _previous: &Block,
        _registry: &ValidatorRegistry,
    ) -> bool {
        true
    }

    fn abort_seal(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_transactions::Transaction;
    use tessera_types::{Amount, BlockHash, Signature, Timestamp};

    fn previous_block() -> Block {
        let mut block = Block {
            index: 0,
            timestamp: Timestamp::new(0),
            transactions: Vec::new(),
            previous_hash: BlockHash::ZERO,
            producer: Address::new("tess_genesis_dev"),
            proof: BlockProof::Genesis,
            hash: BlockHash::ZERO,
        };
        block.hash = block.compute_hash();
        block
    }

    fn candidate(previous: &Block, strategy: &ProofOfWork) -> Block {
        strategy.build_candidate(
            vec![Transaction::mint(
                Address::new("tess_miner"),
                Amount::new(100),
                Timestamp::new(1),
            )],
            previous,
            &Address::new("tess_miner"),
            Timestamp::new(1),
        )
    }

    #[test]
    fn seal_then_validate_roundtrip() {
        let strategy = ProofOfWork::new(1000);
        let previous = previous_block();
        let sealed = strategy.seal(candidate(&previous, &strategy)).unwrap();

        assert_eq!(sealed.hash, sealed.compute_hash());
        assert!(matches!(sealed.proof, BlockProof::Work(_)));
        let registry = ValidatorRegistry::new();
        strategy.validate_seal(&sealed, &previous, &registry).unwrap();
    }

    #[test]
    fn zero_difficulty_seals_immediately() {
        let strategy = ProofOfWork::new(0);
        let previous = previous_block();
        let sealed = strategy.seal(candidate(&previous, &strategy)).unwrap();
        assert_eq!(sealed.proof, BlockProof::Work(0));
    }

    #[test]
    fn bad_nonce_fails_validation() {
        let strategy = ProofOfWork::new(u64::MAX);
        let previous = previous_block();
        let mut block = candidate(&previous, &strategy);
        block.hash = block.compute_hash();
        block.proof = BlockProof::Work(3);

        let err = strategy
            .validate_seal(&block, &previous, &ValidatorRegistry::new())
            .unwrap_err();
        assert!(matches!(err, SealError::BelowDifficulty { .. }));
    }

    #[test]
    fn signature_proof_is_wrong_kind() {
        let strategy = ProofOfWork::new(0);
        let previous = previous_block();
        let mut block = candidate(&previous, &strategy);
        block.hash = block.compute_hash();
        block.proof = BlockProof::Signature(Signature::ZERO);

        let err = strategy
            .validate_seal(&block, &previous, &ValidatorRegistry::new())
            .unwrap_err();
        assert_eq!(err, SealError::WrongProofKind);
    }

    #[test]
    fn aborted_seal_is_cancelled() {
        // Impossible difficulty: the search can only end via the flag.
        let strategy = ProofOfWork::new(u64::MAX);
        let previous = previous_block();
        let block = candidate(&previous, &strategy);

        strategy.abort_seal();
        // abort_seal is sticky only until the next seal resets it, so flip
        // it again from another thread after the search starts.
        let strategy = std::sync::Arc::new(strategy);
        let bg = {
            let strategy = std::sync::Arc::clone(&strategy);
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(50));
                strategy.abort_seal();
            })
        };
        let result = strategy.seal(block);
        bg.join().unwrap();
        assert!(matches!(result, Err(SealError::Cancelled)));
    }

    #[test]
    fn everyone_is_eligible() {
        let strategy = ProofOfWork::new(0);
        let previous = previous_block();
        assert!(strategy.is_eligible(
            &Address::new("tess_anyone"),
            1,
            &previous,
            &ValidatorRegistry::new()
        ));
    }
}
