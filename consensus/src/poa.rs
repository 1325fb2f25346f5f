//! Proof-of-authority: fixed authority list, round-robin by height.
//!
//! The authority whose turn it is for height `h` is `authorities[h % len]`.
//! The list is fixed in the chain params, so the turn check is stable across
//! restarts and chain replays; the registry contributes only the active
//! status gate.

use tessera_crypto::{decode_address, sign_message, verify_signature};
use tessera_ledger::{Block, BlockProof, ConsensusStrategy, SealError};
use tessera_registry::ValidatorRegistry;
use tessera_types::{Address, ConsensusMode, KeyPair, PublicKey};

/// Round-robin sealing over a fixed authority list.
pub struct ProofOfAuthority {
    authorities: Vec<Address>,
    /// Local authority identity. `None` makes this a validate-only strategy.
    signer: Option<KeyPair>,
}

impl ProofOfAuthority {
    pub fn new(authorities: Vec<Address>) -> Self {
        Self {
            authorities,
            signer: None,
        }
    }

    pub fn with_signer(authorities: Vec<Address>, signer: KeyPair) -> Self {
        Self {
            authorities,
            signer: Some(signer),
        }
    }

    /// The authority whose turn it is at `height`.
    pub fn expected_authority(&self, height: u64) -> Option<&Address> {
        if self.authorities.is_empty() {
            return None;
        }
        self.authorities
            .get((height % self.authorities.len() as u64) as usize)
    }
}

impl ConsensusStrategy for ProofOfAuthority {
    fn mode(&self) -> ConsensusMode {
        ConsensusMode::ProofOfAuthority
    }

    /// Deterministic signature step — no search.
    fn seal(&self, mut candidate: Block) -> Result<Block, SealError> {
        let signer = self.signer.as_ref().ok_or(SealError::MissingSigner)?;
        candidate.hash = candidate.compute_hash();
        candidate.proof = BlockProof::Signature(sign_message(
            candidate.hash.as_bytes(),
            &signer.private,
        ));
        Ok(candidate)
    }

    fn validate_seal(
        &self,
        block: &Block,
        _previous: &Block,
        registry: &ValidatorRegistry,
    ) -> Result<(), SealError> {
        let signature = match &block.proof {
            BlockProof::Signature(sig) => sig,
            BlockProof::Unsealed => return Err(SealError::Unsealed),
            _ => return Err(SealError::WrongProofKind),
        };
        if self.expected_authority(block.index) != Some(&block.producer) {
            return Err(SealError::NotAuthority(block.producer.to_string()));
        }
        if !registry.is_active(&block.producer) {
            return Err(SealError::NotEligible(block.producer.to_string()));
        }
        let pubkey = decode_address(block.producer.as_str())
            .ok_or(SealError::UndecodableProducer)?;
        if !verify_signature(block.hash.as_bytes(), signature, &PublicKey(pubkey)) {
            return Err(SealError::BadSignature);
        }
        Ok(())
    }

    fn is_eligible(
        &self,
        producer: &Address,
        height: u64,
        _previous: &Block,
        registry: &ValidatorRegistry,
    ) -> bool {
        registry.is_active(producer) && self.expected_authority(height) == Some(producer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_crypto::{derive_address, keypair_from_seed};
    use tessera_registry::ValidatorStatus;
    use tessera_types::{Amount, BlockHash, Timestamp};

    fn authority(seed: u8) -> (KeyPair, Address) {
        let kp = keypair_from_seed(&[seed; 32]);
        let address = derive_address(&kp.public);
        (kp, address)
    }

    fn tip() -> Block {
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

    #[test]
    fn round_robin_turns() {
        let (_, a) = authority(1);
        let (_, b) = authority(2);
        let (_, c) = authority(3);
        let strategy = ProofOfAuthority::new(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(strategy.expected_authority(0), Some(&a));
        assert_eq!(strategy.expected_authority(1), Some(&b));
        assert_eq!(strategy.expected_authority(2), Some(&c));
        assert_eq!(strategy.expected_authority(3), Some(&a));
        assert_eq!(strategy.expected_authority(7), Some(&b));
    }

    #[test]
    fn empty_list_has_no_turns() {
        let strategy = ProofOfAuthority::new(Vec::new());
        assert_eq!(strategy.expected_authority(0), None);
    }

    #[test]
    fn eligibility_requires_turn_and_active_status() {
        let (_, a) = authority(1);
        let (_, b) = authority(2);
        let strategy = ProofOfAuthority::new(vec![a.clone(), b.clone()]);

        let mut registry = ValidatorRegistry::new();
        registry.register(a.clone(), Amount::ZERO);
        registry.register(b.clone(), Amount::ZERO);

        let previous = tip();
        // Height 1 is b's turn.
        assert!(strategy.is_eligible(&b, 1, &previous, &registry));
        assert!(!strategy.is_eligible(&a, 1, &previous, &registry));

        // Slashing b removes its turn.
        registry.set_status(&b, ValidatorStatus::Slashed).unwrap();
        assert!(!strategy.is_eligible(&b, 1, &previous, &registry));
    }

    #[test]
    fn seal_and_validate_roundtrip() {
        let (kp, a) = authority(1);
        let strategy = ProofOfAuthority::with_signer(vec![a.clone()], kp);

        let mut registry = ValidatorRegistry::new();
        registry.register(a.clone(), Amount::ZERO);

        let previous = tip();
        let candidate = strategy.build_candidate(Vec::new(), &previous, &a, Timestamp::new(5));
        let sealed = strategy.seal(candidate).unwrap();

        strategy.validate_seal(&sealed, &previous, &registry).unwrap();
    }

    #[test]
    fn out_of_turn_block_rejected() {
        let (kp_b, b) = authority(2);
        let (_, a) = authority(1);
        let strategy = ProofOfAuthority::with_signer(vec![a, b.clone()], kp_b);

        let mut registry = ValidatorRegistry::new();
        registry.register(b.clone(), Amount::ZERO);

        // Height 2 is a's turn; b seals anyway.
        let mut previous = tip();
        previous.index = 1;
        let candidate = strategy.build_candidate(Vec::new(), &previous, &b, Timestamp::new(5));
        let sealed = strategy.seal(candidate).unwrap();

        let err = strategy.validate_seal(&sealed, &previous, &registry).unwrap_err();
        assert!(matches!(err, SealError::NotAuthority(_)));
    }

    #[test]
    fn inactive_authority_rejected() {
        let (kp, a) = authority(1);
        let strategy = ProofOfAuthority::with_signer(vec![a.clone()], kp);

        let mut registry = ValidatorRegistry::new();
        registry.register(a.clone(), Amount::ZERO);
        registry.set_status(&a, ValidatorStatus::Inactive).unwrap();

        let previous = tip();
        let candidate = strategy.build_candidate(Vec::new(), &previous, &a, Timestamp::new(5));
        let sealed = strategy.seal(candidate).unwrap();

        let err = strategy.validate_seal(&sealed, &previous, &registry).unwrap_err();
        assert!(matches!(err, SealError::NotEligible(_)));
    }

    #[test]
    fn seal_without_signer_fails() {
        let (_, a) = authority(1);
        let strategy = ProofOfAuthority::new(vec![a.clone()]);
        let previous = tip();
        let candidate = strategy.build_candidate(Vec::new(), &previous, &a, Timestamp::new(5));
        assert_eq!(strategy.seal(candidate).unwrap_err(), SealError::MissingSigner);
    }
}
