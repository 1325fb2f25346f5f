//! Structural checks and the pluggable signature-verification hook.
//!
//! Signature semantics are external to the ledger core: the core only
//! requires that a verifier exists. The default [`Ed25519Verifier`] recovers
//! the sender's public key from its address; [`AcceptAll`] serves tests that
//! use synthetic addresses.

use crate::error::TransactionError;
use crate::transaction::Transaction;
use tessera_crypto::{decode_address, verify_signature};
use tessera_types::PublicKey;

/// Structural validity: a non-mint transaction must move a positive amount.
/// Mint transactions may carry any amount (including the configured reward).
pub fn check_amount(tx: &Transaction) -> Result<(), TransactionError> {
    if !tx.is_mint() && tx.amount.is_zero() {
        return Err(TransactionError::InvalidAmount);
    }
    Ok(())
}

/// Pluggable transaction-signature verification.
pub trait TransactionVerifier: Send + Sync {
    /// Whether the transaction's signature is acceptable. Mint transactions
    /// carry no signature and must always be accepted.
    fn verify(&self, tx: &Transaction) -> bool;
}

/// Verifies Ed25519 signatures by decoding the sender address into its
/// public key. The signed message is the transaction hash.
pub struct Ed25519Verifier;

impl TransactionVerifier for Ed25519Verifier {
    fn verify(&self, tx: &Transaction) -> bool {
        let Some(from) = &tx.from else {
            return true;
        };
        let Some(pubkey) = decode_address(from.as_str()) else {
            return false;
        };
        verify_signature(
            tx.hash().as_bytes(),
            &tx.signature,
            &PublicKey(pubkey),
        )
    }
}

/// Accepts every transaction. For tests with synthetic addresses.
pub struct AcceptAll;

impl TransactionVerifier for AcceptAll {
    fn verify(&self, _tx: &Transaction) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_crypto::{derive_address, generate_keypair};
    use tessera_types::{Address, Amount, Timestamp};

    #[test]
    fn zero_amount_transfer_rejected() {
        let tx = Transaction::transfer(
            Address::new("tess_a"),
            Address::new("tess_b"),
            Amount::ZERO,
            Timestamp::new(1),
        );
        assert_eq!(check_amount(&tx), Err(TransactionError::InvalidAmount));
    }

    #[test]
    fn zero_amount_mint_allowed() {
        let tx = Transaction::mint(Address::new("tess_a"), Amount::ZERO, Timestamp::new(1));
        assert_eq!(check_amount(&tx), Ok(()));
    }

    #[test]
    fn ed25519_verifier_accepts_signed_transfer() {
        let kp = generate_keypair();
        let from = derive_address(&kp.public);
        let mut tx = Transaction::transfer(
            from,
            Address::new("tess_recipient"),
            Amount::new(10),
            Timestamp::new(1),
        );
        tx.sign(&kp);
        assert!(Ed25519Verifier.verify(&tx));
    }

    #[test]
    fn ed25519_verifier_rejects_unsigned_transfer() {
        let kp = generate_keypair();
        let from = derive_address(&kp.public);
        let tx = Transaction::transfer(
            from,
            Address::new("tess_recipient"),
            Amount::new(10),
            Timestamp::new(1),
        );
        assert!(!Ed25519Verifier.verify(&tx));
    }

    #[test]
    fn ed25519_verifier_rejects_tampered_amount() {
        let kp = generate_keypair();
        let from = derive_address(&kp.public);
        let mut tx = Transaction::transfer(
            from,
            Address::new("tess_recipient"),
            Amount::new(10),
            Timestamp::new(1),
        );
        tx.sign(&kp);
        tx.amount = Amount::new(10_000);
        assert!(!Ed25519Verifier.verify(&tx));
    }

    #[test]
    fn ed25519_verifier_rejects_undecodable_sender() {
        let tx = Transaction::transfer(
            Address::new("tess_synthetic"),
            Address::new("tess_recipient"),
            Amount::new(10),
            Timestamp::new(1),
        );
        assert!(!Ed25519Verifier.verify(&tx));
    }

    #[test]
    fn ed25519_verifier_accepts_mint() {
        let tx = Transaction::mint(Address::new("tess_a"), Amount::new(100), Timestamp::new(1));
        assert!(Ed25519Verifier.verify(&tx));
    }

    #[test]
    fn accept_all_accepts_anything() {
        let tx = Transaction::transfer(
            Address::new("tess_synthetic"),
            Address::new("tess_other"),
            Amount::new(1),
            Timestamp::new(1),
        );
        assert!(AcceptAll.verify(&tx));
    }
}
