//! The transaction record.

use serde::{Deserialize, Serialize};
use tessera_crypto::{blake2b_256_multi, sign_message};
use tessera_types::{Address, Amount, KeyPair, Signature, Timestamp, TxHash};

/// Marker mixed into the hash preimage in place of a sender for mint
/// transactions, so `None` and an empty sender can never collide.
const MINT_SENDER_TAG: &[u8] = b"mint";

/// An immutable record of one value transfer.
///
/// `from: None` marks a mint transaction — a block reward or genesis
/// allocation — which creates new supply and bypasses balance-sufficiency
/// checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender, or `None` for mint/reward transactions.
    pub from: Option<Address>,
    /// Recipient.
    pub to: Address,
    /// Transferred amount in raw units.
    pub amount: Amount,
    /// Submission time, informational only.
    pub timestamp: Timestamp,
    /// Signature over the transaction hash. Zero on mint transactions.
    /// Verified through the pluggable [`TransactionVerifier`] hook.
    ///
    /// [`TransactionVerifier`]: crate::validation::TransactionVerifier
    pub signature: Signature,
}

impl Transaction {
    /// Create an unsigned transfer. Call [`Transaction::sign`] before
    /// submitting to a ledger that verifies signatures.
    pub fn transfer(from: Address, to: Address, amount: Amount, timestamp: Timestamp) -> Self {
        Self {
            from: Some(from),
            to,
            amount,
            timestamp,
            signature: Signature::ZERO,
        }
    }

    /// Create a mint transaction (new supply, no sender).
    pub fn mint(to: Address, amount: Amount, timestamp: Timestamp) -> Self {
        Self {
            from: None,
            to,
            amount,
            timestamp,
            signature: Signature::ZERO,
        }
    }

    /// Create the block-reward transaction for a producer.
    pub fn reward(producer: Address, amount: Amount, timestamp: Timestamp) -> Self {
        Self::mint(producer, amount, timestamp)
    }

    /// Whether this transaction mints new supply.
    pub fn is_mint(&self) -> bool {
        self.from.is_none()
    }

    /// The transaction's identity: Blake2b-256 over `(from, to, amount,
    /// timestamp)`. The signature signs this hash and is excluded from it.
    pub fn hash(&self) -> TxHash {
        let sender: &[u8] = match &self.from {
            Some(addr) => addr.as_str().as_bytes(),
            None => MINT_SENDER_TAG,
        };
        let amount = self.amount.raw().to_le_bytes();
        let timestamp = self.timestamp.as_secs().to_le_bytes();
        TxHash::new(blake2b_256_multi(&[
            sender,
            self.to.as_str().as_bytes(),
            &amount,
            &timestamp,
        ]))
    }

    /// Sign this transaction with the sender's key pair.
    pub fn sign(&mut self, keypair: &KeyPair) {
        self.signature = sign_message(self.hash().as_bytes(), &keypair.private);
    }
}
