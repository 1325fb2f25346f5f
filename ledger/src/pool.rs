//! The pending-transaction pool.
//!
//! Insertion-ordered and deduplicated by transaction hash. Block candidates
//! take transactions in insertion order; inclusion in an appended block
//! removes them.

use std::collections::HashSet;
use tessera_transactions::Transaction;
use tessera_types::TxHash;

/// Pending transactions awaiting inclusion in a block.
#[derive(Clone, Debug, Default)]
pub struct TransactionPool {
    order: Vec<Transaction>,
    known: HashSet<TxHash>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a transaction. Returns `false` if its hash is already pooled.
    pub fn insert(&mut self, tx: Transaction) -> bool {
        if !self.known.insert(tx.hash()) {
            return false;
        }
        self.order.push(tx);
        true
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.known.contains(hash)
    }

    /// Clone up to `max` transactions in insertion order.
    pub fn snapshot(&self, max: usize) -> Vec<Transaction> {
        self.order.iter().take(max).cloned().collect()
    }

    /// Remove every pooled transaction whose hash is in `included`.
    pub fn remove_all(&mut self, included: &HashSet<TxHash>) {
        if included.is_empty() {
            return;
        }
        self.order.retain(|tx| !included.contains(&tx.hash()));
        self.known.retain(|h| !included.contains(h));
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
