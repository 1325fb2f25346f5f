//! Events emitted by the ledger service for outbound broadcast.
//!
//! The transport layer subscribes here to relay accepted transactions and
//! appended blocks to peers; the core never talks to the network directly.

use tessera_types::{Address, Amount, BlockHash, TxHash};

/// Ledger-level events observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug)]
pub enum LedgerEvent {
    /// A transaction entered the pending pool.
    TransactionAccepted {
        hash: TxHash,
        from: Option<Address>,
        to: Address,
        amount: Amount,
    },
    /// A block was validated and appended to the chain.
    BlockAppended {
        hash: BlockHash,
        index: u64,
        producer: Address,
    },
    /// An incoming block was rejected.
    BlockRejected { index: u64, reason: String },
    /// The chain was replaced by a longer valid remote chain.
    ChainAdopted { old_height: u64, new_height: u64 },
}

/// Synchronous fan-out event bus.
///
/// Listeners run inline on the emitting task; keep handlers fast to avoid
/// stalling the mutation path.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&LedgerEvent::ChainAdopted {
            old_height: 1,
            new_height: 2,
        });
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(&LedgerEvent::BlockRejected {
            index: 1,
            reason: "test".into(),
        });
    }

    #[test]
    fn listener_sees_event_fields() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        let s = Arc::clone(&seen);
        bus.subscribe(Box::new(move |event| {
            if let LedgerEvent::BlockAppended { index, .. } = event {
                s.store(*index as usize, Ordering::SeqCst);
            }
        }));

        bus.emit(&LedgerEvent::BlockAppended {
            hash: BlockHash::ZERO,
            index: 42,
            producer: Address::new("tess_miner"),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }
}
