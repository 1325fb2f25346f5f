//! The serialized ledger service.
//!
//! One actor task owns the mutation path: submit, produce, append, adopt,
//! and registry changes are commands on an mpsc queue and execute strictly
//! one at a time, so no partial application is ever observable. Reads take
//! a read lock directly and never queue.
//!
//! PoW sealing is the exception to inline execution: the nonce search can
//! take unbounded wall-clock time, so `Produce` under PoW builds the
//! candidate on the serialized path, seals in a blocking task, and re-enters
//! through `AppendLocal`. Any successful chain mutation aborts in-flight
//! seals; a sealed block whose tip raced away resolves to `Superseded` and
//! is discarded.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};

use crate::error::NodeError;
use crate::event::{EventBus, LedgerEvent};
use crate::persist::SnapshotSink;
use crate::sync::ForkChoiceRejected;
use tessera_ledger::{
    Block, ConsensusStrategy, Ledger, LedgerSnapshot, ProductionError, SealError, SubmitError,
    ValidationError,
};
use tessera_registry::RegistryError;
use tessera_registry::ValidatorStatus;
use tessera_transactions::Transaction;
use tessera_types::{Address, Amount, ConsensusMode, Timestamp, TxHash};

/// Command queue depth before senders see backpressure.
const COMMAND_QUEUE_DEPTH: usize = 256;

enum Command {
    Submit {
        tx: Transaction,
        reply: oneshot::Sender<Result<TxHash, SubmitError>>,
    },
    Produce {
        producer: Address,
        reply: oneshot::Sender<Result<Block, ProductionError>>,
    },
    /// A locally sealed PoW block re-entering the serialized path.
    AppendLocal {
        block: Block,
        reply: oneshot::Sender<Result<Block, ProductionError>>,
    },
    /// An externally received block (sync path).
    Append {
        block: Block,
        reply: oneshot::Sender<Result<(), ValidationError>>,
    },
    AdoptChain {
        blocks: Vec<Block>,
        reply: oneshot::Sender<Result<u64, ForkChoiceRejected>>,
    },
    Register {
        address: Address,
        stake: Amount,
        reply: oneshot::Sender<()>,
    },
    AdjustStake {
        address: Address,
        delta: i128,
        reply: oneshot::Sender<Result<Amount, RegistryError>>,
    },
    SetStatus {
        address: Address,
        status: ValidatorStatus,
        reply: oneshot::Sender<Result<(), RegistryError>>,
    },
}

struct Actor {
    ledger: Arc<RwLock<Ledger>>,
    strategy: Arc<dyn ConsensusStrategy>,
    sink: Arc<dyn SnapshotSink>,
    events: Arc<EventBus>,
    /// For PoW seal tasks to re-enter the serialized path.
    commands: mpsc::Sender<Command>,
    rx: mpsc::Receiver<Command>,
}

impl Actor {
    async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            let fatal = self.handle(cmd).await;
            if fatal {
                break;
            }
        }
        tracing::info!("ledger service stopped");
    }

    /// Handle one command. Returns `true` only on a fatal internal
    /// invariant violation, which stops the mutation task — pending and
    /// future callers then observe `ServiceStopped`.
    async fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Submit { tx, reply } => {
                let result = self.ledger.write().await.submit_transaction(tx.clone());
                if let Ok(hash) = &result {
                    self.events.emit(&LedgerEvent::TransactionAccepted {
                        hash: *hash,
                        from: tx.from.clone(),
                        to: tx.to.clone(),
                        amount: tx.amount,
                    });
                }
                let _ = reply.send(result);
                false
            }

            Command::Produce { producer, reply } => {
                if self.strategy.mode() == ConsensusMode::ProofOfWork {
                    self.produce_via_search(producer, reply).await;
                    return false;
                }
                // PoS/PoA sealing is a signature — run the whole cycle inline.
                let mut ledger = self.ledger.write().await;
                let result = ledger.produce_block(&producer);
                let snapshot = result.is_ok().then(|| ledger.snapshot());
                drop(ledger);

                let fatal = matches!(result, Err(ProductionError::Invariant(_)));
                if fatal {
                    tracing::error!(
                        producer = %producer,
                        "locally produced block failed validation; stopping mutation task"
                    );
                }
                if let Ok(block) = &result {
                    self.after_append(block, snapshot.expect("snapshot taken on success"));
                }
                let _ = reply.send(result);
                fatal
            }

            Command::AppendLocal { block, reply } => {
                let mut ledger = self.ledger.write().await;
                let result = ledger.append_block(block.clone());
                let snapshot = result.is_ok().then(|| ledger.snapshot());
                drop(ledger);

                match result {
                    Ok(()) => {
                        self.after_append(&block, snapshot.expect("snapshot taken on success"));
                        let _ = reply.send(Ok(block));
                        false
                    }
                    // The tip moved while the search ran — a competing block
                    // won. Discard the candidate; the caller may retry.
                    Err(
                        ValidationError::NonSequentialIndex { .. }
                        | ValidationError::BrokenLinkage { .. },
                    ) => {
                        let _ = reply.send(Err(ProductionError::Superseded));
                        false
                    }
                    Err(err) => {
                        tracing::error!(
                            index = block.index,
                            error = %err,
                            "locally sealed block failed validation; stopping mutation task"
                        );
                        let _ = reply.send(Err(ProductionError::Invariant(Box::new(err))));
                        true
                    }
                }
            }

            Command::Append { block, reply } => {
                let mut ledger = self.ledger.write().await;
                let result = ledger.append_block(block.clone());
                let snapshot = result.is_ok().then(|| ledger.snapshot());
                drop(ledger);

                match &result {
                    Ok(()) => {
                        self.after_append(&block, snapshot.expect("snapshot taken on success"))
                    }
                    Err(err) => self.events.emit(&LedgerEvent::BlockRejected {
                        index: block.index,
                        reason: err.to_string(),
                    }),
                }
                let _ = reply.send(result);
                false
            }

            Command::AdoptChain { blocks, reply } => {
                let mut ledger = self.ledger.write().await;
                let old_height = ledger.height();
                let remote_height = blocks.last().map(|b| b.index).unwrap_or(0);
                let result = if blocks.is_empty() {
                    Err(ForkChoiceRejected::Invalid(ValidationError::EmptyChain))
                } else if remote_height <= old_height {
                    // Longest valid chain wins; ties keep the local chain.
                    Err(ForkChoiceRejected::NotLonger {
                        local: old_height,
                        remote: remote_height,
                    })
                } else {
                    ledger
                        .replace_chain(blocks)
                        .map(|()| ledger.height())
                        .map_err(ForkChoiceRejected::Invalid)
                };
                let snapshot = result.is_ok().then(|| ledger.snapshot());
                drop(ledger);

                if let Ok(new_height) = &result {
                    self.strategy.abort_seal();
                    self.persist(snapshot.expect("snapshot taken on success"));
                    self.events.emit(&LedgerEvent::ChainAdopted {
                        old_height,
                        new_height: *new_height,
                    });
                }
                let _ = reply.send(result);
                false
            }

            Command::Register { address, stake, reply } => {
                self.ledger.write().await.register_validator(address, stake);
                let _ = reply.send(());
                false
            }

            Command::AdjustStake { address, delta, reply } => {
                let result = self.ledger.write().await.adjust_stake(&address, delta);
                let _ = reply.send(result);
                false
            }

            Command::SetStatus { address, status, reply } => {
                let result = self
                    .ledger
                    .write()
                    .await
                    .set_validator_status(&address, status);
                let _ = reply.send(result);
                false
            }
        }
    }

    /// PoW production: build on the serialized path, seal off it, re-enter
    /// through `AppendLocal`. The command queue keeps draining while the
    /// search runs.
    async fn produce_via_search(
        &self,
        producer: Address,
        reply: oneshot::Sender<Result<Block, ProductionError>>,
    ) {
        let candidate = self
            .ledger
            .read()
            .await
            .build_candidate(&producer, Timestamp::now());
        let candidate = match candidate {
            Ok(candidate) => candidate,
            Err(err) => {
                let _ = reply.send(Err(err));
                return;
            }
        };

        let strategy = Arc::clone(&self.strategy);
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let sealed = tokio::task::spawn_blocking(move || strategy.seal(candidate))
                .await
                .unwrap_or(Err(SealError::Cancelled));
            match sealed {
                Ok(block) => {
                    // A send failure means the service stopped; the caller
                    // observes it through the dropped reply channel.
                    let _ = commands.send(Command::AppendLocal { block, reply }).await;
                }
                Err(SealError::Cancelled) => {
                    let _ = reply.send(Err(ProductionError::Superseded));
                }
                Err(err) => {
                    let _ = reply.send(Err(ProductionError::Sealing(err)));
                }
            }
        });
    }

    fn after_append(&self, block: &Block, snapshot: LedgerSnapshot) {
        // Any in-flight seal now targets a stale tip.
        self.strategy.abort_seal();
        self.persist(snapshot);
        self.events.emit(&LedgerEvent::BlockAppended {
            hash: block.hash,
            index: block.index,
            producer: block.producer.clone(),
        });
    }

    fn persist(&self, snapshot: LedgerSnapshot) {
        if let Err(err) = self.sink.persist(&snapshot) {
            tracing::warn!(error = %err, "snapshot persist failed");
        }
    }
}

/// Cloneable handle to the ledger service.
///
/// All mutations funnel through the actor; reads go straight to the shared
/// ledger under a read lock. One service instance exists per process and is
/// passed by handle to every collaborator.
#[derive(Clone)]
pub struct LedgerService {
    ledger: Arc<RwLock<Ledger>>,
    commands: mpsc::Sender<Command>,
}

impl LedgerService {
    /// Spawn the mutation actor and return a handle.
    pub fn spawn(ledger: Ledger, sink: Arc<dyn SnapshotSink>, events: EventBus) -> Self {
        let strategy = ledger.strategy();
        let ledger = Arc::new(RwLock::new(ledger));
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let actor = Actor {
            ledger: Arc::clone(&ledger),
            strategy,
            sink,
            events: Arc::new(events),
            commands: tx.clone(),
            rx,
        };
        tokio::spawn(actor.run());
        Self {
            ledger,
            commands: tx,
        }
    }

    async fn request<R>(
        &self,
        cmd: Command,
        rx: oneshot::Receiver<R>,
    ) -> Result<R, NodeError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| NodeError::ServiceStopped)?;
        rx.await.map_err(|_| NodeError::ServiceStopped)
    }

    // ── Mutations (serialized) ──────────────────────────────────────────

    pub async fn submit_transaction(&self, tx: Transaction) -> Result<TxHash, NodeError> {
        let (reply, rx) = oneshot::channel();
        Ok(self.request(Command::Submit { tx, reply }, rx).await??)
    }

    pub async fn produce_block(&self, producer: Address) -> Result<Block, NodeError> {
        let (reply, rx) = oneshot::channel();
        Ok(self.request(Command::Produce { producer, reply }, rx).await??)
    }

    pub async fn append_block(&self, block: Block) -> Result<(), NodeError> {
        let (reply, rx) = oneshot::channel();
        Ok(self.request(Command::Append { block, reply }, rx).await??)
    }

    /// Full-chain adoption; fork choice semantics live in
    /// [`crate::sync::SyncCoordinator`].
    pub(crate) async fn adopt_chain(&self, blocks: Vec<Block>) -> Result<u64, ForkChoiceRejected> {
        let (reply, rx) = oneshot::channel();
        match self.request(Command::AdoptChain { blocks, reply }, rx).await {
            Ok(result) => result,
            Err(_) => Err(ForkChoiceRejected::ServiceStopped),
        }
    }

    pub async fn register_validator(
        &self,
        address: Address,
        stake: Amount,
    ) -> Result<(), NodeError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Register { address, stake, reply }, rx)
            .await
    }

    pub async fn adjust_stake(&self, address: Address, delta: i128) -> Result<Amount, NodeError> {
        let (reply, rx) = oneshot::channel();
        Ok(self
            .request(Command::AdjustStake { address, delta, reply }, rx)
            .await??)
    }

    pub async fn set_validator_status(
        &self,
        address: Address,
        status: ValidatorStatus,
    ) -> Result<(), NodeError> {
        let (reply, rx) = oneshot::channel();
        Ok(self
            .request(Command::SetStatus { address, status, reply }, rx)
            .await??)
    }

    // ── Reads (concurrent, against the live snapshot) ───────────────────

    pub async fn chain_tip(&self) -> Block {
        self.ledger.read().await.chain_tip().clone()
    }

    pub async fn height(&self) -> u64 {
        self.ledger.read().await.height()
    }

    pub async fn derive_balance(&self, address: &Address) -> Amount {
        self.ledger.read().await.derive_balance(address)
    }

    pub async fn pending_count(&self) -> usize {
        self.ledger.read().await.pending_count()
    }

    pub async fn active_validators(&self) -> Vec<Address> {
        self.ledger.read().await.active_validators()
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.read().await.snapshot()
    }
}
