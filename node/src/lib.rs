//! Tessera node — the concurrency shell around the ledger core.
//!
//! The node serializes every ledger mutation through a single actor task,
//! runs PoW sealing off that path with cancellation, coordinates fork choice
//! for remote blocks and chains, fans out ledger events, and persists
//! snapshots after each successful append.

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod persist;
pub mod service;
pub mod shutdown;
pub mod sync;

pub use config::NodeConfig;
pub use error::NodeError;
pub use event::{EventBus, LedgerEvent};
pub use logging::{init_logging, LogFormat};
pub use persist::{FileSink, NullSink, SnapshotSink};
pub use service::LedgerService;
pub use shutdown::ShutdownController;
pub use sync::{BlockIngest, ChainIngest, ForkChoiceRejected, SyncCoordinator};
