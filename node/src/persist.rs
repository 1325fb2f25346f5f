//! Snapshot persistence — a pluggable sink the service calls after each
//! successful append.
//!
//! The in-memory ledger stays the source of truth while the node runs; the
//! sink only has to guarantee that whatever it wrote last can be loaded back
//! into an equivalent ledger at startup. The file sink writes through a
//! temporary file and renames, so a crash mid-write never clobbers the
//! previous snapshot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tessera_ledger::LedgerSnapshot;

/// Destination for ledger snapshots.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: &LedgerSnapshot) -> io::Result<()>;
}

/// Discards snapshots. For tests and ephemeral nodes.
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn persist(&self, _snapshot: &LedgerSnapshot) -> io::Result<()> {
        Ok(())
    }
}

/// Writes snapshots to a file, atomically via rename.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last persisted snapshot, or `None` if none exists yet.
    pub fn load(&self) -> io::Result<Option<LedgerSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let snapshot = LedgerSnapshot::from_bytes(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(snapshot))
    }
}

impl SnapshotSink for FileSink {
    fn persist(&self, snapshot: &LedgerSnapshot) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, snapshot.to_bytes())?;
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_ledger::{create_genesis_block, GenesisConfig};
    use tessera_types::{ChainParams, NetworkId};

    fn sample_snapshot() -> LedgerSnapshot {
        let genesis = create_genesis_block(&GenesisConfig::empty(NetworkId::Dev));
        LedgerSnapshot::create(ChainParams::mainnet_defaults(), vec![genesis], Vec::new())
    }

    #[test]
    fn file_sink_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("ledger.snapshot"));

        let snapshot = sample_snapshot();
        sink.persist(&snapshot).unwrap();

        let loaded = sink.load().unwrap().expect("snapshot exists");
        assert_eq!(loaded.hash, snapshot.hash);
        assert!(loaded.verify());
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("absent.snapshot"));
        assert!(sink.load().unwrap().is_none());
    }

    #[test]
    fn persist_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("ledger.snapshot"));

        sink.persist(&sample_snapshot()).unwrap();
        let second = LedgerSnapshot::create(
            ChainParams::mainnet_defaults(),
            vec![create_genesis_block(&GenesisConfig::empty(NetworkId::Test))],
            Vec::new(),
        );
        sink.persist(&second).unwrap();

        let loaded = sink.load().unwrap().unwrap();
        assert_eq!(loaded.hash, second.hash);
    }

    #[test]
    fn corrupt_file_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.snapshot");
        fs::write(&path, b"not a snapshot").unwrap();

        let err = FileSink::new(path).load().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn null_sink_accepts_everything() {
        NullSink.persist(&sample_snapshot()).unwrap();
    }
}
