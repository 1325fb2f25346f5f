//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::NodeError;
use tessera_types::NetworkId;

/// Configuration for a Tessera node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which network to join.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Data directory for snapshot storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Whether this node produces blocks.
    #[serde(default)]
    pub producer_enabled: bool,

    /// Seconds between production attempts when producing.
    #[serde(default = "default_produce_interval")]
    pub produce_interval_secs: u64,

    /// Hex-encoded 32-byte seed for the producer signing key (PoS/PoA).
    /// PoW production needs no key.
    #[serde(default)]
    pub producer_seed: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            data_dir: default_data_dir(),
            producer_enabled: false,
            produce_interval_secs: default_produce_interval(),
            producer_seed: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Where this node persists its ledger snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("ledger.snapshot")
    }

    /// Decode the producer seed into key material, if configured.
    pub fn producer_seed_bytes(&self) -> Result<Option<[u8; 32]>, NodeError> {
        let Some(seed_hex) = &self.producer_seed else {
            return Ok(None);
        };
        let mut seed = [0u8; 32];
        hex::decode_to_slice(seed_hex, &mut seed)
            .map_err(|e| NodeError::Config(format!("producer_seed: {e}")))?;
        Ok(Some(seed))
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tessera_data")
}

fn default_produce_interval() -> u64 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_dev() {
        let config = NodeConfig::default();
        assert_eq!(config.network, NetworkId::Dev);
        assert!(!config.producer_enabled);
        assert_eq!(config.produce_interval_secs, 10);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: NodeConfig = toml::from_str(
            r#"
            network = "test"
            producer_enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.network, NetworkId::Test);
        assert!(config.producer_enabled);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn snapshot_path_is_under_data_dir() {
        let config = NodeConfig {
            data_dir: PathBuf::from("/var/lib/tessera"),
            ..NodeConfig::default()
        };
        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/var/lib/tessera/ledger.snapshot")
        );
    }

    #[test]
    fn producer_seed_decodes() {
        let config = NodeConfig {
            producer_seed: Some("11".repeat(32)),
            ..NodeConfig::default()
        };
        assert_eq!(config.producer_seed_bytes().unwrap(), Some([0x11; 32]));
    }

    #[test]
    fn bad_producer_seed_rejected() {
        let config = NodeConfig {
            producer_seed: Some("zz".into()),
            ..NodeConfig::default()
        };
        assert!(config.producer_seed_bytes().is_err());
    }

    #[test]
    fn from_toml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "network = \"live\"\nlog_level = \"debug\"\n").unwrap();

        let config = NodeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.network, NetworkId::Live);
        assert_eq!(config.log_level, "debug");
    }
}
