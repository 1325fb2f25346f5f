//! Tessera daemon — entry point for running a ledger node.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use tessera_consensus::strategy_for;
use tessera_crypto::{derive_address, keypair_from_seed};
use tessera_ledger::{create_genesis_block, initial_params, GenesisConfig, Ledger};
use tessera_node::{
    init_logging, EventBus, FileSink, LedgerService, LogFormat, NodeConfig, ShutdownController,
};
use tessera_transactions::Ed25519Verifier;
use tessera_types::NetworkId;

#[derive(Parser)]
#[command(name = "tessera-daemon", about = "Tessera ledger node daemon")]
struct Cli {
    /// Network to join: "live", "test", or "dev".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "TESSERA_NETWORK")]
    network: Option<String>,

    /// Data directory for snapshot storage.
    #[arg(long, env = "TESSERA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Produce blocks on a timer.
    #[arg(long, env = "TESSERA_PRODUCE")]
    produce: bool,

    /// Seconds between production attempts.
    #[arg(long, env = "TESSERA_PRODUCE_INTERVAL")]
    produce_interval: Option<u64>,

    /// Hex-encoded 32-byte producer key seed.
    #[arg(long, env = "TESSERA_PRODUCER_SEED")]
    producer_seed: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "TESSERA_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "TESSERA_LOG_FORMAT")]
    log_format: String,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_network(s: &str) -> NetworkId {
    match s.to_lowercase().as_str() {
        "live" => NetworkId::Live,
        "test" => NetworkId::Test,
        _ => NetworkId::Dev,
    }
}

fn merge_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(network) = cli.network.as_deref() {
        config.network = parse_network(network);
    }
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if cli.produce {
        config.producer_enabled = true;
    }
    if let Some(interval) = cli.produce_interval {
        config.produce_interval_secs = interval;
    }
    if let Some(seed) = &cli.producer_seed {
        config.producer_seed = Some(seed.clone());
    }
    config.log_level = cli.log_level.clone();
    config.log_format = cli.log_format.clone();
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = merge_config(&cli)?;
    init_logging(
        LogFormat::from_str_lossy(&config.log_format),
        &config.log_level,
    );

    let params = initial_params(&config.network);
    let signer = config
        .producer_seed_bytes()?
        .map(|seed| keypair_from_seed(&seed));
    let producer = signer.as_ref().map(|kp| derive_address(&kp.public));
    let strategy = strategy_for(&params, signer);
    let verifier = Arc::new(Ed25519Verifier);

    let sink = FileSink::new(config.snapshot_path());
    let ledger = match sink.load().context("reading ledger snapshot")? {
        Some(snapshot) => {
            tracing::info!(
                height = snapshot.height(),
                "restoring ledger from snapshot"
            );
            Ledger::restore(snapshot, strategy, verifier)
                .context("revalidating persisted chain")?
        }
        None => {
            tracing::info!(network = config.network.as_str(), "starting from genesis");
            let genesis = create_genesis_block(&GenesisConfig::empty(config.network));
            Ledger::new(genesis, params, strategy, verifier).context("building genesis ledger")?
        }
    };

    let service = LedgerService::spawn(ledger, Arc::new(sink), EventBus::new());
    tracing::info!(height = service.height().await, "ledger service running");

    let shutdown = ShutdownController::new();

    if config.producer_enabled {
        let producer = producer
            .context("--producer-seed is required when block production is enabled")?;
        let service = service.clone();
        let mut shutdown_rx = shutdown.subscribe();
        let interval = Duration::from_secs(config.produce_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match service.produce_block(producer.clone()).await {
                            Ok(block) => {
                                tracing::info!(index = block.index, hash = %block.hash, "produced block");
                            }
                            Err(err) => {
                                tracing::debug!(error = %err, "production attempt skipped");
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });
    }

    shutdown.wait_for_signal().await;
    tracing::info!("daemon exited");
    Ok(())
}
