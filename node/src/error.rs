use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("transaction rejected: {0}")]
    Submit(#[from] tessera_ledger::SubmitError),

    #[error("block production failed: {0}")]
    Production(#[from] tessera_ledger::ProductionError),

    #[error("block rejected: {0}")]
    Validation(#[from] tessera_ledger::ValidationError),

    #[error("registry error: {0}")]
    Registry(#[from] tessera_registry::RegistryError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger service has stopped")]
    ServiceStopped,
}
