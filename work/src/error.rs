use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorkError {
    #[error("work generation was cancelled")]
    Cancelled,
}
