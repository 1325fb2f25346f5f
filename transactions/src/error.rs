use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("transaction amount must be greater than zero")]
    InvalidAmount,

    #[error("transaction signature verification failed")]
    BadSignature,
}
