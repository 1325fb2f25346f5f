use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("stake adjustment of {delta} would take validator {address} below zero (current {stake})")]
    WouldGoNegative {
        address: String,
        stake: u128,
        delta: i128,
    },

    #[error("unknown validator: {0}")]
    UnknownValidator(String),
}
