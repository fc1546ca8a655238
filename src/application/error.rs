use thiserror::Error;

use crate::domain::Cents;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: balance {balance}, required {required}")]
    InsufficientBalance { balance: Cents, required: Cents },

    /// The in-memory state was updated but could not be written to disk.
    #[error("Failed to persist ledger: {0:#}")]
    PersistenceFailure(#[from] anyhow::Error),
}
