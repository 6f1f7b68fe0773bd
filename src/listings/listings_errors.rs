use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Unknown listing status: {0}")]
    UnknownStatus(String),

    #[error("Invalid ledger date: {0}")]
    InvalidDate(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),
}
