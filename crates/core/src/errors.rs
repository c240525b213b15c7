//! Core error types for the valuation engine.
//!
//! Row-level import failures (`ImportError`) are recorded per row and never
//! abort a batch; `ReplayError` is fatal for the replay call that raised it.
//! Boundary I/O failures are wrapped in `Error::Store` and surfaced unchanged.

use chrono::{DateTime, ParseError as ChronoParseError, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the valuation core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Price lookup failed: {0}")]
    Price(#[from] PriceError),

    #[error("Replay failed: {0}")]
    Replay(#[from] ReplayError),

    /// Boundary I/O failure (ledger store, dedup index). The core performs no
    /// retries; retry policy belongs to the collaborator.
    #[error("Store operation failed: {0}")]
    Store(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for user input and transaction data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Quantity must be strictly positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("Price must be strictly positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("Transaction {0}: buy/sell requires price_quote or total_quote")]
    MissingPriceOrTotal(i64),

    #[error("Unknown transaction side: {0}")]
    UnknownSide(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

/// Row-level import failures. Recorded per row; the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Row {row}: failed to parse field '{field}' from '{value}'")]
    Parse {
        row: usize,
        field: String,
        value: String,
    },

    #[error("Row {row}: {message}")]
    Invalid { row: usize, message: String },

    #[error("Row {row}: duplicate of already-imported row (key {key})")]
    Duplicate { row: usize, key: String },

    #[error("Column mapping is invalid: {0}")]
    MappingInvalid(String),
}

/// Price cache lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("No price for {asset_symbol}/{quote_ccy} at or before {as_of}")]
    NotFound {
        asset_symbol: String,
        quote_ccy: String,
        as_of: DateTime<Utc>,
    },
}

/// Replay failures. Fatal for the replay call that raised them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error(
        "Insufficient open lots for {asset_symbol} in account {account_id}: \
         tried to consume {requested}, only {available} open"
    )]
    InsufficientLots {
        asset_symbol: String,
        account_id: i64,
        requested: Decimal,
        available: Decimal,
    },
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}
