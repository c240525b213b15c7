//! WealthOS Core - Portfolio valuation domain logic.
//!
//! This crate contains the valuation core: transaction normalization and
//! deduplication, the point-in-time price cache, FIFO lot replay, and the
//! valuation engine. It is storage-agnostic and defines traits that are
//! implemented by the persistence and datasource layers.

pub mod constants;
pub mod datasources;
pub mod errors;
pub mod imports;
pub mod lots;
pub mod prices;
pub mod settings;
pub mod transactions;
pub mod valuation;

// Re-export common types from the lots and valuation modules
pub use lots::*;
pub use valuation::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
