//! Transactions module - domain models and the ledger-store seam.

mod transactions_model;
mod transactions_traits;


pub use transactions_model::{Transaction, TxFilter, TxSide};
pub use transactions_traits::{MemoryTransactionStore, TransactionStore};
