//! Transaction source trait.
//!
//! The ledger store is an external collaborator; this trait is the read-only
//! seam the valuation core pulls its snapshot through.

use async_trait::async_trait;

use super::transactions_model::{Transaction, TxFilter};
use crate::errors::Result;

/// Read access to the persisted transaction ledger.
///
/// Implementations must return transactions ordered by `(ts, sequence_id)`
/// ascending; the replay relies on that order for deterministic lot matching.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn list_transactions(&self, filter: &TxFilter) -> Result<Vec<Transaction>>;
}

/// In-memory transaction store.
///
/// Backs tests and dry-run tooling; not meant for persistence.
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    transactions: Vec<Transaction>,
}

impl MemoryTransactionStore {
    pub fn new(mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by_key(|tx| tx.replay_key());
        Self { transactions }
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn list_transactions(&self, filter: &TxFilter) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect())
    }
}
