//! Deduplication keys for imported transactions.
//!
//! External ids are the strongest signal when a datasource provides them;
//! otherwise the key is a stable fingerprint over the row's semantic content,
//! with decimals rounded to a fixed scale so formatting noise ("1.50" vs
//! "1.5") cannot defeat matching.

use dashmap::DashMap;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::transactions::Transaction;

/// Scope prefix for rows without a datasource of their own.
const UNSCOPED_DATASOURCE: &str = "manual";

/// Computes the dedup key for a candidate transaction.
///
/// `external_id`, scoped by datasource, wins when present. The fallback is a
/// SHA-256 over `(ts, account, asset, side, qty, price-or-total)`.
pub fn compute_dedup_key(tx: &Transaction, scale: u32) -> String {
    if let Some(ref external_id) = tx.external_id {
        let scope = tx.datasource.as_deref().unwrap_or(UNSCOPED_DATASOURCE);
        return format!("{}:{}", scope, external_id);
    }

    let mut hasher = Sha256::new();
    hasher.update(tx.ts.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(tx.account_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(tx.asset_symbol.as_bytes());
    hasher.update(b"|");
    hasher.update(tx.side.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_decimal(tx.qty, scale).as_bytes());
    hasher.update(b"|");
    if let Some(amount) = tx.price_quote.or(tx.total_quote) {
        hasher.update(normalize_decimal(amount, scale).as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Rounds to the fixed scale and strips trailing zeros so equivalent values
/// hash identically.
fn normalize_decimal(d: Decimal, scale: u32) -> String {
    d.round_dp(scale).normalize().to_string()
}

/// The persisted store's view of already-used dedup keys.
///
/// `claim` must be an atomic check-and-insert so two concurrent imports can
/// never both accept the same external row.
pub trait DedupIndex: Send + Sync {
    /// Registers the key if unseen. Returns true when this caller won the
    /// key, false when it already existed.
    fn claim(&self, key: &str) -> Result<bool>;

    /// Read-only membership test (dry runs).
    fn contains(&self, key: &str) -> Result<bool>;
}

/// In-memory dedup index; backs tests and single-process imports.
#[derive(Debug, Default)]
pub struct MemoryDedupIndex {
    keys: DashMap<String, ()>,
}

impl MemoryDedupIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupIndex for MemoryDedupIndex {
    fn claim(&self, key: &str) -> Result<bool> {
        Ok(self.keys.insert(key.to_string(), ()).is_none())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.keys.contains_key(key))
    }
}
