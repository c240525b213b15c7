//! Datasource capability traits.
//!
//! External collaborators plug in through these two interfaces. The core
//! never fetches anything itself; it only consumes what implementations
//! return.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::imports::{
    import_csv, ColumnMapping, DedupIndex, ImportBatch, ImportOutcome, NormalizeOptions,
};
use crate::prices::{Interval, PricePoint};

/// A market price source (network client, file dump, fixture).
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Stable identifier used for registry lookup and preference ordering.
    fn id(&self) -> &'static str;

    /// Latest spot quote for a symbol in the given quote currency.
    async fn quote(&self, symbol: &str, quote_ccy: &str) -> Result<PricePoint>;

    /// Historical points for a symbol, ordered by timestamp ascending.
    async fn ohlcv(
        &self,
        symbol: &str,
        quote_ccy: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PricePoint>>;
}

/// A transaction import source (exchange export, bank feed).
pub trait ImportSource: Send + Sync {
    /// Stable identifier; also scopes external ids for deduplication.
    fn id(&self) -> &'static str;

    /// Whether this source ships its rows as CSV.
    fn supports_csv(&self) -> bool {
        false
    }

    /// Column mapping translating this source's headers into the canonical
    /// schema. Sources that emit canonical CSV can use the default.
    fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping::canonical()
    }

    /// Parses a CSV payload from this source through its own column mapping.
    fn parse_csv(
        &self,
        content: &[u8],
        batch: &ImportBatch,
        index: &dyn DedupIndex,
        options: &NormalizeOptions,
    ) -> Result<ImportOutcome> {
        import_csv(content, &self.column_mapping(), batch, index, options)
    }
}
