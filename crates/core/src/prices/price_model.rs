//! Price domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A point-in-time market price for an asset in a quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub asset_symbol: String,
    pub quote_ccy: String,
    pub ts: DateTime<Utc>,
    pub price: Decimal,
    /// Provider that supplied the point, if any.
    #[serde(default)]
    pub source: Option<String>,
}

impl PricePoint {
    pub fn key(&self) -> PriceKey {
        PriceKey {
            asset_symbol: self.asset_symbol.clone(),
            quote_ccy: self.quote_ccy.clone(),
        }
    }
}

/// Cache key: one price series per (asset, quote currency) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub asset_symbol: String,
    pub quote_ccy: String,
}

impl PriceKey {
    pub fn new(asset_symbol: impl Into<String>, quote_ccy: impl Into<String>) -> Self {
        Self {
            asset_symbol: asset_symbol.into(),
            quote_ccy: quote_ccy.into(),
        }
    }
}

/// Outcome of an idempotent price upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertResult {
    Inserted,
    Updated,
}

/// Sampling interval for OHLCV history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Hourly,
    Daily,
    Weekly,
}
