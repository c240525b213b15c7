//! Valuation output models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One asset's aggregated holdings, priced as of the valuation instant.
///
/// When no usable price exists the position is `stale`: the priced fields are
/// `None` and the position is excluded from the summary totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub asset_symbol: String,
    pub quantity: Decimal,
    pub cost_open: Decimal,
    pub price: Option<Decimal>,
    pub value: Option<Decimal>,
    pub unrealized: Option<Decimal>,
    pub stale: bool,
    /// Timestamp of the price actually used; at or before the valuation
    /// instant, never after.
    pub price_ts: Option<DateTime<Utc>>,
}

/// Portfolio-level aggregates over the non-stale positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub value: Decimal,
    pub cost_open: Decimal,
    pub unrealized: Decimal,
    pub realized: Decimal,
}

/// Full valuation report for one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub as_of: DateTime<Utc>,
    pub quote_ccy: String,
    pub totals: Totals,
    /// Sorted by asset symbol.
    pub positions: Vec<Position>,
    /// One entry per stale position.
    pub warnings: Vec<String>,
}
