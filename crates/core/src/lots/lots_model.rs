//! Lot and realized-event models.
//!
//! Lots and realized events are ephemeral: they are created and consumed
//! entirely inside one replay invocation and never persisted or shared.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A quantity of an asset acquired at a specific cost per unit, consumed
/// FIFO on disposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub asset_symbol: String,
    pub account_id: i64,
    pub remaining_qty: Decimal,
    pub cost_per_unit: Decimal,
    pub opened_at: DateTime<Utc>,
    /// Sequence id of the acquiring transaction; breaks same-timestamp ties.
    pub sequence_id: i64,
}

impl Lot {
    pub fn open_cost(&self) -> Decimal {
        self.remaining_qty * self.cost_per_unit
    }
}

/// Profit or loss crystallized by a disposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedEvent {
    pub ts: DateTime<Utc>,
    pub asset_symbol: String,
    pub account_id: i64,
    pub proceeds: Decimal,
    pub cost_consumed: Decimal,
    pub realized_pnl: Decimal,
}

/// Result of replaying an ordered transaction sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replay {
    pub open_lots: Vec<Lot>,
    pub realized: Vec<RealizedEvent>,
}
