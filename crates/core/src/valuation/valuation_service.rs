//! Point-in-time valuation over replay output.
//!
//! Pure function of its inputs: the caller supplies the open lots, realized
//! events, the valuation instant, and the price cache. No clock is read here,
//! so the same inputs always produce the same summary.

use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::lots::{Lot, RealizedEvent};
use crate::prices::PriceCache;
use crate::valuation::valuation_model::{Position, Summary, Totals};

/// Values open lots and realized events as of a single instant.
///
/// Lots are grouped per asset after the account filter. A position whose
/// asset has no cached price at or before `as_of` comes back `stale` and is
/// left out of the totals entirely, with a warning recorded.
pub fn summarize(
    open_lots: &[Lot],
    realized: &[RealizedEvent],
    as_of: DateTime<Utc>,
    quote_ccy: &str,
    prices: &PriceCache,
    account_filter: Option<i64>,
) -> Summary {
    // BTreeMap keeps positions sorted by symbol.
    let mut by_asset: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for lot in open_lots {
        if account_filter.is_some_and(|id| lot.account_id != id) {
            continue;
        }
        let entry = by_asset.entry(lot.asset_symbol.clone()).or_default();
        entry.0 += lot.remaining_qty;
        entry.1 += lot.open_cost();
    }

    let mut totals = Totals::default();
    let mut positions = Vec::with_capacity(by_asset.len());
    let mut warnings = Vec::new();

    for (asset_symbol, (quantity, cost_open)) in by_asset {
        match prices.last_price_at_or_before(&asset_symbol, quote_ccy, as_of) {
            Ok(point) => {
                let value = quantity * point.price;
                let unrealized = value - cost_open;
                totals.value += value;
                totals.cost_open += cost_open;
                totals.unrealized += unrealized;
                positions.push(Position {
                    asset_symbol,
                    quantity,
                    cost_open,
                    price: Some(point.price),
                    value: Some(value),
                    unrealized: Some(unrealized),
                    stale: false,
                    price_ts: Some(point.ts),
                });
            }
            Err(err) => {
                warn!(
                    "no price for {}/{} at or before {}; position is stale",
                    asset_symbol, quote_ccy, as_of
                );
                warnings.push(err.to_string());
                positions.push(Position {
                    asset_symbol,
                    quantity,
                    cost_open,
                    price: None,
                    value: None,
                    unrealized: None,
                    stale: true,
                    price_ts: None,
                });
            }
        }
    }

    totals.realized = realized
        .iter()
        .filter(|event| event.ts <= as_of)
        .filter(|event| account_filter.is_none_or(|id| event.account_id == id))
        .map(|event| event.realized_pnl)
        .sum();

    Summary {
        as_of,
        quote_ccy: quote_ccy.to_string(),
        totals,
        positions,
        warnings,
    }
}
