//! FIFO lot matcher.
//!
//! Replays a transaction history into open cost-basis lots and realized
//! profit-and-loss events. The replay is a pure function of its input: it
//! holds no cross-call state, reads no clock, and the output depends only on
//! the `(ts, sequence_id)` order, which it establishes itself.

use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

use super::lots_model::{Lot, RealizedEvent, Replay};
use crate::errors::{ReplayError, Result};
use crate::transactions::{Transaction, TxSide};

/// Scope key: lots never cross an (account, asset) boundary.
type ScopeKey = (i64, String);

/// Replays transactions into open lots and realized events.
///
/// Input order does not matter; transactions are sorted by
/// `(ts, sequence_id)` before processing, so any externally-given order
/// yields identical lot splitting.
///
/// Disposing more quantity than the scope has open is a hard
/// [`ReplayError::InsufficientLots`]; it signals a missing acquisition
/// upstream. No partial event is emitted for the failing transaction.
pub fn replay(transactions: &[Transaction]) -> Result<Replay> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.replay_key());

    let mut open: BTreeMap<ScopeKey, VecDeque<Lot>> = BTreeMap::new();
    let mut realized: Vec<RealizedEvent> = Vec::new();

    for tx in ordered {
        let scope = (tx.account_id, tx.asset_symbol.clone());
        match tx.side {
            TxSide::Buy | TxSide::TransferIn | TxSide::Stake | TxSide::Reward => {
                let lot = open_lot(tx);
                open.entry(scope).or_default().push_back(lot);
            }
            TxSide::Sell | TxSide::TransferOut | TxSide::Fee => {
                let lots = open.entry(scope).or_default();
                let cost_consumed = consume_fifo(lots, tx)?;

                match tx.side {
                    TxSide::Sell => {
                        let proceeds = tx.effective_total().unwrap_or(Decimal::ZERO);
                        realized.push(RealizedEvent {
                            ts: tx.ts,
                            asset_symbol: tx.asset_symbol.clone(),
                            account_id: tx.account_id,
                            proceeds,
                            cost_consumed,
                            realized_pnl: proceeds - cost_consumed,
                        });
                    }
                    TxSide::Fee => {
                        // A fee consumes quantity with zero proceeds; its
                        // consumed cost is a pure realized loss.
                        realized.push(RealizedEvent {
                            ts: tx.ts,
                            asset_symbol: tx.asset_symbol.clone(),
                            account_id: tx.account_id,
                            proceeds: Decimal::ZERO,
                            cost_consumed,
                            realized_pnl: -cost_consumed,
                        });
                    }
                    // Transfer-out moves cost basis elsewhere without
                    // crystallizing a gain or loss.
                    _ => {}
                }
            }
        }
    }

    let open_lots: Vec<Lot> = open.into_values().flatten().collect();
    debug!(
        "replay complete: {} open lots, {} realized events",
        open_lots.len(),
        realized.len()
    );

    Ok(Replay {
        open_lots,
        realized,
    })
}

/// Opens a lot for an acquisition transaction.
///
/// Rewards and stakes without a recorded price become zero-cost-basis lots
/// (fully taxable on later sale). Untracked transfer-ins do too.
fn open_lot(tx: &Transaction) -> Lot {
    let cost_per_unit = match tx.side {
        TxSide::Buy | TxSide::TransferIn => tx
            .total_quote
            .filter(|_| !tx.qty.is_zero())
            .map(|total| total / tx.qty)
            .or(tx.price_quote)
            .unwrap_or(Decimal::ZERO),
        _ => tx.price_quote.unwrap_or(Decimal::ZERO),
    };

    Lot {
        asset_symbol: tx.asset_symbol.clone(),
        account_id: tx.account_id,
        remaining_qty: tx.qty,
        cost_per_unit,
        opened_at: tx.ts,
        sequence_id: tx.sequence_id,
    }
}

/// Consumes `tx.qty` from the scope's lots oldest-first and returns the cost
/// basis consumed. A partially consumed lot is split in place: its quantity
/// shrinks, its cost per unit never changes.
fn consume_fifo(lots: &mut VecDeque<Lot>, tx: &Transaction) -> Result<Decimal> {
    let available: Decimal = lots.iter().map(|lot| lot.remaining_qty).sum();
    if available < tx.qty {
        return Err(ReplayError::InsufficientLots {
            asset_symbol: tx.asset_symbol.clone(),
            account_id: tx.account_id,
            requested: tx.qty,
            available,
        }
        .into());
    }

    let mut to_consume = tx.qty;
    let mut cost_consumed = Decimal::ZERO;

    while to_consume > Decimal::ZERO {
        let mut lot = match lots.pop_front() {
            Some(lot) => lot,
            // Unreachable: availability was checked above.
            None => break,
        };

        let taken = lot.remaining_qty.min(to_consume);
        cost_consumed += taken * lot.cost_per_unit;
        to_consume -= taken;
        lot.remaining_qty -= taken;

        if lot.remaining_qty > Decimal::ZERO {
            lots.push_front(lot);
        }
    }

    Ok(cost_consumed)
}
