//! Transaction domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ValidationError;

/// Direction of a ledger entry. Quantity is always positive; the side carries
/// the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxSide {
    Buy,
    Sell,
    TransferIn,
    TransferOut,
    Stake,
    Reward,
    Fee,
}

impl TxSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxSide::Buy => "buy",
            TxSide::Sell => "sell",
            TxSide::TransferIn => "transfer_in",
            TxSide::TransferOut => "transfer_out",
            TxSide::Stake => "stake",
            TxSide::Reward => "reward",
            TxSide::Fee => "fee",
        }
    }

    /// True for sides that open a new cost-basis lot.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            TxSide::Buy | TxSide::TransferIn | TxSide::Stake | TxSide::Reward
        )
    }

    /// True for sides that consume open lots.
    pub fn is_disposal(&self) -> bool {
        matches!(self, TxSide::Sell | TxSide::TransferOut | TxSide::Fee)
    }
}

impl fmt::Display for TxSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxSide {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TxSide::Buy),
            "sell" => Ok(TxSide::Sell),
            "transfer_in" => Ok(TxSide::TransferIn),
            "transfer_out" => Ok(TxSide::TransferOut),
            "stake" => Ok(TxSide::Stake),
            "reward" => Ok(TxSide::Reward),
            "fee" => Ok(TxSide::Fee),
            other => Err(ValidationError::UnknownSide(other.to_string())),
        }
    }
}

/// Immutable ledger entry. Owned by the external ledger store; the valuation
/// core only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Stable total order for same-timestamp ties (insertion order).
    pub sequence_id: i64,
    pub ts: DateTime<Utc>,
    pub account_id: i64,
    pub asset_symbol: String,
    pub side: TxSide,
    pub qty: Decimal,
    #[serde(default)]
    pub price_quote: Option<Decimal>,
    #[serde(default)]
    pub total_quote: Option<Decimal>,
    pub quote_ccy: String,
    #[serde(default)]
    pub fee_qty: Option<Decimal>,
    #[serde(default)]
    pub fee_asset: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub datasource: Option<String>,
    #[serde(default)]
    pub import_batch_id: Option<Uuid>,
}

impl Transaction {
    /// Enforces the structural invariants: strictly positive quantity, and
    /// for buy/sell at least one of price_quote/total_quote.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.qty <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity(self.qty));
        }
        if self.asset_symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("asset".to_string()));
        }
        if matches!(self.side, TxSide::Buy | TxSide::Sell)
            && self.price_quote.is_none()
            && self.total_quote.is_none()
        {
            return Err(ValidationError::MissingPriceOrTotal(self.sequence_id));
        }
        Ok(())
    }

    /// Total in quote currency: `total_quote` if given, else price x qty,
    /// else None.
    pub fn effective_total(&self) -> Option<Decimal> {
        self.total_quote
            .or_else(|| self.price_quote.map(|p| p * self.qty))
    }

    /// Price per unit in quote currency: `price_quote` if given, else
    /// total / qty, else None.
    pub fn effective_price(&self) -> Option<Decimal> {
        self.price_quote.or_else(|| {
            self.total_quote
                .filter(|_| !self.qty.is_zero())
                .map(|t| t / self.qty)
        })
    }

    /// Sort key giving the deterministic replay order.
    pub fn replay_key(&self) -> (DateTime<Utc>, i64) {
        (self.ts, self.sequence_id)
    }
}

/// Filter for listing transactions from the ledger store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxFilter {
    pub account_id: Option<i64>,
    pub asset_symbol: Option<String>,
    pub side: Option<TxSide>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TxFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(account_id) = self.account_id {
            if tx.account_id != account_id {
                return false;
            }
        }
        if let Some(ref asset) = self.asset_symbol {
            if &tx.asset_symbol != asset {
                return false;
            }
        }
        if let Some(side) = self.side {
            if tx.side != side {
                return false;
            }
        }
        if let Some(since) = self.since {
            if tx.ts < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if tx.ts > until {
                return false;
            }
        }
        true
    }
}
