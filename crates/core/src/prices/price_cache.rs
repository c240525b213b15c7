//! Idempotent point-in-time price cache.
//!
//! One sorted series per (asset, quote currency) key, behind a `DashMap` so
//! concurrent syncs for different keys proceed independently. Writes for the
//! same key are last-write-wins, which makes periodic provider re-syncs safe
//! to repeat.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;

use super::price_model::{PriceKey, PricePoint, UpsertResult};
use crate::errors::{PriceError, Result, ValidationError};

#[derive(Debug, Default)]
pub struct PriceCache {
    // Each value is kept sorted by timestamp ascending.
    series: DashMap<PriceKey, Vec<PricePoint>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the point for its `(asset, quote_ccy, ts)` key.
    ///
    /// A later write for an existing key overwrites the stored price
    /// (last committed wins); there is never more than one point per key.
    pub fn upsert(&self, point: PricePoint) -> Result<UpsertResult> {
        if point.price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(point.price).into());
        }

        let mut entry = self.series.entry(point.key()).or_default();
        let series = entry.value_mut();
        match series.binary_search_by_key(&point.ts, |p| p.ts) {
            Ok(pos) => {
                debug!(
                    "overwriting price {}/{} at {}",
                    point.asset_symbol, point.quote_ccy, point.ts
                );
                series[pos] = point;
                Ok(UpsertResult::Updated)
            }
            Err(pos) => {
                series.insert(pos, point);
                Ok(UpsertResult::Inserted)
            }
        }
    }

    /// Upserts a batch of points (e.g. an OHLCV backfill). Returns how many
    /// were newly inserted.
    pub fn upsert_many(&self, points: Vec<PricePoint>) -> Result<usize> {
        let mut inserted = 0;
        for point in points {
            if self.upsert(point)? == UpsertResult::Inserted {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Returns the most recent point with `ts <= as_of`. Never returns a
    /// future point, so valuations carry no look-ahead bias.
    pub fn last_price_at_or_before(
        &self,
        asset_symbol: &str,
        quote_ccy: &str,
        as_of: DateTime<Utc>,
    ) -> Result<PricePoint> {
        let key = PriceKey::new(asset_symbol, quote_ccy);
        let not_found = || PriceError::NotFound {
            asset_symbol: asset_symbol.to_string(),
            quote_ccy: quote_ccy.to_string(),
            as_of,
        };

        let series = self.series.get(&key).ok_or_else(not_found)?;
        let idx = series.partition_point(|p| p.ts <= as_of);
        if idx == 0 {
            return Err(not_found().into());
        }
        Ok(series[idx - 1].clone())
    }

    /// Number of cached points across all keys.
    pub fn len(&self) -> usize {
        self.series.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
