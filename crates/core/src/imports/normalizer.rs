//! Import normalizer / deduplicator.
//!
//! Turns raw external rows into validated canonical transactions. Row-level
//! failures are recorded and skipped; nothing short of an invalid column
//! mapping aborts a batch. Persistence of the accepted transactions is the
//! caller's responsibility.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;

use super::dedup::{compute_dedup_key, DedupIndex};
use super::import_model::{
    CanonicalField, ColumnMapping, ImportBatch, ImportOutcome, NormalizeOptions, ResolvedMapping,
};
use crate::errors::{ImportError, Result};
use crate::transactions::{Transaction, TxSide};

/// Normalizes raw rows into accepted transactions and per-row rejections.
///
/// On a dry run the same validation and dedup checks execute, but no dedup
/// key is claimed and `accepted` stays empty; only the counts come back.
pub fn normalize(
    headers: &[String],
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
    batch: &ImportBatch,
    index: &dyn DedupIndex,
    options: &NormalizeOptions,
) -> Result<ImportOutcome> {
    let resolved = mapping.resolve(headers)?;

    let mut outcome = ImportOutcome::default();
    // Keys seen inside this batch; catches repeats before the index does.
    let mut seen: HashSet<String> = HashSet::new();

    for (row_idx, row) in rows.iter().enumerate() {
        let tx = match parse_row(&resolved, row, row_idx, batch, options) {
            Ok(tx) => tx,
            Err(err) => {
                warn!("import row {} rejected: {}", row_idx, err);
                match err {
                    ImportError::Parse { .. } => outcome.summary.parse_errors += 1,
                    _ => outcome.summary.validation_errors += 1,
                }
                outcome.rejected.push(err);
                continue;
            }
        };

        let key = compute_dedup_key(&tx, options.dedup_scale);
        let duplicate = if seen.contains(&key) {
            true
        } else if options.dry_run {
            index.contains(&key)?
        } else {
            !index.claim(&key)?
        };

        if duplicate {
            debug!("import row {} is a duplicate (key {})", row_idx, key);
            outcome.summary.duplicates += 1;
            outcome.rejected.push(ImportError::Duplicate { row: row_idx, key });
            continue;
        }
        seen.insert(key);

        outcome.summary.accepted += 1;
        if !options.dry_run {
            outcome.accepted.push(tx);
        }
    }

    Ok(outcome)
}

/// Parses one raw row into a transaction candidate and validates it.
fn parse_row(
    mapping: &ResolvedMapping,
    row: &[String],
    row_idx: usize,
    batch: &ImportBatch,
    options: &NormalizeOptions,
) -> std::result::Result<Transaction, ImportError> {
    let ts = parse_timestamp(require(mapping, row, row_idx, CanonicalField::Timestamp)?)
        .map_err(|value| parse_error(row_idx, CanonicalField::Timestamp, value))?;

    let account_raw = require(mapping, row, row_idx, CanonicalField::Account)?;
    let account_id: i64 = account_raw
        .parse()
        .map_err(|_| parse_error(row_idx, CanonicalField::Account, account_raw))?;

    let asset_symbol = require(mapping, row, row_idx, CanonicalField::Asset)?.to_uppercase();

    let side_raw = require(mapping, row, row_idx, CanonicalField::Side)?;
    let side = TxSide::from_str(side_raw)
        .map_err(|_| parse_error(row_idx, CanonicalField::Side, side_raw))?;

    let qty = parse_decimal(mapping, row, row_idx, CanonicalField::Qty)?
        .ok_or_else(|| missing(row_idx, CanonicalField::Qty))?;
    let price_quote = parse_decimal(mapping, row, row_idx, CanonicalField::PriceQuote)?;
    let fee_qty = parse_decimal(mapping, row, row_idx, CanonicalField::FeeQty)?;

    let quote_ccy = mapping
        .cell(row, CanonicalField::QuoteCcy)
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| options.default_quote_ccy.clone());

    let tx = Transaction {
        // Provisional order within the batch; the ledger store assigns the
        // persistent sequence on insert.
        sequence_id: row_idx as i64,
        ts,
        account_id,
        asset_symbol,
        side,
        qty,
        price_quote,
        total_quote: None,
        quote_ccy,
        fee_qty,
        fee_asset: mapping
            .cell(row, CanonicalField::FeeAsset)
            .map(str::to_string),
        note: mapping.cell(row, CanonicalField::Note).map(str::to_string),
        tags: mapping.cell(row, CanonicalField::Tags).map(str::to_string),
        external_id: mapping
            .cell(row, CanonicalField::ExternalId)
            .map(str::to_string),
        datasource: batch.datasource.clone(),
        import_batch_id: Some(batch.id),
    };

    tx.validate().map_err(|e| ImportError::Invalid {
        row: row_idx,
        message: e.to_string(),
    })?;

    Ok(tx)
}

fn require<'a>(
    mapping: &ResolvedMapping,
    row: &'a [String],
    row_idx: usize,
    field: CanonicalField,
) -> std::result::Result<&'a str, ImportError> {
    mapping.cell(row, field).ok_or_else(|| missing(row_idx, field))
}

fn parse_decimal(
    mapping: &ResolvedMapping,
    row: &[String],
    row_idx: usize,
    field: CanonicalField,
) -> std::result::Result<Option<Decimal>, ImportError> {
    match mapping.cell(row, field) {
        Some(raw) => Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map(Some)
            .map_err(|_| parse_error(row_idx, field, raw)),
        None => Ok(None),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, or a bare
/// date (midnight UTC).
fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, &str> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(raw)
}

fn parse_error(row: usize, field: CanonicalField, value: &str) -> ImportError {
    ImportError::Parse {
        row,
        field: field.name().to_string(),
        value: value.to_string(),
    }
}

fn missing(row: usize, field: CanonicalField) -> ImportError {
    ImportError::Invalid {
        row,
        message: format!("required field '{}' is empty", field.name()),
    }
}
