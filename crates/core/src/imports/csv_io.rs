//! CSV ingestion and export for the canonical transaction schema.
//!
//! The canonical schema is
//! `timestamp, account, asset, side, qty, price_quote, quote_ccy, fee_qty,
//! fee_asset, note, tags`; exporting what was imported reproduces the
//! original rows exactly.

use chrono::SecondsFormat;
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;

use super::dedup::DedupIndex;
use super::import_model::{ColumnMapping, ImportBatch, ImportOutcome, NormalizeOptions};
use super::normalizer::normalize;
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::Transaction;

/// Canonical export column order.
const CANONICAL_HEADERS: [&str; 11] = [
    "timestamp",
    "account",
    "asset",
    "side",
    "qty",
    "price_quote",
    "quote_ccy",
    "fee_qty",
    "fee_asset",
    "note",
    "tags",
];

/// Reads CSV bytes into a header row and data rows.
///
/// Tolerates a UTF-8 BOM and ragged rows; the mapping validation downstream
/// decides what is actually usable.
pub fn read_csv(content: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let content = strip_bom(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if headers.is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "CSV file has no header row".to_string(),
        )));
    }
    Ok((headers, rows))
}

/// Parses, normalizes, and dedup-checks a CSV payload in one call.
pub fn import_csv(
    content: &[u8],
    mapping: &ColumnMapping,
    batch: &ImportBatch,
    index: &dyn DedupIndex,
    options: &NormalizeOptions,
) -> Result<ImportOutcome> {
    let (headers, rows) = read_csv(content)?;
    normalize(&headers, &rows, mapping, batch, index, options)
}

/// Writes transactions as canonical CSV, ordered by `(ts, sequence_id)`.
pub fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.replay_key());

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CANONICAL_HEADERS)?;

    for tx in ordered {
        writer.write_record([
            // AutoSi keeps sub-second digits only when present, so
            // whole-second rows stay `...T00:00:00Z`.
            tx.ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            tx.account_id.to_string(),
            tx.asset_symbol.clone(),
            tx.side.as_str().to_string(),
            tx.qty.to_string(),
            format_optional_decimal(tx.price_quote),
            tx.quote_ccy.clone(),
            format_optional_decimal(tx.fee_qty),
            tx.fee_asset.clone().unwrap_or_default(),
            tx.note.clone().unwrap_or_default(),
            tx.tags.clone().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Unexpected(e.to_string()))
}

fn format_optional_decimal(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn strip_bom(content: &[u8]) -> &[u8] {
    content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content)
}
