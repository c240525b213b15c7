//! Import domain models: column mapping, batches, and per-row outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::constants::DEFAULT_QUOTE_CURRENCY;
use crate::errors::ImportError;
use crate::settings::Settings;
use crate::transactions::Transaction;

/// Canonical fields an import row can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Timestamp,
    Account,
    Asset,
    Side,
    Qty,
    PriceQuote,
    QuoteCcy,
    FeeQty,
    FeeAsset,
    Note,
    Tags,
    ExternalId,
}

impl CanonicalField {
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Timestamp => "timestamp",
            CanonicalField::Account => "account",
            CanonicalField::Asset => "asset",
            CanonicalField::Side => "side",
            CanonicalField::Qty => "qty",
            CanonicalField::PriceQuote => "price_quote",
            CanonicalField::QuoteCcy => "quote_ccy",
            CanonicalField::FeeQty => "fee_qty",
            CanonicalField::FeeAsset => "fee_asset",
            CanonicalField::Note => "note",
            CanonicalField::Tags => "tags",
            CanonicalField::ExternalId => "external_id",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            CanonicalField::Timestamp
                | CanonicalField::Account
                | CanonicalField::Asset
                | CanonicalField::Side
                | CanonicalField::Qty
        )
    }

    /// All fields, in canonical CSV column order.
    pub const ALL: [CanonicalField; 12] = [
        CanonicalField::Timestamp,
        CanonicalField::Account,
        CanonicalField::Asset,
        CanonicalField::Side,
        CanonicalField::Qty,
        CanonicalField::PriceQuote,
        CanonicalField::QuoteCcy,
        CanonicalField::FeeQty,
        CanonicalField::FeeAsset,
        CanonicalField::Note,
        CanonicalField::Tags,
        CanonicalField::ExternalId,
    ];
}

/// Explicit column-name to canonical-field mapping, validated against the
/// actual CSV headers before any row is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    /// Canonical field -> source column name.
    pub columns: HashMap<CanonicalField, String>,
}

impl ColumnMapping {
    /// Identity mapping over the canonical header set.
    pub fn canonical() -> Self {
        let columns = CanonicalField::ALL
            .iter()
            .map(|f| (*f, f.name().to_string()))
            .collect();
        Self { columns }
    }

    /// Resolves the mapping against a concrete header row.
    ///
    /// Fails up front if a required field is unmapped or its mapped column
    /// does not exist, rather than failing mid-row later.
    pub fn resolve(
        &self,
        headers: &[String],
    ) -> std::result::Result<ResolvedMapping, ImportError> {
        let mut indices = HashMap::new();
        for field in CanonicalField::ALL {
            match self.columns.get(&field) {
                Some(column) => match headers.iter().position(|h| h == column) {
                    Some(idx) => {
                        indices.insert(field, idx);
                    }
                    None if field.is_required() => {
                        return Err(ImportError::MappingInvalid(format!(
                            "required field '{}' maps to missing column '{}'",
                            field.name(),
                            column
                        )));
                    }
                    None => {}
                },
                None if field.is_required() => {
                    return Err(ImportError::MappingInvalid(format!(
                        "required field '{}' is unmapped",
                        field.name()
                    )));
                }
                None => {}
            }
        }
        Ok(ResolvedMapping { indices })
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::canonical()
    }
}

/// A mapping bound to a concrete header row: canonical field -> column index.
#[derive(Debug, Clone)]
pub struct ResolvedMapping {
    indices: HashMap<CanonicalField, usize>,
}

impl ResolvedMapping {
    /// The trimmed cell for a field, `None` when unmapped or empty.
    pub fn cell<'a>(&self, row: &'a [String], field: CanonicalField) -> Option<&'a str> {
        self.indices
            .get(&field)
            .and_then(|&idx| row.get(idx))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Groups the rows of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub id: Uuid,
    /// Datasource id scoping external ids in dedup keys.
    pub datasource: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl ImportBatch {
    pub fn new(datasource: Option<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            datasource,
            started_at,
        }
    }
}

/// Knobs for one normalize call.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Validate and dedup-check without claiming keys or emitting accepted
    /// transactions; only the counts are reported.
    pub dry_run: bool,
    /// Quote currency assumed when a row does not carry one.
    pub default_quote_ccy: String,
    /// Decimal scale applied when hashing dedup keys.
    pub dedup_scale: u32,
}

impl NormalizeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dry_run: false,
            default_quote_ccy: settings.quote_currency.clone(),
            dedup_scale: settings.dedup_scale,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            default_quote_ccy: DEFAULT_QUOTE_CURRENCY.to_string(),
            dedup_scale: crate::constants::DEDUP_DECIMAL_SCALE,
        }
    }
}

/// Per-row outcome counts reported back to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub accepted: usize,
    pub parse_errors: usize,
    pub validation_errors: usize,
    pub duplicates: usize,
}

/// Result of normalizing one batch of raw rows.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Canonical transactions ready for persistence. Empty on dry runs.
    pub accepted: Vec<Transaction>,
    /// Row-level failures, in row order.
    pub rejected: Vec<ImportError>,
    pub summary: ImportSummary,
}
