//! Imports module - normalization, deduplication, and CSV boundary.

mod csv_io;
mod dedup;
mod import_model;
mod normalizer;

#[cfg(test)]
mod normalizer_tests;

pub use csv_io::{import_csv, read_csv, write_csv};
pub use dedup::{compute_dedup_key, DedupIndex, MemoryDedupIndex};
pub use import_model::{
    CanonicalField, ColumnMapping, ImportBatch, ImportOutcome, ImportSummary, NormalizeOptions,
    ResolvedMapping,
};
pub use normalizer::normalize;
