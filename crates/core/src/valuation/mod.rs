//! Valuation module - point-in-time portfolio summaries.

mod valuation_model;
mod valuation_service;


pub use valuation_model::{Position, Summary, Totals};
pub use valuation_service::summarize;
