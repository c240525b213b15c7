//! Prices module - point-in-time price cache.

mod price_cache;
mod price_model;


pub use price_cache::PriceCache;
pub use price_model::{Interval, PriceKey, PricePoint, UpsertResult};
