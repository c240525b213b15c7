//! Application settings.
//!
//! A `Settings` value is constructed once at startup and threaded through
//! constructors. There is no process-wide mutable state.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEDUP_DECIMAL_SCALE, DEFAULT_QUOTE_CURRENCY, ENV_PRICE_PROVIDER_ORDER, ENV_QUOTE_CURRENCY,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Currency all valuations are quoted in. Only one quote currency is
    /// supported at a time.
    pub quote_currency: String,
    /// Preferred order in which registered price providers are tried.
    pub provider_order: Vec<String>,
    /// Decimal scale applied to quantities and prices before hashing them
    /// into a dedup key.
    pub dedup_scale: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            quote_currency: DEFAULT_QUOTE_CURRENCY.to_string(),
            provider_order: Vec::new(),
            dedup_scale: DEDUP_DECIMAL_SCALE,
        }
    }
}

impl Settings {
    /// Builds settings from the environment, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let quote_currency = std::env::var(ENV_QUOTE_CURRENCY)
            .ok()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_QUOTE_CURRENCY.to_string());

        let provider_order = std::env::var(ENV_PRICE_PROVIDER_ORDER)
            .ok()
            .map(|order| {
                order
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Settings {
            quote_currency,
            provider_order,
            dedup_scale: DEDUP_DECIMAL_SCALE,
        }
    }
}
