/// Default quote currency when none is configured.
pub const DEFAULT_QUOTE_CURRENCY: &str = "USD";

/// Decimal scale used when hashing quantities and prices into dedup keys.
pub const DEDUP_DECIMAL_SCALE: u32 = 8;

/// Environment variable overriding the configured quote currency.
pub const ENV_QUOTE_CURRENCY: &str = "WEALTH_QUOTE_CURRENCY";

/// Environment variable overriding the price provider order.
pub const ENV_PRICE_PROVIDER_ORDER: &str = "WEALTH_PRICE_PROVIDER_ORDER";
