//! Datasources module - capability traits and the provider registry.

mod datasources_traits;
mod registry;

pub use datasources_traits::{ImportSource, PriceProvider};
pub use registry::DatasourceRegistry;
