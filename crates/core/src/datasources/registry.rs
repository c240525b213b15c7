//! Datasource registry.
//!
//! Built once at startup from the configured settings and passed by
//! reference into whatever needs a provider. There is no ambient global
//! lookup.

use std::collections::HashMap;
use std::sync::Arc;

use super::datasources_traits::{ImportSource, PriceProvider};
use crate::settings::Settings;

#[derive(Default)]
pub struct DatasourceRegistry {
    price_providers: HashMap<&'static str, Arc<dyn PriceProvider>>,
    import_sources: HashMap<&'static str, Arc<dyn ImportSource>>,
    provider_order: Vec<String>,
}

impl DatasourceRegistry {
    pub fn new(settings: &Settings) -> Self {
        Self {
            price_providers: HashMap::new(),
            import_sources: HashMap::new(),
            provider_order: settings.provider_order.clone(),
        }
    }

    pub fn register_price_provider(&mut self, provider: Arc<dyn PriceProvider>) {
        self.price_providers.insert(provider.id(), provider);
    }

    pub fn register_import_source(&mut self, source: Arc<dyn ImportSource>) {
        self.import_sources.insert(source.id(), source);
    }

    pub fn price_provider(&self, id: &str) -> Option<Arc<dyn PriceProvider>> {
        self.price_providers.get(id).cloned()
    }

    pub fn import_source(&self, id: &str) -> Option<Arc<dyn ImportSource>> {
        self.import_sources.get(id).cloned()
    }

    /// Registered providers in preference order: the explicitly preferred one
    /// first, then the configured order, skipping unknown names.
    pub fn price_providers_in_order(
        &self,
        preferred: Option<&str>,
    ) -> Vec<Arc<dyn PriceProvider>> {
        let mut seen: Vec<&str> = Vec::new();
        let mut ordered: Vec<Arc<dyn PriceProvider>> = Vec::new();

        let names = preferred
            .into_iter()
            .map(str::to_string)
            .chain(self.provider_order.iter().cloned());
        for name in names {
            if seen.contains(&name.as_str()) {
                continue;
            }
            if let Some(provider) = self.price_providers.get(name.as_str()) {
                seen.push(provider.id());
                ordered.push(Arc::clone(provider));
            }
        }
        ordered
    }

    pub fn import_source_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.import_sources.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
