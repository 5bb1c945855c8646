use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::ContentProvider;
use crate::TroveError;

/// Keyed set of registered providers: id to adapter.
///
/// Registration is last-write-wins on duplicate ids. Enumeration order is
/// unspecified; callers needing determinism must sort.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn ContentProvider>>,
}

impl ProviderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own id, replacing any previous
    /// registration with the same id.
    pub fn register(&mut self, provider: Arc<dyn ContentProvider>) {
        self.providers.insert(provider.provider_id(), provider);
    }

    /// Look up a provider by id.
    ///
    /// # Errors
    /// Returns [`TroveError::NotFound`] when no provider uses this id.
    pub fn get(&self, provider_id: &str) -> Result<Arc<dyn ContentProvider>, TroveError> {
        self.providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| TroveError::not_found(format!("provider {provider_id}")))
    }

    /// All registered providers, in unspecified order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn ContentProvider>> {
        self.providers.values().cloned().collect()
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use trove_types::ProviderItem;

    use super::*;
    use crate::provider::RateLimit;

    #[derive(Debug)]
    struct Stub(&'static str);

    #[async_trait]
    impl ContentProvider for Stub {
        fn provider_id(&self) -> &'static str {
            self.0
        }
        fn rate_limit(&self) -> RateLimit {
            RateLimit::per_minute(10)
        }
        async fn fetch_contents(&self) -> Result<Vec<ProviderItem>, TroveError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn lookup_and_enumeration() {
        let mut reg = ProviderRegistry::new();
        assert!(reg.is_empty());
        reg.register(Arc::new(Stub("a")));
        reg.register(Arc::new(Stub("b")));

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("a").unwrap().provider_id(), "a");
        assert!(reg.get("missing").unwrap_err().is_not_found());
        assert_eq!(reg.all().len(), 2);
    }

    #[test]
    fn duplicate_registration_is_last_write_wins() {
        #[derive(Debug)]
        struct Counting(&'static str, u32);

        #[async_trait]
        impl ContentProvider for Counting {
            fn provider_id(&self) -> &'static str {
                self.0
            }
            fn rate_limit(&self) -> RateLimit {
                RateLimit::per_minute(self.1)
            }
            async fn fetch_contents(&self) -> Result<Vec<ProviderItem>, TroveError> {
                Ok(Vec::new())
            }
        }

        let mut reg = ProviderRegistry::new();
        reg.register(Arc::new(Counting("a", 1)));
        reg.register(Arc::new(Counting("a", 2)));

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("a").unwrap().rate_limit().requests_per_minute, 2);
    }
}
