//! Lookup coordinator: gate, cache, fetch

use super::session::LookupSession;
use super::{LookupError, LookupResult, LookupValue, SourceFetcher};
use crate::cache::CacheStore;
use crate::config::LookupSettings;
use crate::query::{LookupQuery, DEFAULT_MIN_QUERY_LEN};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Receives the results of a session's queries
pub type Callback<V> = Arc<dyn Fn(V) + Send + Sync>;

/// Scheduling options for one lookup kind
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Quiet window before a session dispatches a query
    pub debounce: Duration,
    /// Shorter queries resolve empty without any lookup
    pub min_query_len: usize,
    /// Deliver a cache hit provisionally and fetch anyway
    pub revalidate_on_hit: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(crate::DEFAULT_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            revalidate_on_hit: false,
        }
    }
}

impl From<&LookupSettings> for LookupOptions {
    fn from(settings: &LookupSettings) -> Self {
        Self {
            debounce: settings.debounce(),
            min_query_len: settings.min_query_len,
            revalidate_on_hit: settings.revalidate_on_hit,
        }
    }
}

struct LookupInner<F: SourceFetcher> {
    fetcher: F,
    cache: Arc<CacheStore<F::Output>>,
    options: LookupOptions,
}

/// A source fetcher together with its cache and options.
///
/// Cloning is cheap and shares the cache. Sessions opened from the same
/// lookup share results but never scheduler state.
pub struct Lookup<F: SourceFetcher> {
    inner: Arc<LookupInner<F>>,
}

impl<F: SourceFetcher> Clone for Lookup<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: SourceFetcher> Lookup<F> {
    /// Create a lookup over an existing (possibly shared) cache
    pub fn new(fetcher: F, cache: Arc<CacheStore<F::Output>>, options: LookupOptions) -> Self {
        Self {
            inner: Arc::new(LookupInner {
                fetcher,
                cache,
                options,
            }),
        }
    }

    /// Create a lookup with its own cache sized from settings
    pub fn from_settings(fetcher: F, settings: &LookupSettings) -> Self {
        let cache = Arc::new(CacheStore::new(settings.capacity, settings.ttl()));
        Self::new(fetcher, cache, LookupOptions::from(settings))
    }

    pub fn cache(&self) -> &Arc<CacheStore<F::Output>> {
        &self.inner.cache
    }

    pub fn options(&self) -> &LookupOptions {
        &self.inner.options
    }

    /// False when the provider credential is missing; lookups then resolve empty
    pub fn is_available(&self) -> bool {
        self.inner.fetcher.is_available()
    }

    /// Open a debounced session delivering results to `on_results`
    pub fn session<C>(&self, on_results: C) -> LookupSession<F>
    where
        C: Fn(F::Output) + Send + Sync + 'static,
    {
        LookupSession::new(self.clone(), Arc::new(on_results))
    }

    /// Resolve a query immediately, without debouncing.
    ///
    /// Gate, then cache, then one fetch whose successful result is cached.
    /// Never fails: any problem yields the empty value.
    pub async fn resolve(&self, raw: &str) -> F::Output {
        let Some(query) = LookupQuery::parse(raw, self.inner.options.min_query_len) else {
            return F::Output::empty();
        };

        if !self.is_available() {
            debug!("{} unavailable, skipping '{}'", self.name(), query.key);
            return F::Output::empty();
        }

        if let Some(hit) = self.cached(&query.key) {
            return hit;
        }

        let cancel = CancellationToken::new();
        match self.fetch(&query.key, &cancel).await {
            Ok(value) => {
                self.store(&query.key, &value);
                value
            }
            Err(err) => {
                self.report(&query.key, &err);
                F::Output::empty()
            }
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.inner.fetcher.name()
    }

    pub(crate) fn cached(&self, key: &str) -> Option<F::Output> {
        let hit = self.inner.cache.get(key);
        debug!(
            "{} cache {} for '{}'",
            self.name(),
            if hit.is_some() { "hit" } else { "miss" },
            key
        );
        hit
    }

    pub(crate) async fn fetch(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> LookupResult<F::Output> {
        debug!("{} fetching '{}'", self.name(), key);
        self.inner.fetcher.fetch(key, cancel).await
    }

    /// Cache a successful result; empty results are not remembered
    pub(crate) fn store(&self, key: &str, value: &F::Output) {
        if !value.is_empty() {
            self.inner.cache.put(key, value.clone());
        }
    }

    /// Log a failed attempt; cancellations and transport failures are warnings
    pub(crate) fn report(&self, key: &str, err: &LookupError) {
        if err.is_cancelled() {
            warn!("{} lookup for '{}' cancelled", self.name(), key);
        } else if err.is_transport_failure() {
            warn!("{} lookup for '{}' failed: {}", self.name(), key, err);
        } else {
            debug!("{} lookup for '{}' skipped: {}", self.name(), key, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::testing::FakeSource;

    fn lookup(source: FakeSource) -> Lookup<FakeSource> {
        let cache = Arc::new(CacheStore::new(10, Duration::from_secs(60)));
        Lookup::new(source, cache, LookupOptions::default())
    }

    #[tokio::test]
    async fn test_resolve_caches_success() {
        let source = FakeSource::new();
        let calls = source.calls();
        let lookup = lookup(source);

        let first = lookup.resolve(" Paris ").await;
        let second = lookup.resolve("paris").await;

        assert_eq!(first, vec!["result:paris".to_string()]);
        assert_eq!(first, second);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_gate_skips_everything() {
        let source = FakeSource::new();
        let calls = source.calls();
        let lookup = lookup(source);

        assert!(lookup.resolve("p").await.is_empty());
        assert!(lookup.resolve("   ").await.is_empty());
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(lookup.cache().stats().misses, 0);
    }

    #[tokio::test]
    async fn test_resolve_unavailable() {
        let source = FakeSource::new().unavailable();
        let calls = source.calls();
        let lookup = lookup(source);

        assert!(lookup.resolve("paris").await.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let source = FakeSource::new().failing_first(1);
        let calls = source.calls();
        let lookup = lookup(source);

        assert!(lookup.resolve("paris").await.is_empty());
        assert!(!lookup.cache().contains("paris"));

        assert_eq!(lookup.resolve("paris").await, vec!["result:paris".to_string()]);
        assert!(lookup.cache().contains("paris"));
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_cached() {
        let lookup = lookup(FakeSource::new().returning_nothing());

        assert!(lookup.resolve("atlantis").await.is_empty());
        assert!(lookup.cache().is_empty());
    }
}
