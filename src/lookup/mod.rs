//! Lookup coordination
//!
//! A [`Lookup`] pairs one source fetcher with a cache store and the tuning for
//! its lookup kind. Callers either resolve a query directly or open a
//! [`LookupSession`], which debounces input and keeps at most one request in
//! flight.

mod coordinator;
mod error;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{Callback, Lookup, LookupOptions};
pub use error::{LookupError, LookupResult};
pub use session::{LookupSession, SessionPhase};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Values a lookup can produce and cache
pub trait LookupValue: Clone + Send + Sync + 'static {
    /// The "nothing found" value delivered on any failure
    fn empty() -> Self;

    /// Empty values are never cached
    fn is_empty(&self) -> bool;
}

impl<T: Clone + Send + Sync + 'static> LookupValue for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T: Clone + Send + Sync + 'static> LookupValue for Option<T> {
    fn empty() -> Self {
        None
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

/// One network-backed source of lookup results
#[async_trait]
pub trait SourceFetcher: Send + Sync + 'static {
    type Output: LookupValue;

    /// Source name for logs
    fn name(&self) -> &str;

    /// Whether the provider credential is configured
    fn is_available(&self) -> bool {
        true
    }

    /// Perform one round trip for an already normalized query.
    ///
    /// Implementations should stop early with [`LookupError::Cancelled`] once
    /// `cancel` fires.
    async fn fetch(&self, query: &str, cancel: &CancellationToken) -> LookupResult<Self::Output>;
}
