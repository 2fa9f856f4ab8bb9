//! Fan-out over a priority-scoped source and a global source

use crate::lookup::{LookupError, LookupResult, SourceFetcher};
use crate::results::{merge_ranked, Suggestion};
use async_trait::async_trait;
use futures::future::join;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Queries a scoped and an unscoped source concurrently and merges them.
///
/// Scoped results go first so they win duplicate labels; the merged list is
/// then ranked by score. One failing source contributes nothing, both failing
/// is a failure.
pub struct DualSource<F> {
    scoped: F,
    global: F,
    name: String,
}

impl<F> DualSource<F>
where
    F: SourceFetcher<Output = Vec<Suggestion>>,
{
    pub fn new(scoped: F, global: F) -> Self {
        let name = format!("{}+{}", scoped.name(), global.name());
        Self {
            scoped,
            global,
            name,
        }
    }
}

#[async_trait]
impl<F> SourceFetcher for DualSource<F>
where
    F: SourceFetcher<Output = Vec<Suggestion>>,
{
    type Output = Vec<Suggestion>;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.scoped.is_available() || self.global.is_available()
    }

    async fn fetch(&self, query: &str, cancel: &CancellationToken) -> LookupResult<Vec<Suggestion>> {
        let (scoped, global) = join(
            self.scoped.fetch(query, cancel),
            self.global.fetch(query, cancel),
        )
        .await;

        if cancel.is_cancelled() {
            return Err(LookupError::Cancelled);
        }

        let (scoped, global) = match (scoped, global) {
            (Err(scoped_err), Err(global_err)) => {
                debug!("{} scoped source failed: {}", self.name, scoped_err);
                return Err(global_err);
            }
            (scoped, global) => (
                self.salvage(self.scoped.name(), scoped),
                self.salvage(self.global.name(), global),
            ),
        };

        Ok(merge_ranked(scoped, global))
    }
}

impl<F> DualSource<F>
where
    F: SourceFetcher<Output = Vec<Suggestion>>,
{
    fn salvage(&self, source: &str, result: LookupResult<Vec<Suggestion>>) -> Vec<Suggestion> {
        result.unwrap_or_else(|err| {
            warn!("{} source {} failed: {}", self.name, source, err);
            Vec::new()
        })
    }
}
