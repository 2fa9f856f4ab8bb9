//! Scripted source fetcher for coordinator tests

use super::{LookupError, LookupResult, SourceFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Answers `result:<query>` after a per-query delay.
///
/// Ignores its cancellation token, like a transport that already committed to
/// a response, so stale results reach the coordinator.
pub(crate) struct FakeSource {
    calls: Arc<Mutex<Vec<String>>>,
    delays: HashMap<String, Duration>,
    failures_left: AtomicUsize,
    available: bool,
    empty: bool,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            delays: HashMap::new(),
            failures_left: AtomicUsize::new(0),
            available: true,
            empty: false,
        }
    }

    pub(crate) fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Fail the first `n` fetches with a 500
    pub(crate) fn failing_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub(crate) fn returning_nothing(mut self) -> Self {
        self.empty = true;
        self
    }

    /// Queries fetched so far, in order
    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SourceFetcher for FakeSource {
    type Output = Vec<String>;

    fn name(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn fetch(&self, query: &str, _cancel: &CancellationToken) -> LookupResult<Vec<String>> {
        self.calls.lock().unwrap().push(query.to_string());

        let delay = self
            .delays
            .get(query)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LookupError::Status(500));
        }

        if self.empty {
            return Ok(vec![]);
        }
        Ok(vec![format!("result:{}", query)])
    }
}

/// Callback that records every delivery
pub(crate) fn collector<V: Send + 'static>() -> (Arc<Mutex<Vec<V>>>, impl Fn(V) + Send + Sync + 'static) {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    (delivered, move |value| sink.lock().unwrap().push(value))
}

struct LogSink(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Captured warning output for the current thread
pub(crate) struct Warnings {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl Warnings {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

/// Record WARN and above until the returned value is dropped.
///
/// Only covers the current thread, so use it with current-thread runtimes.
pub(crate) fn capture_warnings() -> Warnings {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || LogSink(Arc::clone(&sink)))
        .finish();

    Warnings {
        buffer,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}
