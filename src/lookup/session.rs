//! Per-caller debounce and cancellation

use super::coordinator::{Callback, Lookup};
use super::{LookupValue, SourceFetcher};
use crate::query::LookupQuery;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Where a session is in its query lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing pending
    #[default]
    Idle,
    /// Debounce timer armed, nothing sent yet
    Waiting,
    /// Request sent and cancellable
    InFlight,
}

/// One dispatched query attempt
struct Attempt {
    id: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct SessionState {
    phase: SessionPhase,
    next_id: u64,
    pending_timer: Option<JoinHandle<()>>,
    active: Option<Attempt>,
}

impl SessionState {
    /// Drop whatever the session was doing
    fn supersede(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            if self.phase == SessionPhase::Waiting {
                timer.abort();
            }
        }
        if let Some(attempt) = self.active.take() {
            attempt.cancel.cancel();
        }
        self.phase = SessionPhase::Idle;
    }

    fn is_current(&self, id: u64) -> bool {
        self.active.as_ref().map(|a| a.id) == Some(id)
    }

    /// Return to idle if `id` is still the current attempt
    fn finish(&mut self, id: u64) -> bool {
        if !self.is_current(id) {
            return false;
        }
        self.active = None;
        self.pending_timer = None;
        self.phase = SessionPhase::Idle;
        true
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Debounced lookups on behalf of one caller.
///
/// Each new query cancels the previous one, so the callback only ever sees
/// results for the latest query. A superseded query delivers nothing.
/// Dropping the session cancels any pending work.
pub struct LookupSession<F: SourceFetcher> {
    lookup: Lookup<F>,
    on_results: Callback<F::Output>,
    state: Arc<Mutex<SessionState>>,
}

impl<F: SourceFetcher> LookupSession<F> {
    pub(crate) fn new(lookup: Lookup<F>, on_results: Callback<F::Output>) -> Self {
        Self {
            lookup,
            on_results,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Submit the latest input. Must be called within a tokio runtime.
    pub fn query(&self, raw: &str) {
        let options = self.lookup.options();
        let mut state = lock(&self.state);
        state.supersede();

        let query = match LookupQuery::parse(raw, options.min_query_len) {
            Some(query) if self.lookup.is_available() => query,
            gated => {
                drop(state);
                if gated.is_some() {
                    debug!("{} unavailable, resolving empty", self.lookup.name());
                }
                (self.on_results)(F::Output::empty());
                return;
            }
        };

        state.next_id += 1;
        let attempt = Attempt {
            id: state.next_id,
            cancel: CancellationToken::new(),
        };
        let task = run_attempt(
            self.lookup.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.on_results),
            query.key,
            attempt.id,
            attempt.cancel.clone(),
        );

        state.active = Some(attempt);
        state.phase = SessionPhase::Waiting;
        state.pending_timer = Some(tokio::spawn(task));
    }

    /// Abandon pending and in-flight work; no callback fires for it
    pub fn cancel(&self) {
        lock(&self.state).supersede();
    }

    pub fn phase(&self) -> SessionPhase {
        lock(&self.state).phase
    }
}

impl<F: SourceFetcher> Drop for LookupSession<F> {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_attempt<F: SourceFetcher>(
    lookup: Lookup<F>,
    state: Arc<Mutex<SessionState>>,
    on_results: Callback<F::Output>,
    key: String,
    id: u64,
    cancel: CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(lookup.options().debounce) => {}
    }

    {
        let mut guard = lock(&state);
        if !guard.is_current(id) {
            return;
        }
        guard.phase = SessionPhase::InFlight;
    }

    let mut provisional = false;
    if let Some(hit) = lookup.cached(&key) {
        if !lookup.options().revalidate_on_hit {
            if lock(&state).finish(id) {
                on_results(hit);
            }
            return;
        }
        if lock(&state).is_current(id) {
            on_results(hit);
            provisional = true;
        }
    }

    let outcome = lookup.fetch(&key, &cancel).await;

    if !lock(&state).finish(id) {
        warn!("{} lookup for '{}' cancelled, discarding result", lookup.name(), key);
        return;
    }

    match outcome {
        Ok(value) => {
            lookup.store(&key, &value);
            on_results(value);
        }
        Err(err) => {
            lookup.report(&key, &err);
            // Keep the provisional answer rather than blanking it
            if !err.is_cancelled() && !provisional {
                on_results(F::Output::empty());
            }
        }
    }
}
