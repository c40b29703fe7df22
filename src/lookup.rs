//! Debounced suggestion lookups.
//!
//! A [`LookupField`] sits behind one text input. Every update supersedes the
//! previous one: the in-flight task is aborted and only a task whose
//! generation is still current may publish.

use crate::providers::labels::default_city_suggestions;
use crate::providers::{Geocoder, Suggestion, SuggestionKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
pub const CITY_MIN_CHARS: usize = 2;
pub const LOCATION_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPolicy {
    pub kind: SuggestionKind,
    pub debounce: Duration,
    pub min_chars: usize,
}

impl LookupPolicy {
    pub fn city() -> Self {
        Self {
            kind: SuggestionKind::City,
            debounce: DEFAULT_DEBOUNCE,
            min_chars: CITY_MIN_CHARS,
        }
    }

    pub fn location() -> Self {
        Self {
            kind: SuggestionKind::Location,
            debounce: DEFAULT_DEBOUNCE,
            min_chars: LOCATION_MIN_CHARS,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Shown while the query is too short or the lookup came back empty.
    pub fn fallback(&self) -> Vec<Suggestion> {
        match self.kind {
            SuggestionKind::City => default_city_suggestions(),
            SuggestionKind::Location => Vec::new(),
        }
    }

    pub fn is_searchable(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_chars
    }
}

/// Suggestions for `query`, degrading to the policy fallback.
pub async fn resolve<G: Geocoder>(
    geocoder: &G,
    policy: &LookupPolicy,
    query: &str,
) -> Vec<Suggestion> {
    let query = query.trim();
    if !policy.is_searchable(query) {
        return policy.fallback();
    }

    match geocoder.suggest(query, policy.kind).await {
        Ok(suggestions) if !suggestions.is_empty() => suggestions,
        Ok(_) => {
            debug!(query, "No suggestions, using fallback");
            policy.fallback()
        }
        Err(err) => {
            warn!(error = %err, query, "Suggestion lookup failed");
            policy.fallback()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSnapshot {
    pub generation: u64,
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

pub struct LookupField<G> {
    geocoder: Arc<G>,
    policy: LookupPolicy,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    results: Arc<watch::Sender<LookupSnapshot>>,
}

impl<G> LookupField<G>
where
    G: Geocoder + 'static,
{
    pub fn new(geocoder: Arc<G>, policy: LookupPolicy) -> Self {
        let (results, _results_rx) = watch::channel(LookupSnapshot {
            generation: 0,
            query: String::new(),
            suggestions: policy.fallback(),
        });
        Self {
            geocoder,
            policy,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            results: Arc::new(results),
        }
    }

    pub fn policy(&self) -> &LookupPolicy {
        &self.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupSnapshot> {
        self.results.subscribe()
    }

    pub fn latest(&self) -> LookupSnapshot {
        self.results.borrow().clone()
    }

    /// Supersede any pending lookup with `query`. Must be called from within
    /// a tokio runtime.
    pub fn update(&self, query: impl Into<String>) -> u64 {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_pending();

        if !self.policy.is_searchable(&query) {
            let suggestions = self.policy.fallback();
            publish_if_current(
                &self.results,
                &self.generation,
                LookupSnapshot {
                    generation,
                    query,
                    suggestions,
                },
            );
            return generation;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let policy = self.policy;
        let current = Arc::clone(&self.generation);
        let results = Arc::clone(&self.results);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(policy.debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            let suggestions = resolve(geocoder.as_ref(), &policy, &query).await;
            let snapshot = LookupSnapshot {
                generation,
                query,
                suggestions,
            };
            if !publish_if_current(&results, &current, snapshot) {
                debug!(generation, "Dropping superseded lookup");
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(handle);
        }
        generation
    }

    /// Drop any pending lookup without publishing, e.g. once a suggestion
    /// has been picked.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending();
    }

    fn abort_pending(&self) {
        if let Ok(mut pending) = self.pending.lock()
            && let Some(handle) = pending.take()
        {
            handle.abort();
        }
    }
}

/// Publishes only while `snapshot` belongs to the newest update. The
/// generation is read under the channel lock, so a racing update either
/// publishes after this one or suppresses it.
fn publish_if_current(
    results: &watch::Sender<LookupSnapshot>,
    current: &AtomicU64,
    snapshot: LookupSnapshot,
) -> bool {
    let generation = snapshot.generation;
    results.send_if_modified(move |latest| {
        if current.load(Ordering::SeqCst) != generation {
            return false;
        }
        *latest = snapshot;
        true
    })
}

impl<G> Drop for LookupField<G> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock()
            && let Some(handle) = pending.take()
        {
            handle.abort();
        }
    }
}
