//! Debounced address search
//!
//! Each keystroke cancels the lookup scheduled (or already in flight) for the
//! previous input and schedules a new one after a quiet period. Only the most
//! recently issued lookup can publish results; a slower, older request never
//! overwrites a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::geocoding::Geocoder;
use crate::models::SearchCandidate;

/// Where the search box currently is
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    /// No query worth searching (empty, blank or too short)
    #[default]
    Idle,
    /// Input received, waiting for the quiet period to pass
    Typing { query: String },
    /// Lookup issued for `query`
    SearchPending { query: String },
    /// Lookup for `query` finished; a failed lookup shows no candidates
    ResultsShown {
        query: String,
        candidates: Vec<SearchCandidate>,
    },
}

impl SearchState {
    /// Candidates to list under the search box
    #[must_use]
    pub fn candidates(&self) -> &[SearchCandidate] {
        match self {
            SearchState::ResultsShown { candidates, .. } => candidates,
            _ => &[],
        }
    }

    /// Whether the results dropdown should be open
    #[must_use]
    pub fn results_visible(&self) -> bool {
        !self.candidates().is_empty()
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self, SearchState::SearchPending { .. })
    }
}

/// Search box state for one location picker
pub struct DebouncedSearch {
    geocoder: Arc<dyn Geocoder>,
    delay: Duration,
    min_query_chars: usize,
    query: Arc<watch::Sender<String>>,
    state: Arc<watch::Sender<SearchState>>,
    pending: Option<CancellationToken>,
}

impl std::fmt::Debug for DebouncedSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedSearch")
            .field("delay", &self.delay)
            .field("min_query_chars", &self.min_query_chars)
            .field("query", &*self.query.borrow())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl DebouncedSearch {
    pub fn new(geocoder: Arc<dyn Geocoder>, delay: Duration, min_query_chars: usize) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        let (query, _) = watch::channel(String::new());
        Self {
            geocoder,
            delay,
            min_query_chars,
            query: Arc::new(query),
            state: Arc::new(state),
            pending: None,
        }
    }

    /// Build from the geocoding settings
    pub fn from_config(geocoder: Arc<dyn Geocoder>, config: &GeocodingConfig) -> Self {
        Self::new(geocoder, config.debounce(), config.min_query_chars)
    }

    /// Text currently in the search box
    #[must_use]
    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Handle user input.
    ///
    /// Cancels whatever the previous input scheduled. Queries shorter than
    /// the minimum length clear the results without a lookup. Must be called
    /// from within a Tokio runtime.
    #[instrument(skip(self, query))]
    pub fn input(&mut self, query: impl Into<String>) {
        self.query.send_replace(query.into());
        self.cancel_lookup();

        let trimmed = self.query.borrow().trim().to_string();
        if trimmed.chars().count() < self.min_query_chars {
            debug!("Query too short, clearing results");
            self.state.send_replace(SearchState::Idle);
            return;
        }

        self.state.send_replace(SearchState::Typing {
            query: trimmed.clone(),
        });
        self.spawn_lookup(trimmed, Some(self.delay));
    }

    /// Search right away (Enter key or search button).
    ///
    /// Skips the quiet period and the minimum length; blank input is still
    /// ignored.
    pub fn submit(&mut self) {
        self.cancel_lookup();

        let trimmed = self.query.borrow().trim().to_string();
        if trimmed.is_empty() {
            return;
        }
        self.spawn_lookup(trimmed, None);
    }

    /// Put `text` into the box without searching for it, e.g. the label of a
    /// picked result or a reverse-geocoded address
    pub fn set_query_silently(&mut self, text: impl Into<String>) {
        self.query.send_replace(text.into());
        self.cancel_lookup();
        self.state.send_replace(SearchState::Idle);
    }

    /// Handle for writing into the box from a background task
    #[must_use]
    pub fn mirror(&self) -> QueryMirror {
        QueryMirror {
            query: Arc::clone(&self.query),
            state: Arc::clone(&self.state),
        }
    }

    /// Cancel the scheduled or in-flight lookup
    pub fn cancel(&mut self) {
        self.cancel_lookup();
        self.state.send_if_modified(|current| match current {
            SearchState::Typing { .. } | SearchState::SearchPending { .. } => {
                *current = SearchState::Idle;
                true
            }
            _ => false,
        });
    }

    fn cancel_lookup(&mut self) {
        if let Some(token) = self.pending.take() {
            debug!("Cancelling previous lookup");
            token.cancel();
        }
    }

    fn spawn_lookup(&mut self, query: String, delay: Option<Duration>) {
        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let geocoder = Arc::clone(&self.geocoder);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::select! {
                    () = token.cancelled() => return,
                    () = tokio::time::sleep(delay) => {}
                }
            }

            let issued = state.send_if_modified(|current| {
                if token.is_cancelled() {
                    return false;
                }
                *current = SearchState::SearchPending {
                    query: query.clone(),
                };
                true
            });
            if !issued {
                return;
            }

            debug!("Issuing lookup for '{}'", query);
            let outcome = tokio::select! {
                () = token.cancelled() => {
                    debug!("Lookup for '{}' superseded", query);
                    return;
                }
                outcome = geocoder.search(&query) => outcome,
            };

            let candidates = match outcome {
                Ok(candidates) => {
                    info!("{} candidates for '{}'", candidates.len(), query);
                    candidates
                }
                Err(e) => {
                    warn!("Address search for '{}' failed: {}", query, e);
                    Vec::new()
                }
            };

            state.send_if_modified(|current| {
                if token.is_cancelled() {
                    return false;
                }
                *current = SearchState::ResultsShown { query, candidates };
                true
            });
        });
    }
}

/// Writes text into a search box without searching for it
#[derive(Debug, Clone)]
pub struct QueryMirror {
    query: Arc<watch::Sender<String>>,
    state: Arc<watch::Sender<SearchState>>,
}

impl QueryMirror {
    /// Replace the box text with `text` unless it no longer reads `expected`,
    /// i.e. the user has typed since. Returns whether the text was replaced.
    pub fn replace_if_unchanged(&self, expected: &str, text: &str) -> bool {
        let replaced = self.query.send_if_modified(|query| {
            if query.as_str() != expected || query.as_str() == text {
                return false;
            }
            *query = text.to_string();
            true
        });
        if replaced {
            self.state.send_replace(SearchState::Idle);
        }
        replaced
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel_lookup();
    }
}
