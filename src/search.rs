//! Debounced typeahead people search.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::BlogApi;
use crate::config::SEARCH_DEBOUNCE_MS;
use crate::core::sequence::RequestSequence;
use crate::models::models::UserSummary;

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    results: Vec<UserSummary>,
}

fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct PeopleSearch {
    api: Arc<dyn BlogApi>,
    state: Arc<Mutex<SearchState>>,
    sequence: Arc<RequestSequence>,
    pending: Option<JoinHandle<()>>,
    debounce: Duration,
    open: bool,
}

impl PeopleSearch {
    pub fn new(api: Arc<dyn BlogApi>) -> Self {
        Self::with_debounce(api, Duration::from_millis(SEARCH_DEBOUNCE_MS))
    }

    pub fn with_debounce(api: Arc<dyn BlogApi>, debounce: Duration) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(SearchState::default())),
            sequence: Arc::new(RequestSequence::new()),
            pending: None,
            debounce,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The sidebar search button.
    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open = true;
        }
    }

    /// Hide the panel (e.g. a click outside it) and forget query and results.
    pub fn close(&mut self) {
        self.open = false;
        self.cancel_pending();
        self.sequence.invalidate();
        let mut st = lock(&self.state);
        st.query.clear();
        st.results.clear();
    }

    pub fn query(&self) -> String {
        lock(&self.state).query.clone()
    }

    pub fn results(&self) -> Vec<UserSummary> {
        lock(&self.state).results.clone()
    }

    /// New input text. Must be called from inside a tokio runtime.
    pub fn on_input(&mut self, query: &str) {
        self.cancel_pending();
        let ticket = self.sequence.next();

        {
            let mut st = lock(&self.state);
            st.query = query.to_string();
            if query.trim().is_empty() {
                st.results.clear();
                return;
            }
        }

        let api = self.api.clone();
        let state = self.state.clone();
        let sequence = self.sequence.clone();
        let delay = self.debounce;
        let query = query.to_string();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Once sent, a lookup is no longer aborted; its ticket decides.
            tokio::spawn(async move {
                debug!(%query, "searching people");
                match api.search(&query).await {
                    Ok(users) if sequence.is_latest(ticket) => lock(&state).results = users,
                    Ok(_) => debug!(%query, "dropping stale search results"),
                    Err(err) => warn!(%query, error = %err, "search failed"),
                }
            });
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for PeopleSearch {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
