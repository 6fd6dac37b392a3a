// crates/locator-core/src/engine.rs
//! # Search Engine
//!
//! Combines the typed query, the latest server catalog, connection status,
//! user tier, partnerships and the recents list into a single [`ViewState`].
//!
//! All commands and upstream updates serialize through one mutex, so the
//! emitted sequence of states is totally ordered. A debounce task decides
//! when a typed query becomes a recent search; every arm carries a
//! generation number checked under the same mutex, so a superseded or
//! cancelled timer never commits.

use crate::config::EngineConfig;
use crate::error::{LocatorError, Result};
use crate::index::{City, Country, LocationIndex};
use crate::matcher::match_query_with;
use crate::model::{ConnectionStatus, Server, Tier};
use crate::overlay::{rank, LiveStatus, RankedResult};
use crate::partners::PartnershipSnapshot;
use crate::recents::{RecentsBackend, RecentsStore};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// What the search screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No query and no recent searches.
    Empty,
    /// No query; recent searches, most recent first.
    SearchHistory { queries: Vec<String> },
    SearchResults(SearchResults),
}

impl ViewState {
    pub fn is_empty(&self) -> bool {
        matches!(self, ViewState::Empty)
    }

    pub fn history(&self) -> Option<&[String]> {
        match self {
            ViewState::SearchHistory { queries } => Some(queries.as_slice()),
            _ => None,
        }
    }

    pub fn results(&self) -> Option<&SearchResults> {
        match self {
            ViewState::SearchResults(results) => Some(results),
            _ => None,
        }
    }
}

/// Ranked results for a non-empty query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// The query as typed, trimmed.
    pub query: String,
    pub countries: Vec<RankedResult<Arc<Country>>>,
    pub cities: Vec<RankedResult<Arc<City>>>,
    pub servers: Vec<RankedResult<Arc<Server>>>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.cities.is_empty() && self.servers.is_empty()
    }

    pub fn country_names(&self) -> Vec<&str> {
        self.countries.iter().map(|r| r.text()).collect()
    }

    pub fn city_names(&self) -> Vec<&str> {
        self.cities.iter().map(|r| r.text()).collect()
    }

    pub fn server_names(&self) -> Vec<&str> {
        self.servers.iter().map(|r| r.value().name()).collect()
    }
}

/// Search orchestrator.
///
/// Must be created inside a tokio runtime; the debounce timer is spawned on
/// the runtime captured at construction.
pub struct SearchEngine {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<EngineState>,
    recents: RecentsStore,
    events: broadcast::Sender<ViewState>,
    config: EngineConfig,
    runtime: Handle,
}

struct EngineState {
    query: String,
    index: Arc<LocationIndex>,
    connection: ConnectionStatus,
    tier: Tier,
    partnerships: Arc<PartnershipSnapshot>,
    view: ViewState,
    debounce: Debounce,
}

#[derive(Default)]
struct Debounce {
    generation: u64,
    pending: Option<PendingCommit>,
}

struct PendingCommit {
    query: String,
    task: JoinHandle<()>,
}

impl Debounce {
    /// Invalidates any armed timer and returns the query it would have committed.
    fn cancel(&mut self) -> Option<String> {
        self.generation = self.generation.wrapping_add(1);
        self.pending.take().map(|p| {
            p.task.abort();
            p.query
        })
    }
}

impl SearchEngine {
    /// Creates an engine on the current tokio runtime.
    pub fn new(config: EngineConfig, backend: Arc<dyn RecentsBackend>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| LocatorError::NoRuntime(e.to_string()))?;
        Ok(Self::with_runtime(config, backend, runtime))
    }

    /// Creates an engine whose timers run on `runtime`.
    pub fn with_runtime(
        config: EngineConfig,
        backend: Arc<dyn RecentsBackend>,
        runtime: Handle,
    ) -> Self {
        let recents = RecentsStore::open(backend, config.max_recents);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let view = history_view(&recents);

        tracing::debug!(
            debounce_ms = config.debounce_ms,
            recents = recents.len(),
            "search engine started"
        );

        SearchEngine {
            shared: Arc::new(Shared {
                state: Mutex::new(EngineState {
                    query: String::new(),
                    index: Arc::new(LocationIndex::default()),
                    connection: ConnectionStatus::default(),
                    tier: Tier::default(),
                    partnerships: Arc::new(PartnershipSnapshot::empty()),
                    view,
                    debounce: Debounce::default(),
                }),
                recents,
                events,
                config,
                runtime,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Updates the typed query.
    ///
    /// A blank query shows recents right away; a commit already armed for
    /// the previous query stays armed. A non-empty query shows results
    /// right away and restarts the debounce timer for itself.
    pub fn set_query(&self, query: &str) {
        let shared = &self.shared;
        let mut st = shared.state.lock();
        st.query = query.to_owned();

        let trimmed = query.trim();
        if trimmed.is_empty() {
            let view = history_view(&shared.recents);
            shared.emit(&mut st, view);
            return;
        }

        shared.arm(&mut st, trimmed.to_owned());
        let view = shared.results_view(&st);
        shared.emit(&mut st, view);
    }

    /// Runs a query picked from the recents list and moves it to the top.
    pub fn set_query_from_recents(&self, query: &str) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.set_query(query);
            return;
        }

        let shared = &self.shared;
        let mut st = shared.state.lock();
        if let Some(dropped) = st.debounce.cancel() {
            tracing::debug!(query = %dropped, "pending commit superseded by recent pick");
        }
        st.query = query.to_owned();
        shared.recents.commit(trimmed);
        let view = shared.results_view(&st);
        shared.emit(&mut st, view);
    }

    /// Forgets every recent search, including one still waiting on the
    /// debounce timer.
    pub fn clear_recent_history(&self) {
        let shared = &self.shared;
        let mut st = shared.state.lock();
        if let Some(dropped) = st.debounce.cancel() {
            tracing::debug!(query = %dropped, "pending commit discarded by clear");
        }
        shared.recents.clear();
        tracing::info!("recent searches cleared");
        if st.query.trim().is_empty() {
            let view = history_view(&shared.recents);
            shared.emit(&mut st, view);
        }
    }

    /// Removes one recent search. Returns whether it existed.
    pub fn remove_recent(&self, query: &str) -> bool {
        let shared = &self.shared;
        let mut st = shared.state.lock();
        let removed = shared.recents.remove(query);
        if removed && st.query.trim().is_empty() {
            let view = history_view(&shared.recents);
            shared.emit(&mut st, view);
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Upstream snapshots
    // -----------------------------------------------------------------------

    /// Rebuilds the index from a fresh server list.
    pub fn update_servers(&self, servers: Vec<Server>) {
        self.update_index(Arc::new(LocationIndex::build(servers)));
    }

    pub fn update_index(&self, index: Arc<LocationIndex>) {
        self.update(|st| st.index = index);
    }

    pub fn update_connection_status(&self, status: ConnectionStatus) {
        self.update(|st| st.connection = status);
    }

    pub fn update_user_tier(&self, tier: Tier) {
        self.update(|st| st.tier = tier);
    }

    pub fn update_partnerships(&self, partnerships: PartnershipSnapshot) {
        self.update(|st| st.partnerships = Arc::new(partnerships));
    }

    fn update(&self, apply: impl FnOnce(&mut EngineState)) {
        let shared = &self.shared;
        let mut st = shared.state.lock();
        apply(&mut st);
        if !st.query.trim().is_empty() {
            let view = shared.results_view(&st);
            shared.emit(&mut st, view);
        }
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    pub fn current(&self) -> ViewState {
        self.shared.state.lock().view.clone()
    }

    pub fn query(&self) -> String {
        self.shared.state.lock().query.clone()
    }

    /// Query waiting on the debounce timer, if any.
    pub fn pending_commit(&self) -> Option<String> {
        self.shared
            .state
            .lock()
            .debounce
            .pending
            .as_ref()
            .map(|p| p.query.clone())
    }

    /// Recent searches, most recent first.
    pub fn recents(&self) -> Vec<String> {
        self.shared.recents.list()
    }

    pub fn index(&self) -> Arc<LocationIndex> {
        self.shared.state.lock().index.clone()
    }

    /// Stream of states, starting with the current one.
    pub fn subscribe(&self) -> ViewStateStream {
        let st = self.shared.state.lock();
        ViewStateStream {
            first: Some(st.view.clone()),
            rx: self.shared.events.subscribe(),
        }
    }

    /// Cancels the debounce timer without committing. Idempotent.
    pub fn shutdown(&self) {
        if let Some(dropped) = self.shared.state.lock().debounce.cancel() {
            tracing::debug!(query = %dropped, "pending commit dropped on shutdown");
        }
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.shared.state.lock();
        f.debug_struct("SearchEngine")
            .field("query", &st.query)
            .field("view", &st.view)
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn arm(self: &Arc<Self>, st: &mut EngineState, query: String) {
        st.debounce.cancel();
        let generation = st.debounce.generation;
        let delay = self.config.debounce();
        let weak: Weak<Shared> = Arc::downgrade(self);

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            // The commit saves through the backend, which may block on I/O.
            if let Err(err) = tokio::task::spawn_blocking(move || shared.fire(generation)).await {
                tracing::warn!(error = %err, "debounced commit did not complete");
            }
        });
        tracing::trace!(query = %query, generation, "debounce armed");
        st.debounce.pending = Some(PendingCommit { query, task });
    }

    fn fire(&self, generation: u64) {
        let mut st = self.state.lock();
        if st.debounce.generation != generation {
            return;
        }
        let Some(pending) = st.debounce.pending.take() else {
            return;
        };
        self.recents.commit(&pending.query);
        tracing::debug!(query = %pending.query, "debounced query committed");

        if st.query.trim().is_empty() {
            let view = history_view(&self.recents);
            self.emit(&mut st, view);
        }
    }

    fn results_view(&self, st: &EngineState) -> ViewState {
        let matches = match_query_with(
            &st.query,
            &st.index,
            &st.partnerships,
            &self.config.partner_marker,
        );
        let live = LiveStatus::resolve(&st.connection, &st.index);
        let ranked = rank(matches, &live, st.tier, &st.partnerships);

        ViewState::SearchResults(SearchResults {
            query: st.query.trim().to_owned(),
            countries: ranked.countries,
            cities: ranked.cities,
            servers: ranked.servers,
        })
    }

    /// Publishes `view` unless it equals the current state.
    fn emit(&self, st: &mut EngineState, view: ViewState) {
        if st.view == view {
            return;
        }
        st.view = view.clone();
        // No subscribers is fine; `current()` still reflects the state.
        let _ = self.events.send(view);
    }
}

fn history_view(recents: &RecentsStore) -> ViewState {
    let queries = recents.list();
    if queries.is_empty() {
        ViewState::Empty
    } else {
        ViewState::SearchHistory { queries }
    }
}

/// Receiver side of [`SearchEngine::subscribe`].
///
/// A subscriber that falls more than `event_capacity` states behind skips
/// to the oldest retained one.
#[derive(Debug)]
pub struct ViewStateStream {
    first: Option<ViewState>,
    rx: broadcast::Receiver<ViewState>,
}

impl ViewStateStream {
    /// Waits for the next state. `None` once the engine is gone.
    pub async fn next(&mut self) -> Option<ViewState> {
        if let Some(first) = self.first.take() {
            return Some(first);
        }
        loop {
            match self.rx.recv().await {
                Ok(view) => return Some(view),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "view state subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next state if one is already queued.
    pub fn try_next(&mut self) -> Option<ViewState> {
        if let Some(first) = self.first.take() {
            return Some(first);
        }
        loop {
            match self.rx.try_recv() {
                Ok(view) => return Some(view),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "view state subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }

    /// Everything queued right now, in emission order.
    pub fn drain(&mut self) -> Vec<ViewState> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recents::MemoryBackend;

    fn engine() -> SearchEngine {
        SearchEngine::new(EngineConfig::default(), Arc::new(MemoryBackend::new())).unwrap()
    }

    #[test]
    fn construction_requires_a_runtime() {
        let result = SearchEngine::new(EngineConfig::default(), Arc::new(MemoryBackend::new()));
        assert!(matches!(result, Err(LocatorError::NoRuntime(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn initial_state_reflects_recents() {
        assert_eq!(engine().current(), ViewState::Empty);

        let backend = MemoryBackend::with_entries(vec![crate::recents::RecentEntry {
            query: "swiss".into(),
            last_used_at: 1,
        }]);
        let engine = SearchEngine::new(EngineConfig::default(), Arc::new(backend)).unwrap();
        assert_eq!(
            engine.current(),
            ViewState::SearchHistory { queries: vec!["swiss".into()] }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn identical_states_are_not_re_emitted() {
        let engine = engine();
        let mut stream = engine.subscribe();
        engine.set_query("");
        engine.set_query("   ");
        engine.update_user_tier(Tier::PLUS);
        assert_eq!(stream.drain(), vec![ViewState::Empty]);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_keeps_pending_commit() {
        let engine = engine();
        engine.set_query("zurich");
        engine.set_query("");
        assert_eq!(engine.pending_commit().as_deref(), Some("zurich"));
        engine.shutdown();
        assert_eq!(engine.pending_commit(), None);
    }
}
