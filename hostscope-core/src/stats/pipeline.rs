//! Consumer-facing read API
//!
//! [`StatsPipeline`] is the only surface a rendering layer or test may
//! depend on: read accessors for every piece of state plus the two mutator
//! entry points (`refresh_stats`, `clear_history`). The source and the
//! poller are constructor inputs and internals; they are never handed out.

use std::sync::Arc;

use super::metrics::{
    HistoryPoint, MemorySample, NetworkSample, ProcessSample, ProcessSortKey, SystemIdentity,
};
use super::poller::{start_poller, PollerHandle};
use super::settings::StatsSettings;
use super::source::StatsSource;
use super::store::{StatsSnapshot, StatsStore};

/// Facade over the statistics pipeline
pub struct StatsPipeline {
    store: Arc<StatsStore>,
    poller: Option<PollerHandle>,
}

impl std::fmt::Debug for StatsPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsPipeline")
            .field("store", &self.store)
            .field("polling", &self.poller.is_some())
            .finish()
    }
}

impl StatsPipeline {
    /// Builds the pipeline around an injected source.
    ///
    /// Runs the availability check, kicks off the one-shot identity fetch,
    /// and, when `auto_start` is set and the source is available, starts
    /// interval polling. Must be called within a tokio runtime.
    #[must_use]
    pub fn new(source: Arc<dyn StatsSource>, settings: StatsSettings) -> Self {
        let store = Arc::new(StatsStore::new(source, settings.clone()));

        if store.is_available() {
            let store_for_identity = Arc::clone(&store);
            tokio::spawn(async move {
                store_for_identity.ensure_identity().await;
            });
        }

        let poller = (settings.auto_start && store.is_available())
            .then(|| start_poller(Arc::clone(&store), settings.effective_interval()));

        Self { store, poller }
    }

    /// Builds a pipeline with default settings
    #[must_use]
    pub fn with_defaults(source: Arc<dyn StatsSource>) -> Self {
        Self::new(source, StatsSettings::default())
    }

    /// Triggers one refresh cycle out-of-band.
    ///
    /// Resolves when the cycle completes. A call that overlaps an in-flight
    /// cycle is a no-op that returns immediately; a call while the source is
    /// unavailable records the error without fetching.
    pub async fn refresh_stats(&self) {
        self.store.refresh().await;
    }

    /// Empties the history buffer; snapshot fields and flags are untouched
    pub fn clear_history(&self) {
        self.store.clear_history();
    }

    /// Latest memory sample
    #[must_use]
    pub fn memory(&self) -> Option<MemorySample> {
        self.store.memory()
    }

    /// Latest network sample
    #[must_use]
    pub fn network(&self) -> Option<NetworkSample> {
        self.store.network()
    }

    /// System identity for this session.
    ///
    /// Joins the one-shot fetch started at construction, so the first await
    /// may wait for it to settle; later calls return the cached value.
    pub async fn system_identity(&self) -> Option<SystemIdentity> {
        self.store.ensure_identity().await
    }

    /// Latest top-N process listing, ranked as fetched (by CPU)
    #[must_use]
    pub fn top_processes(&self) -> Option<Vec<ProcessSample>> {
        self.store.top_processes()
    }

    /// Latest top-N process listing re-ranked by the given key
    #[must_use]
    pub fn top_processes_by(&self, key: ProcessSortKey) -> Option<Vec<ProcessSample>> {
        self.store.top_processes_by(key)
    }

    /// History snapshot, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<HistoryPoint> {
        self.store.history()
    }

    /// True until the first refresh cycle settles
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Current error message, if any
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.store.error()
    }

    /// Whether the stats capability exists in this runtime
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    /// Whether interval polling is running
    #[must_use]
    pub const fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// Full state, cloned out for serialization or display
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        self.store.snapshot()
    }

    /// Stops interval polling.
    ///
    /// An in-flight cycle still settles and lands harmlessly; no further
    /// ticks fire. Manual [`Self::refresh_stats`] calls keep working.
    pub async fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
    }
}
