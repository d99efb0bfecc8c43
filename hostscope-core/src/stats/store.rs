//! Single source of truth for pipeline state
//!
//! [`StatsStore`] owns the latest snapshot, the bounded history, and the
//! status flags. Its only writers are the refresh cycle, the one-shot
//! identity fetch, and [`StatsStore::clear_history`]. The state mutex is
//! never held across an await; the in-flight refresh guard is an atomic
//! compare-and-swap so overlapping triggers are dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::join3;
use serde::Serialize;
use tokio::sync::OnceCell;

use super::history::HistoryBuffer;
use super::metrics::{
    rank_top_processes, HistoryPoint, MemorySample, NetworkSample, ProcessSample, ProcessSortKey,
    SystemIdentity,
};
use super::settings::StatsSettings;
use super::source::StatsSource;

/// Error string surfaced when the stats capability is absent
pub const SOURCE_UNAVAILABLE_ERROR: &str = "stats source not available";

/// Everything the store knows, cloned out for consumers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Latest memory sample, if any tick produced one
    pub memory: Option<MemorySample>,
    /// Latest network sample, if any tick produced one
    pub network: Option<NetworkSample>,
    /// System identity, once the one-shot fetch has landed
    pub system_identity: Option<SystemIdentity>,
    /// Latest top-N process listing, if any tick produced one
    pub top_processes: Option<Vec<ProcessSample>>,
    /// Retained history, oldest first
    pub history: Vec<HistoryPoint>,
    /// True until the first refresh cycle settles
    pub is_loading: bool,
    /// Persistent error message, set only on source unavailability
    pub error: Option<String>,
    /// Whether the stats capability exists in this runtime
    pub is_available: bool,
}

/// Mutable record behind the store's mutex
#[derive(Debug)]
struct StatsState {
    memory: Option<MemorySample>,
    network: Option<NetworkSample>,
    system_identity: Option<SystemIdentity>,
    top_processes: Option<Vec<ProcessSample>>,
    history: HistoryBuffer,
    is_loading: bool,
    error: Option<String>,
}

impl StatsState {
    fn new(available: bool, capacity: usize) -> Self {
        Self {
            memory: None,
            network: None,
            system_identity: None,
            top_processes: None,
            history: HistoryBuffer::new(capacity),
            // An absent capability is known at construction; there is
            // nothing to load and nothing to retry
            is_loading: available,
            error: (!available).then(|| SOURCE_UNAVAILABLE_ERROR.to_string()),
        }
    }
}

/// Owner of [`StatsSnapshot`] state, fed by the refresh cycle
pub struct StatsStore {
    source: Arc<dyn StatsSource>,
    settings: StatsSettings,
    state: Mutex<StatsState>,
    refreshing: AtomicBool,
    identity: OnceCell<Option<SystemIdentity>>,
    available: bool,
}

impl std::fmt::Debug for StatsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsStore")
            .field("available", &self.available)
            .field("refreshing", &self.refreshing.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl StatsStore {
    /// Creates a store and runs the availability check.
    ///
    /// The capability is probed exactly once, here; the result is fixed for
    /// the store's lifetime.
    #[must_use]
    pub fn new(source: Arc<dyn StatsSource>, settings: StatsSettings) -> Self {
        let available = source.is_capability_present();
        if !available {
            tracing::info!("stats capability absent, polling disabled");
        }
        let state = Mutex::new(StatsState::new(available, settings.max_history_length));
        Self {
            source,
            settings,
            state,
            refreshing: AtomicBool::new(false),
            identity: OnceCell::new(),
            available,
        }
    }

    /// Runs one refresh cycle.
    ///
    /// Resolves when the cycle completes — whether it produced new data,
    /// found another refresh in flight (no-op), or found the source
    /// unavailable (error recorded, no fetches attempted). The three metric
    /// fetches run concurrently and settle independently; a `None` from any
    /// of them is valid partial data, not an error.
    pub async fn refresh(&self) {
        if !self.available {
            let mut state = self.state.lock().unwrap();
            state.error = Some(SOURCE_UNAVAILABLE_ERROR.to_string());
            state.is_loading = false;
            return;
        }

        // At-most-one in-flight cycle; overlapping triggers are dropped
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("refresh already in flight, trigger dropped");
            return;
        }

        let (memory, network, top_processes) = join3(
            self.source.fetch_memory(),
            self.source.fetch_network(),
            self.source.fetch_top_processes(self.settings.top_process_count),
        )
        .await;

        let point = HistoryPoint {
            timestamp: Utc::now(),
            memory,
            network,
        };

        {
            let mut state = self.state.lock().unwrap();
            state.history.push(point);
            state.memory = memory;
            state.network = network;
            state.top_processes = top_processes;
            state.error = None;
            state.is_loading = false;
        }

        self.refreshing.store(false, Ordering::Release);
    }

    /// Fetches the system identity, once per session.
    ///
    /// Concurrent callers share the single underlying fetch; later callers
    /// get the cached result. Does nothing when the source is unavailable.
    pub async fn ensure_identity(&self) -> Option<SystemIdentity> {
        if !self.available {
            return None;
        }
        self.identity
            .get_or_init(|| async {
                let identity = self.source.fetch_system_identity().await;
                if let Some(ref identity) = identity {
                    self.state.lock().unwrap().system_identity = Some(identity.clone());
                }
                identity
            })
            .await
            .clone()
    }

    /// Empties the history buffer; the current snapshot and flags are
    /// untouched. A refresh in flight simply appends its point to the
    /// now-empty buffer when it settles.
    pub fn clear_history(&self) {
        self.state.lock().unwrap().history.clear();
    }

    /// Latest memory sample
    #[must_use]
    pub fn memory(&self) -> Option<MemorySample> {
        self.state.lock().unwrap().memory
    }

    /// Latest network sample
    #[must_use]
    pub fn network(&self) -> Option<NetworkSample> {
        self.state.lock().unwrap().network
    }

    /// System identity, if the one-shot fetch has landed
    #[must_use]
    pub fn system_identity(&self) -> Option<SystemIdentity> {
        self.state.lock().unwrap().system_identity.clone()
    }

    /// Latest top-N process listing
    #[must_use]
    pub fn top_processes(&self) -> Option<Vec<ProcessSample>> {
        self.state.lock().unwrap().top_processes.clone()
    }

    /// Latest top-N process listing re-ranked by the given key
    #[must_use]
    pub fn top_processes_by(&self, key: ProcessSortKey) -> Option<Vec<ProcessSample>> {
        let mut samples = self.top_processes()?;
        let count = samples.len();
        rank_top_processes(&mut samples, key, count);
        Some(samples)
    }

    /// History snapshot, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<HistoryPoint> {
        self.state.lock().unwrap().history.to_vec()
    }

    /// True until the first refresh cycle settles
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().is_loading
    }

    /// Current error message, if any
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }

    /// Whether the stats capability exists in this runtime
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// Full state, cloned out for serialization or display
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let state = self.state.lock().unwrap();
        StatsSnapshot {
            memory: state.memory,
            network: state.network,
            system_identity: state.system_identity.clone(),
            top_processes: state.top_processes.clone(),
            history: state.history.to_vec(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            is_available: self.available,
        }
    }
}
