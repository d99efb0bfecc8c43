//! The sampling boundary
//!
//! [`StatsSource`] is the seam between the pipeline and whatever privileged
//! backend actually reads host statistics. The host environment decides the
//! implementation once, at construction; business logic never probes for a
//! capability ad hoc.
//!
//! Every fetch returns `Option`: an implementation catches its own failures
//! and reports `None`. "Unavailable" and "errored" are deliberately the same
//! outcome upstream — a fetch is never allowed to disrupt a poll cycle.

use async_trait::async_trait;

use super::metrics::{MemorySample, NetworkSample, ProcessSample, SystemIdentity};

/// Default number of processes requested by a top-N fetch
pub const DEFAULT_TOP_PROCESS_COUNT: usize = 10;

/// Boundary to the privileged statistics backend
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Whether the backing capability exists in this runtime.
    ///
    /// Called once, synchronously, when the pipeline is constructed. Absence
    /// is a normal outcome, not an error.
    fn is_capability_present(&self) -> bool;

    /// Current memory usage, or `None` if the sample could not be taken
    async fn fetch_memory(&self) -> Option<MemorySample>;

    /// Current network counters and rates, or `None`
    async fn fetch_network(&self) -> Option<NetworkSample>;

    /// Static system identity, or `None`
    async fn fetch_system_identity(&self) -> Option<SystemIdentity>;

    /// Up to `count` processes ranked by CPU usage, or `None`
    async fn fetch_top_processes(&self, count: usize) -> Option<Vec<ProcessSample>>;
}

/// Null-object source for runtimes without a statistics capability.
///
/// Reports the capability as absent and returns `None` from every fetch, so
/// a pipeline built on it degrades to the "source unavailable" state without
/// any special-casing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStatsSource;

#[async_trait]
impl StatsSource for NullStatsSource {
    fn is_capability_present(&self) -> bool {
        false
    }

    async fn fetch_memory(&self) -> Option<MemorySample> {
        None
    }

    async fn fetch_network(&self) -> Option<NetworkSample> {
        None
    }

    async fn fetch_system_identity(&self) -> Option<SystemIdentity> {
        None
    }

    async fn fetch_top_processes(&self, _count: usize) -> Option<Vec<ProcessSample>> {
        None
    }
}
