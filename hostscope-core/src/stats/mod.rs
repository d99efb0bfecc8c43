//! Host statistics polling pipeline
//!
//! Samples memory, network, process, and identity metrics from a
//! [`StatsSource`], polls on a fixed interval with an at-most-one in-flight
//! refresh guarantee, and keeps a bounded history of timestamped samples for
//! charting.
//!
//! This module is presentation-free — it handles only data models, sampling,
//! and state. Rendering lives with whatever consumes [`StatsPipeline`].

mod history;
mod metrics;
mod pipeline;
mod poller;
mod proc;
mod settings;
mod source;
mod store;

pub use history::HistoryBuffer;
pub use metrics::{
    rank_top_processes, HistoryPoint, MemorySample, NetworkSample, ProcessSample, ProcessSortKey,
    SystemIdentity,
};
pub use pipeline::StatsPipeline;
pub use poller::{start_poller, PollerHandle};
pub use proc::{ProcStatsSource, SourceError};
pub use settings::{StatsSettings, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};
pub use source::{NullStatsSource, StatsSource, DEFAULT_TOP_PROCESS_COUNT};
pub use store::{StatsSnapshot, StatsStore, SOURCE_UNAVAILABLE_ERROR};
