//! `hostscope` Core Library
//!
//! This crate provides the statistics polling-and-aggregation pipeline behind
//! the `hostscope` monitor: a sampling boundary produces host memory, network,
//! process, and identity metrics; the pipeline polls it on an interval, keeps
//! a bounded rolling history, and exposes everything to consumers through a
//! narrow read API.
//!
//! # Crate Structure
//!
//! - [`stats`] - The whole pipeline: data model, source boundary, history
//!   buffer, poll scheduler, state store, and the consumer facade
//!
//! Consumers (a rendering layer, a CLI, tests) depend on
//! [`stats::StatsPipeline`] only; the source and the poller are never handed
//! out.

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod stats;

pub use stats::{
    HistoryBuffer, HistoryPoint, MemorySample, NetworkSample, NullStatsSource, PollerHandle,
    ProcStatsSource, ProcessSample, ProcessSortKey, SourceError, StatsPipeline, StatsSettings,
    StatsSnapshot, StatsSource, StatsStore, SystemIdentity, DEFAULT_TOP_PROCESS_COUNT,
    SOURCE_UNAVAILABLE_ERROR,
};
