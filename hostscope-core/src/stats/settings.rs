//! Pipeline configuration
//!
//! Settings are immutable for the lifetime of one pipeline instance; they
//! are decided at construction and never re-read.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lower bound for the poll interval in milliseconds
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Upper bound for the poll interval in milliseconds (10 minutes)
pub const MAX_POLL_INTERVAL_MS: u64 = 600_000;

/// Configuration for one statistics pipeline instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSettings {
    /// Poll cadence in milliseconds (default: 2000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum number of retained history points (default: 60)
    #[serde(default = "default_max_history_length")]
    pub max_history_length: usize,
    /// Whether polling starts immediately at construction (default: true)
    #[serde(default = "default_true")]
    pub auto_start: bool,
    /// How many processes a top-N fetch requests (default: 10)
    #[serde(default = "default_top_process_count")]
    pub top_process_count: usize,
}

const fn default_poll_interval_ms() -> u64 {
    2000
}

const fn default_max_history_length() -> usize {
    60
}

const fn default_top_process_count() -> usize {
    10
}

const fn default_true() -> bool {
    true
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_history_length: default_max_history_length(),
            auto_start: true,
            top_process_count: default_top_process_count(),
        }
    }
}

impl StatsSettings {
    /// Returns the poll interval clamped to the valid range
    #[must_use]
    pub fn effective_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS),
        )
    }
}
