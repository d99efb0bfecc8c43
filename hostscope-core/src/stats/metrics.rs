//! Data models for host metrics
//!
//! All types are presentation-free and serializable so consumers can ship
//! snapshots over any boundary (IPC, JSON output, tests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of physical memory usage at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemorySample {
    /// Total physical memory in bytes
    pub total_bytes: u64,
    /// Used memory in bytes — total minus free
    pub used_bytes: u64,
    /// Free memory in bytes — includes reclaimable caches
    pub free_bytes: u64,
    /// Used memory as a percentage of total (0.0–100.0)
    pub used_percent: f64,
}

impl MemorySample {
    /// Builds a sample from total and free byte counts.
    ///
    /// `used_percent` is derived; a zero total yields 0%.
    #[must_use]
    pub fn from_total_free(total_bytes: u64, free_bytes: u64) -> Self {
        let used_bytes = total_bytes.saturating_sub(free_bytes);
        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };
        Self {
            total_bytes,
            used_bytes,
            free_bytes,
            used_percent,
        }
    }
}

/// Network throughput at a point in time
///
/// The totals are cumulative counters, monotonically non-decreasing for the
/// life of the sampled host; the rates are instantaneous and zero until a
/// second sample provides a delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkSample {
    /// Total received bytes since boot
    pub rx_bytes_total: u64,
    /// Total transmitted bytes since boot
    pub tx_bytes_total: u64,
    /// Receive rate in bytes per second
    pub rx_bytes_per_sec: f64,
    /// Transmit rate in bytes per second
    pub tx_bytes_per_sec: f64,
}

/// One ranked process in a top-N listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    /// Process ID
    pub pid: u32,
    /// Process name (comm)
    pub name: String,
    /// CPU usage as a percentage, 100 = one core fully busy
    pub cpu_percent: f64,
    /// Resident memory in bytes
    pub memory_bytes: u64,
    /// Resident memory as a percentage of total physical memory
    pub memory_percent: f64,
}

/// Ranking key for a top-N process listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessSortKey {
    /// Rank by CPU usage, descending
    #[default]
    Cpu,
    /// Rank by memory usage, descending
    Memory,
}

/// Ranks processes by the given key (descending) and truncates to `count`.
///
/// NaN percentages rank last so a malformed sample never displaces a real
/// one.
pub fn rank_top_processes(samples: &mut Vec<ProcessSample>, key: ProcessSortKey, count: usize) {
    let rank = |p: &ProcessSample| {
        let v = match key {
            ProcessSortKey::Cpu => p.cpu_percent,
            ProcessSortKey::Memory => p.memory_percent,
        };
        if v.is_nan() { f64::NEG_INFINITY } else { v }
    };
    samples.sort_by(|a, b| rank(b).total_cmp(&rank(a)));
    samples.truncate(count);
}

/// Static system identity, fetched once per session.
///
/// These values don't change while the pipeline runs, so they are fetched
/// once and cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIdentity {
    /// CPU model string (e.g. "AMD Ryzen 7 5800X")
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_core_count: u32,
    /// Operating system name (e.g. "Ubuntu")
    pub os_name: String,
    /// Operating system version (e.g. "24.04")
    pub os_version: String,
    /// Host name
    pub hostname: String,
}

/// One timestamped history sample retained for charting.
///
/// Produced once per completed poll tick; either field may be `None` when
/// that tick's fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// When this sample was taken
    pub timestamp: DateTime<Utc>,
    /// Memory usage at that instant, if the fetch succeeded
    pub memory: Option<MemorySample>,
    /// Network throughput at that instant, if the fetch succeeded
    pub network: Option<NetworkSample>,
}

impl HistoryPoint {
    /// The sample timestamp as milliseconds since the Unix epoch
    #[must_use]
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp.timestamp_millis().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_sample(pid: u32, cpu: f64, mem: f64) -> ProcessSample {
        ProcessSample {
            pid,
            name: format!("proc{pid}"),
            cpu_percent: cpu,
            memory_bytes: 0,
            memory_percent: mem,
        }
    }

    #[test]
    fn test_memory_sample_percent() {
        let sample = MemorySample::from_total_free(16_000_000_000, 4_000_000_000);
        assert_eq!(sample.used_bytes, 12_000_000_000);
        assert_eq!(sample.used_bytes + sample.free_bytes, sample.total_bytes);
        assert!((sample.used_percent - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_memory_sample_zero_total() {
        let sample = MemorySample::from_total_free(0, 0);
        assert!((sample.used_percent - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_by_cpu() {
        let mut samples = vec![
            proc_sample(1, 10.0, 50.0),
            proc_sample(2, 90.0, 5.0),
            proc_sample(3, 40.0, 20.0),
        ];
        rank_top_processes(&mut samples, ProcessSortKey::Cpu, 2);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].pid, 2);
        assert_eq!(samples[1].pid, 3);
    }

    #[test]
    fn test_rank_by_memory() {
        let mut samples = vec![
            proc_sample(1, 10.0, 50.0),
            proc_sample(2, 90.0, 5.0),
            proc_sample(3, 40.0, 20.0),
        ];
        rank_top_processes(&mut samples, ProcessSortKey::Memory, 10);
        assert_eq!(samples[0].pid, 1);
        assert_eq!(samples[1].pid, 3);
        assert_eq!(samples[2].pid, 2);
    }

    #[test]
    fn test_rank_nan_last() {
        let mut samples = vec![
            proc_sample(1, f64::NAN, 0.0),
            proc_sample(2, 5.0, 0.0),
            proc_sample(3, 0.0, 0.0),
        ];
        rank_top_processes(&mut samples, ProcessSortKey::Cpu, 3);
        assert_eq!(samples[2].pid, 1);
    }

    #[test]
    fn test_history_point_millis() {
        let point = HistoryPoint {
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_123).unwrap(),
            memory: None,
            network: None,
        };
        assert_eq!(point.timestamp_millis(), 1_700_000_000_123);
    }
}
