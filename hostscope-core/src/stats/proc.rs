//! Local Linux statistics source backed by procfs
//!
//! Parses `/proc/meminfo`, `/proc/net/dev`, `/proc/stat`, `/proc/cpuinfo`,
//! and per-pid `stat` files. Network rates and per-process CPU percentages
//! are deltas between consecutive fetches; the first fetch reports zero.
//!
//! The proc root and os-release path are injectable so tests can point the
//! source at a fabricated tree. Every failure is caught at the trait
//! boundary and surfaces as `None`, per the [`StatsSource`] contract.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;

use super::metrics::{
    rank_top_processes, MemorySample, NetworkSample, ProcessSample, ProcessSortKey, SystemIdentity,
};
use super::source::StatsSource;

/// Resident set sizes in `/proc/<pid>/stat` are counted in pages
const PAGE_SIZE_BYTES: u64 = 4096;

/// Errors that can occur while sampling procfs
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A procfs or os-release file could not be read
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    /// A procfs file did not have the expected shape
    #[error("failed to parse {0}")]
    Parse(String),
    /// The host name could not be resolved
    #[error("hostname lookup failed")]
    Hostname(#[source] std::io::Error),
}

/// Delta state carried between consecutive fetches
#[derive(Debug, Default)]
struct RateState {
    /// Last seen (rx, tx) cumulative byte counters
    net: Option<(u64, u64)>,
    net_sampled_at: Option<Instant>,
    /// Last seen aggregate jiffy total from `/proc/stat`
    cpu_total: Option<u64>,
    /// Last seen utime+stime jiffies per pid
    pid_jiffies: HashMap<u32, u64>,
}

/// [`StatsSource`] that samples the local host through procfs
#[derive(Debug)]
pub struct ProcStatsSource {
    proc_root: PathBuf,
    os_release_path: PathBuf,
    rates: Mutex<RateState>,
}

impl Default for ProcStatsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcStatsSource {
    /// Creates a source reading `/proc` and `/etc/os-release`
    #[must_use]
    pub fn new() -> Self {
        Self::with_roots("/proc", "/etc/os-release")
    }

    /// Creates a source reading from the given paths instead of the system
    /// defaults
    #[must_use]
    pub fn with_roots(proc_root: impl Into<PathBuf>, os_release: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            os_release_path: os_release.into(),
            rates: Mutex::new(RateState::default()),
        }
    }

    fn read_file(&self, rel: &str) -> Result<String, SourceError> {
        let path = self.proc_root.join(rel);
        fs::read_to_string(&path).map_err(|err| SourceError::Read(path, err))
    }

    fn sample_memory(&self) -> Result<MemorySample, SourceError> {
        let content = self.read_file("meminfo")?;
        let (total_kib, available_kib) = parse_meminfo(&content)?;
        Ok(MemorySample::from_total_free(
            total_kib * 1024,
            available_kib * 1024,
        ))
    }

    fn sample_network(&self) -> Result<NetworkSample, SourceError> {
        let content = self.read_file("net/dev")?;
        let (rx_total, tx_total) = parse_net_dev(&content);
        let now = Instant::now();

        let mut rates = self.rates.lock().unwrap();
        let (rx_rate, tx_rate) = match (rates.net, rates.net_sampled_at) {
            (Some((prev_rx, prev_tx)), Some(prev_at)) => {
                let elapsed = now.duration_since(prev_at).as_secs_f64();
                if elapsed > 0.0 {
                    (
                        rx_total.saturating_sub(prev_rx) as f64 / elapsed,
                        tx_total.saturating_sub(prev_tx) as f64 / elapsed,
                    )
                } else {
                    (0.0, 0.0)
                }
            }
            // No delta yet
            _ => (0.0, 0.0),
        };
        rates.net = Some((rx_total, tx_total));
        rates.net_sampled_at = Some(now);

        Ok(NetworkSample {
            rx_bytes_total: rx_total,
            tx_bytes_total: tx_total,
            rx_bytes_per_sec: rx_rate,
            tx_bytes_per_sec: tx_rate,
        })
    }

    fn read_identity(&self) -> Result<SystemIdentity, SourceError> {
        let cpuinfo = self.read_file("cpuinfo")?;
        let (cpu_model, cpu_core_count) = parse_cpuinfo(&cpuinfo);

        // os-release may be absent on minimal hosts; identity still has value
        let (os_name, os_version) = fs::read_to_string(&self.os_release_path)
            .map(|content| parse_os_release(&content))
            .unwrap_or_default();

        let hostname = hostname::get()
            .map_err(SourceError::Hostname)?
            .to_string_lossy()
            .into_owned();

        Ok(SystemIdentity {
            cpu_model,
            cpu_core_count,
            os_name,
            os_version,
            hostname,
        })
    }

    fn scan_processes(&self, count: usize) -> Result<Vec<ProcessSample>, SourceError> {
        let stat = self.read_file("stat")?;
        let (cpu_total, cpu_count) = parse_cpu_total(&stat)?;
        let meminfo = self.read_file("meminfo")?;
        let (total_kib, _) = parse_meminfo(&meminfo)?;
        let total_bytes = total_kib * 1024;

        let entries = fs::read_dir(&self.proc_root)
            .map_err(|err| SourceError::Read(self.proc_root.clone(), err))?;

        let mut samples = Vec::new();
        let mut jiffies_now: HashMap<u32, u64> = HashMap::new();
        for entry in entries.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            // Processes vanish mid-scan; skip rather than fail the whole pass
            let Ok(content) = fs::read_to_string(entry.path().join("stat")) else {
                continue;
            };
            let Ok(pid_stat) = parse_pid_stat(&content) else {
                continue;
            };

            jiffies_now.insert(pid, pid_stat.jiffies);
            let memory_bytes = pid_stat.rss_pages * PAGE_SIZE_BYTES;
            let memory_percent = if total_bytes == 0 {
                0.0
            } else {
                memory_bytes as f64 / total_bytes as f64 * 100.0
            };
            samples.push(ProcessSample {
                pid,
                name: pid_stat.name,
                cpu_percent: 0.0,
                memory_bytes,
                memory_percent,
            });
        }

        let mut rates = self.rates.lock().unwrap();
        if let Some(prev_total) = rates.cpu_total {
            let total_delta = cpu_total.saturating_sub(prev_total);
            if total_delta > 0 {
                for sample in &mut samples {
                    if let Some(prev) = rates.pid_jiffies.get(&sample.pid) {
                        let delta = jiffies_now
                            .get(&sample.pid)
                            .copied()
                            .unwrap_or(0)
                            .saturating_sub(*prev);
                        // 100% = one core fully busy; the aggregate line sums
                        // all cores, hence the multiplier
                        sample.cpu_percent =
                            delta as f64 / total_delta as f64 * 100.0 * f64::from(cpu_count);
                    }
                }
            }
        }
        rates.cpu_total = Some(cpu_total);
        rates.pid_jiffies = jiffies_now;
        drop(rates);

        rank_top_processes(&mut samples, ProcessSortKey::Cpu, count);
        Ok(samples)
    }
}

#[async_trait]
impl StatsSource for ProcStatsSource {
    fn is_capability_present(&self) -> bool {
        self.proc_root.join("meminfo").exists()
    }

    async fn fetch_memory(&self) -> Option<MemorySample> {
        match self.sample_memory() {
            Ok(sample) => Some(sample),
            Err(err) => {
                tracing::debug!(error = %err, "memory sample failed");
                None
            }
        }
    }

    async fn fetch_network(&self) -> Option<NetworkSample> {
        match self.sample_network() {
            Ok(sample) => Some(sample),
            Err(err) => {
                tracing::debug!(error = %err, "network sample failed");
                None
            }
        }
    }

    async fn fetch_system_identity(&self) -> Option<SystemIdentity> {
        match self.read_identity() {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::debug!(error = %err, "system identity fetch failed");
                None
            }
        }
    }

    async fn fetch_top_processes(&self, count: usize) -> Option<Vec<ProcessSample>> {
        match self.scan_processes(count) {
            Ok(samples) => Some(samples),
            Err(err) => {
                tracing::debug!(error = %err, "process scan failed");
                None
            }
        }
    }
}

/// Parses `MemTotal` and `MemAvailable` (KiB) from `/proc/meminfo`
fn parse_meminfo(content: &str) -> Result<(u64, u64), SourceError> {
    let mut total_kib: u64 = 0;
    let mut available_kib: u64 = 0;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kib = parse_kib_value(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kib = parse_kib_value(rest);
        }
    }

    if total_kib == 0 {
        return Err(SourceError::Parse(
            "MemTotal not found in meminfo".to_string(),
        ));
    }
    Ok((total_kib, available_kib))
}

/// Parses a value like `  16384000 kB` into KiB
fn parse_kib_value(s: &str) -> u64 {
    s.split_whitespace()
        .next()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Sums rx/tx bytes across all non-loopback interfaces in `/proc/net/dev`
fn parse_net_dev(content: &str) -> (u64, u64) {
    let mut rx_bytes: u64 = 0;
    let mut tx_bytes: u64 = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("lo:") {
            continue;
        }
        // Format: iface: rx_bytes rx_packets ... tx_bytes tx_packets ...
        if let Some((_iface, stats)) = line.split_once(':') {
            let parts: Vec<&str> = stats.split_whitespace().collect();
            if parts.len() >= 9 {
                rx_bytes += parts[0].parse::<u64>().unwrap_or(0);
                tx_bytes += parts[8].parse::<u64>().unwrap_or(0);
            }
        }
    }
    (rx_bytes, tx_bytes)
}

/// Parses the aggregate cpu line of `/proc/stat` into total jiffies, and
/// counts the per-cpu lines
fn parse_cpu_total(content: &str) -> Result<(u64, u32), SourceError> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| SourceError::Parse("no aggregate cpu line in stat".to_string()))?;

    let total: u64 = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|v| v.parse::<u64>().unwrap_or(0))
        .sum();

    let cpu_count = content
        .lines()
        .filter(|l| {
            l.strip_prefix("cpu")
                .is_some_and(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_digit()))
        })
        .count()
        .max(1) as u32;

    Ok((total, cpu_count))
}

/// One parsed `/proc/<pid>/stat` line
struct PidStat {
    name: String,
    /// utime + stime jiffies
    jiffies: u64,
    rss_pages: u64,
}

/// Parses a `/proc/<pid>/stat` line.
///
/// The comm field is parenthesized and may itself contain spaces and
/// parentheses, so the fields are split after the last `)`.
fn parse_pid_stat(content: &str) -> Result<PidStat, SourceError> {
    let open = content
        .find('(')
        .ok_or_else(|| SourceError::Parse("no comm in pid stat".to_string()))?;
    let close = content
        .rfind(')')
        .ok_or_else(|| SourceError::Parse("unterminated comm in pid stat".to_string()))?;
    let name = content[open + 1..close].to_string();

    // After the comm: state is overall field 3, utime 14, stime 15, rss 24
    let rest: Vec<&str> = content[close + 1..].split_whitespace().collect();
    if rest.len() < 22 {
        return Err(SourceError::Parse(
            "too few fields in pid stat".to_string(),
        ));
    }
    let utime: u64 = rest[11].parse().unwrap_or(0);
    let stime: u64 = rest[12].parse().unwrap_or(0);
    let rss_pages = rest[21].parse::<i64>().unwrap_or(0).max(0) as u64;

    Ok(PidStat {
        name,
        jiffies: utime + stime,
        rss_pages,
    })
}

/// Extracts the CPU model and core count from `/proc/cpuinfo`.
///
/// Falls back to the logical processor count when `cpu cores` is absent
/// (single-core or non-x86 hosts).
fn parse_cpuinfo(content: &str) -> (String, u32) {
    let model = content
        .lines()
        .find(|l| l.starts_with("model name"))
        .and_then(|l| l.split_once(':'))
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default();

    let cores: u32 = content
        .lines()
        .find(|l| l.starts_with("cpu cores"))
        .and_then(|l| l.split_once(':'))
        .and_then(|(_, v)| v.trim().parse().ok())
        .unwrap_or(0);

    let threads = content
        .lines()
        .filter(|l| l.starts_with("processor"))
        .count() as u32;

    let cores = if cores == 0 { threads } else { cores };
    (model, cores)
}

/// Extracts `NAME` and `VERSION_ID` from os-release content, falling back to
/// `VERSION` when `VERSION_ID` is absent
fn parse_os_release(content: &str) -> (String, String) {
    let mut name = None;
    let mut version_id = None;
    let mut version = None;

    for line in content.lines() {
        if let Some(val) = line.strip_prefix("NAME=") {
            name = Some(val.trim_matches('"').to_string());
        } else if let Some(val) = line.strip_prefix("VERSION_ID=") {
            version_id = Some(val.trim_matches('"').to_string());
        } else if let Some(val) = line.strip_prefix("VERSION=") {
            version = Some(val.trim_matches('"').to_string());
        }
    }

    (
        name.unwrap_or_default(),
        version_id.or(version).unwrap_or_default(),
    )
}
