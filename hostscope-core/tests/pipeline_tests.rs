//! Integration tests for the statistics pipeline
//!
//! Everything here goes through [`StatsPipeline`], the only surface
//! consumers are allowed to depend on. The mock source counts every fetch
//! so the concurrency and gating guarantees can be asserted directly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use hostscope_core::{
    MemorySample, NetworkSample, ProcessSample, StatsPipeline, StatsSettings, StatsSource,
    SystemIdentity, SOURCE_UNAVAILABLE_ERROR,
};

/// Counting stats source with a semaphore gate for holding fetches in flight
struct MockSource {
    available: bool,
    network_fails: bool,
    gate: Arc<Semaphore>,
    memory_calls: AtomicUsize,
    network_calls: AtomicUsize,
    identity_calls: AtomicUsize,
    process_calls: AtomicUsize,
}

impl MockSource {
    fn new() -> Self {
        Self {
            available: true,
            network_fails: false,
            gate: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
            memory_calls: AtomicUsize::new(0),
            network_calls: AtomicUsize::new(0),
            identity_calls: AtomicUsize::new(0),
            process_calls: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    fn without_network() -> Self {
        Self {
            network_fails: true,
            ..Self::new()
        }
    }

    /// A source whose memory fetch blocks until [`Self::release`]
    fn gated() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            ..Self::new()
        }
    }

    fn release(&self) {
        self.gate.add_permits(1000);
    }

    fn memory_calls(&self) -> usize {
        self.memory_calls.load(Ordering::SeqCst)
    }

    fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    fn process_calls(&self) -> usize {
        self.process_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for MockSource {
    fn is_capability_present(&self) -> bool {
        self.available
    }

    async fn fetch_memory(&self) -> Option<MemorySample> {
        // used_bytes equals the 1-based call index, so tests can tell which
        // tick produced a given history point
        let call = self.memory_calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        let permit = self.gate.acquire().await.ok()?;
        drop(permit);
        Some(MemorySample::from_total_free(1000, 1000 - call))
    }

    async fn fetch_network(&self) -> Option<NetworkSample> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        if self.network_fails {
            return None;
        }
        Some(NetworkSample {
            rx_bytes_total: 4096,
            tx_bytes_total: 2048,
            rx_bytes_per_sec: 128.0,
            tx_bytes_per_sec: 64.0,
        })
    }

    async fn fetch_system_identity(&self) -> Option<SystemIdentity> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        Some(SystemIdentity {
            cpu_model: "Mock CPU".to_string(),
            cpu_core_count: 4,
            os_name: "MockOS".to_string(),
            os_version: "1.0".to_string(),
            hostname: "mockhost".to_string(),
        })
    }

    async fn fetch_top_processes(&self, count: usize) -> Option<Vec<ProcessSample>> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        Some(
            (0..count.min(3) as u32)
                .map(|i| ProcessSample {
                    pid: 100 + i,
                    name: format!("proc{i}"),
                    cpu_percent: f64::from(50 - i as i32),
                    memory_bytes: 1024,
                    memory_percent: 1.0,
                })
                .collect(),
        )
    }
}

fn manual_settings(max_history_length: usize) -> StatsSettings {
    StatsSettings {
        auto_start: false,
        max_history_length,
        ..Default::default()
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_overlapping_refresh_fetches_once() {
    let source = Arc::new(MockSource::gated());
    let pipeline = Arc::new(StatsPipeline::new(
        Arc::clone(&source) as Arc<dyn StatsSource>,
        manual_settings(60),
    ));

    let first = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.refresh_stats().await }
    });
    wait_until(|| source.memory_calls() == 1).await;

    // Second trigger while the first cycle is held at the gate: dropped
    pipeline.refresh_stats().await;
    assert_eq!(source.memory_calls(), 1);
    assert_eq!(source.network_calls(), 1);
    assert_eq!(source.process_calls(), 1);

    source.release();
    first.await.unwrap();

    assert_eq!(pipeline.history().len(), 1);
    assert!(!pipeline.is_loading());
}

#[tokio::test]
async fn test_unavailable_source_short_circuits() {
    let source = Arc::new(MockSource::unavailable());
    let pipeline = StatsPipeline::new(
        Arc::clone(&source) as Arc<dyn StatsSource>,
        StatsSettings::default(),
    );

    // Polling never starts without the capability, even with auto_start
    assert!(!pipeline.is_available());
    assert!(!pipeline.is_polling());

    pipeline.refresh_stats().await;

    assert_eq!(pipeline.error().as_deref(), Some(SOURCE_UNAVAILABLE_ERROR));
    assert!(!pipeline.is_loading());
    assert!(pipeline.memory().is_none());
    assert!(pipeline.history().is_empty());
    assert!(pipeline.system_identity().await.is_none());
    assert_eq!(source.memory_calls(), 0);
    assert_eq!(source.network_calls(), 0);
    assert_eq!(source.process_calls(), 0);
    assert_eq!(source.identity_calls(), 0);
}

#[tokio::test]
async fn test_partial_fetch_failure_is_not_an_error() {
    let source = Arc::new(MockSource::without_network());
    let pipeline = StatsPipeline::new(
        Arc::clone(&source) as Arc<dyn StatsSource>,
        manual_settings(60),
    );

    pipeline.refresh_stats().await;

    assert!(pipeline.error().is_none());
    assert!(pipeline.memory().is_some());
    assert!(pipeline.network().is_none());

    let history = pipeline.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].memory.is_some());
    assert!(history[0].network.is_none());
}

#[tokio::test]
async fn test_history_keeps_most_recent_ticks() {
    let source = Arc::new(MockSource::new());
    let pipeline = StatsPipeline::new(
        Arc::clone(&source) as Arc<dyn StatsSource>,
        manual_settings(3),
    );

    for _ in 0..5 {
        pipeline.refresh_stats().await;
    }

    let history = pipeline.history();
    assert_eq!(history.len(), 3);
    // The mock stamps used_bytes with the tick number: ticks 3, 4, 5 remain
    let used: Vec<u64> = history
        .iter()
        .map(|p| p.memory.unwrap().used_bytes)
        .collect();
    assert_eq!(used, vec![3, 4, 5]);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_identity_fetched_once_across_ticks() {
    let source = Arc::new(MockSource::new());
    let pipeline = StatsPipeline::new(
        Arc::clone(&source) as Arc<dyn StatsSource>,
        manual_settings(60),
    );

    for _ in 0..10 {
        pipeline.refresh_stats().await;
    }

    let identity = pipeline.system_identity().await.unwrap();
    assert_eq!(identity.hostname, "mockhost");
    // Re-reading joins the cached one-shot fetch
    let again = pipeline.system_identity().await.unwrap();
    assert_eq!(identity, again);
    assert_eq!(source.identity_calls(), 1);
}

#[tokio::test]
async fn test_clear_history_is_idempotent() {
    let source = Arc::new(MockSource::new());
    let pipeline = StatsPipeline::new(
        Arc::clone(&source) as Arc<dyn StatsSource>,
        manual_settings(60),
    );

    pipeline.refresh_stats().await;
    assert_eq!(pipeline.history().len(), 1);

    pipeline.clear_history();
    assert!(pipeline.history().is_empty());
    pipeline.clear_history();
    assert!(pipeline.history().is_empty());

    // Snapshot fields survive a clear
    assert!(pipeline.memory().is_some());
    assert!(pipeline.error().is_none());

    pipeline.refresh_stats().await;
    assert_eq!(pipeline.history().len(), 1);
}

#[tokio::test]
async fn test_clear_during_inflight_refresh_appends_fresh_point() {
    let gated = Arc::new(MockSource::gated());
    let pipeline = Arc::new(StatsPipeline::new(
        Arc::clone(&gated) as Arc<dyn StatsSource>,
        manual_settings(60),
    ));
    let inflight = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.refresh_stats().await }
    });
    wait_until(|| gated.memory_calls() == 1).await;

    pipeline.clear_history();
    assert!(pipeline.history().is_empty());

    gated.release();
    inflight.await.unwrap();

    // The in-flight result lands in the cleared buffer, nothing resurrected
    assert_eq!(pipeline.history().len(), 1);
}

#[tokio::test]
async fn test_top_processes_reranking() {
    use hostscope_core::ProcessSortKey;

    let source = Arc::new(MockSource::new());
    let pipeline = StatsPipeline::new(
        Arc::clone(&source) as Arc<dyn StatsSource>,
        manual_settings(60),
    );
    pipeline.refresh_stats().await;

    let by_cpu = pipeline.top_processes().unwrap();
    assert_eq!(by_cpu.len(), 3);
    assert!(by_cpu[0].cpu_percent >= by_cpu[1].cpu_percent);

    let by_memory = pipeline.top_processes_by(ProcessSortKey::Memory).unwrap();
    assert_eq!(by_memory.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_auto_start_polls_and_shutdown_stops() {
    let source = Arc::new(MockSource::new());
    let settings = StatsSettings {
        poll_interval_ms: 1000,
        ..Default::default()
    };
    let mut pipeline = StatsPipeline::new(Arc::clone(&source) as Arc<dyn StatsSource>, settings);
    assert!(pipeline.is_polling());

    tokio::time::sleep(std::time::Duration::from_millis(3500)).await;
    let ticks = source.memory_calls();
    assert!(ticks >= 3, "expected at least 3 ticks, got {ticks}");
    assert!(!pipeline.is_loading());
    assert!(!pipeline.history().is_empty());

    pipeline.shutdown().await;
    assert!(!pipeline.is_polling());
    let settled = source.memory_calls();
    tokio::time::sleep(std::time::Duration::from_millis(3000)).await;
    assert_eq!(source.memory_calls(), settled);
}

#[tokio::test]
async fn test_null_source_degrades_to_unavailable() {
    use hostscope_core::NullStatsSource;

    let pipeline = StatsPipeline::with_defaults(Arc::new(NullStatsSource));
    assert!(!pipeline.is_available());
    assert!(!pipeline.is_polling());
    // Unavailability is known at construction, before any refresh
    assert_eq!(pipeline.error().as_deref(), Some(SOURCE_UNAVAILABLE_ERROR));

    let snapshot = pipeline.snapshot();
    assert!(!snapshot.is_available);
    assert!(snapshot.memory.is_none());
    assert!(snapshot.history.is_empty());
}
