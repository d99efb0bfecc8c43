//! Interval-driven poll scheduler
//!
//! Spawns a task that runs one refresh cycle per tick until stopped. The
//! store's own guard keeps overlapping cycles out, so a slow cycle simply
//! causes later ticks to be dropped rather than queued.
//!
//! No timeout bounds an individual fetch: a fetch that never settles keeps
//! the store's guard held and silently blocks every subsequent tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::store::StatsStore;

/// Handle to a running poller
#[derive(Debug)]
pub struct PollerHandle {
    /// Send to stop the poller; dropping the handle stops it too
    stop_tx: mpsc::Sender<()>,
}

impl PollerHandle {
    /// Signals the poller to stop.
    ///
    /// An in-flight refresh cycle still settles; no further ticks fire.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(()).await;
    }
}

/// Starts a poll loop driving `store` every `interval`.
///
/// The first tick fires immediately. Returns a handle that stops the loop;
/// the loop also exits when every handle has been dropped.
pub fn start_poller(store: Arc<StatsStore>, interval: Duration) -> PollerHandle {
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    // Some(()) is an explicit stop, None means the handle
                    // was dropped; both end the session
                    tracing::debug!("poller stopped");
                    break;
                }
                _ = ticker.tick() => {
                    store.refresh().await;
                }
            }
        }
    });

    PollerHandle { stop_tx }
}
