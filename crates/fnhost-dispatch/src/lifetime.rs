//! Host lifetime — the hook used to stop the whole process.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::warn;

/// The hosting runtime's stop hook.
///
/// Called when the host can no longer make progress and should be
/// restarted from scratch. Implementations must not block.
pub trait ApplicationLifetime: Send + Sync {
    fn stop_application(&self) -> anyhow::Result<()>;
}

/// Stop signal for an in-process host.
///
/// The first `stop_application` call flips a watch channel that the
/// daemon's main loop selects on; later calls are no-ops.
#[derive(Debug)]
pub struct HostLifetime {
    stopping: AtomicBool,
    stop_tx: watch::Sender<bool>,
}

impl HostLifetime {
    pub fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            stopping: AtomicBool::new(false),
            stop_tx,
        }
    }

    /// Whether a stop has been requested.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Receiver that flips to `true` once a stop is requested.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stop_tx.subscribe()
    }

    /// Resolves once a stop has been requested.
    pub async fn stop_requested(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|stopping| *stopping).await;
    }
}

impl Default for HostLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationLifetime for HostLifetime {
    fn stop_application(&self) -> anyhow::Result<()> {
        if self.stopping.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        warn!("host stop requested");
        self.stop_tx.send_replace(true);
        Ok(())
    }
}
