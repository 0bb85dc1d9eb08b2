//! Background polling infrastructure.
//!
//! Every live-data widget in the dashboard is fed by a [`PollingLoop`]: a
//! cancellable fixed-interval task on the tokio runtime. Probe outcomes are
//! delivered to the UI thread over an unbounded channel as [`Update`]
//! messages, drained once per frame.

pub mod health;
pub mod status;

pub use health::{HealthMonitor, HealthSignal, IntelligenceSignal, ProbePeriods};
pub use status::{EdgeDetector, StatusWatcher};

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::data::Report;

/// A poll outcome delivered to the UI thread.
#[derive(Debug)]
pub enum Update {
    /// System backend probe result.
    SystemHealth {
        signal: HealthSignal,
        service: Option<String>,
    },
    /// Intelligence endpoint probe result.
    Intelligence(IntelligenceSignal),
    /// Latest raw job-status label.
    JobStatus(String),
    /// A run just transitioned back to Idle; the reports list is stale.
    RunFinished,
    /// Fresh reports list from a background refresh.
    Reports(Vec<Report>),
}

/// A cancellable fixed-interval repeating task.
///
/// The probe closure is invoked once immediately on spawn and then at each
/// interval boundary. Ticks are scheduled wall-clock
/// ([`MissedTickBehavior::Skip`]): a probe slower than the period delays
/// only itself and missed ticks are skipped, never replayed in a burst. A
/// failing probe invocation never stops the loop — the closure owns its own
/// error handling.
///
/// Stopping is idempotent and releases the timer; dropping the loop also
/// stops it, so no polling survives the owning component's teardown.
/// Re-configuring probe or interval means stopping this loop and spawning a
/// new one.
#[derive(Debug)]
pub struct PollingLoop {
    handle: JoinHandle<()>,
}

impl PollingLoop {
    /// Spawn a loop invoking `probe` at the given cadence.
    ///
    /// Must be called from within a tokio runtime context.
    pub fn spawn<F, Fut>(period: Duration, mut probe: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                probe().await;
            }
        });
        Self { handle }
    }

    /// Stop the loop. Idempotent; no further probe invocations occur after
    /// this returns.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_loop_fires_immediately_then_on_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let probe_count = count.clone();
        let _loop = PollingLoop::spawn(Duration::from_secs(10), move || {
            let c = probe_count.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        // First tick is immediate.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_invocations() {
        let count = Arc::new(AtomicUsize::new(0));
        let probe_count = count.clone();
        let polling = PollingLoop::spawn(Duration::from_secs(5), move || {
            let c = probe_count.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        polling.stop();
        // Stop is idempotent.
        polling.stop();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        let probe_count = count.clone();
        {
            let _loop = PollingLoop::spawn(Duration::from_secs(5), move || {
                let c = probe_count.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
