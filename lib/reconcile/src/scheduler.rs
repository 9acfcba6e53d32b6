use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::worker::Reconciler;

/// Runs reconciliation cycles on a fixed interval until cancelled.
///
/// Cycles are strictly sequential: the wait starts only after the previous
/// cycle, including all per-item processing, has finished. Cancellation is
/// cooperative; it is observed before each cycle and during the inter-cycle
/// wait, never mid-item, so an in-flight cycle always completes.
pub struct Scheduler {
    interval: Duration,
    monitor: bool,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            monitor: false,
        }
    }

    /// Log per-cycle wall-clock duration.
    #[must_use]
    pub fn with_monitor(mut self, monitor: bool) -> Self {
        self.monitor = monitor;
        self
    }

    pub async fn run(&self, reconciler: &Reconciler, shutdown: CancellationToken) {
        let mut cycle = 0u64;

        loop {
            if shutdown.is_cancelled() {
                break;
            }
            cycle += 1;

            let started = Instant::now();
            match reconciler.run_cycle().await {
                Ok(stats) => {
                    info!(
                        cycle,
                        fetched = stats.fetched,
                        already_published = stats.already_published,
                        published = stats.published,
                        failed = stats.failed,
                        "cycle finished"
                    );
                }
                // A failed cycle is logged and retried at the next interval;
                // it never poisons subsequent cycles.
                Err(e) => error!(cycle, error = %e, "cycle failed"),
            }
            if self.monitor {
                info!(cycle, elapsed_ms = started.elapsed().as_millis() as u64, "cycle timing");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.cancelled() => break,
            }
        }

        info!("scheduler stopped");
    }
}
