// Periodic passes (watch mode)

use super::NotifyService;
use crate::application::shutdown::ShutdownToken;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// Runs a pass every `period` until shutdown.
///
/// Passes never overlap: the next tick is awaited only after the current
/// pass finished. A failed pass is logged and the loop keeps going.
pub struct NotifyScheduler {
    service: Arc<NotifyService>,
    period: Duration,
}

impl NotifyScheduler {
    pub fn new(service: Arc<NotifyService>, period: Duration) -> Self {
        Self { service, period }
    }

    /// Returns the number of passes started
    pub async fn run(&self, mut shutdown: ShutdownToken) -> usize {
        info!(period_secs = self.period.as_secs(), "Notify scheduler started");

        let mut tick = interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0;

        loop {
            if shutdown.is_shutdown() {
                break;
            }
            tokio::select! {
                _ = tick.tick() => {},
                _ = shutdown.wait() => {
                    info!("Notify scheduler interrupted while idle");
                    break;
                }
            }

            passes += 1;
            match self.service.run_pass().await {
                Ok(report) if report.is_clean() => {}
                Ok(report) => warn!(
                    run_id = %report.run_id,
                    failures = report.dispatch.failures(),
                    "Pass finished with delivery failures"
                ),
                Err(e) => error!(error = %e, "Pass aborted"),
            }
        }

        info!(passes = passes, "Notify scheduler stopped");
        passes
    }
}
