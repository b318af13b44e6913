//! Wall-clock aligned liveness reports.
//!
//! Reports land on local-time boundaries that are multiples of the step
//! (e.g. :00, :20, :40 for a 20 minute step), a little after the boundary
//! so the report never precedes it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::collaborator::{AlertCollaborator, HeartbeatReport};
use crate::error::EngineError;
use crate::state::Shared;

/// Added to every wait so the report lands after the boundary.
pub const SETTLE_MARGIN: Duration = Duration::from_millis(500);

/// Time from `now` to the next boundary strictly after it.
pub fn until_next_boundary<Tz: TimeZone>(now: &DateTime<Tz>, step: Duration) -> Duration {
    let step_ms = (step.as_millis() as u64).max(1);
    let since_midnight_ms = u64::from(now.num_seconds_from_midnight()) * 1_000
        + u64::from(now.nanosecond() % 1_000_000_000) / 1_000_000;

    Duration::from_millis(step_ms - since_midnight_ms % step_ms)
}

pub(crate) struct HeartbeatMonitor {
    shared: Arc<Shared>,
    collaborator: Arc<dyn AlertCollaborator>,
    step: Duration,
}

impl HeartbeatMonitor {
    pub fn new(
        shared: Arc<Shared>,
        collaborator: Arc<dyn AlertCollaborator>,
        step: Duration,
    ) -> Self {
        Self {
            shared,
            collaborator,
            step,
        }
    }

    pub async fn snapshot(&self) -> HeartbeatReport {
        let at = Utc::now();
        let last_tick = *self.shared.last_tick.lock();
        let last_tick_age = last_tick.and_then(|last| (at - last).to_std().ok());

        HeartbeatReport {
            at,
            last_tick_age,
            watched_pairs: self.shared.watched_pairs().await.len(),
            stream_state: self.shared.stream_state(),
        }
    }

    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), EngineError> {
        loop {
            let wait = until_next_boundary(&Local::now(), self.step) + SETTLE_MARGIN;
            debug!(?wait, "Next heartbeat scheduled");

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Ok(()),
                _ = sleep(wait) => {}
            }

            let report = self.snapshot().await;
            info!(
                watched_pairs = report.watched_pairs,
                last_tick_age = ?report.last_tick_age,
                stream_state = %report.stream_state,
                "Heartbeat"
            );

            if let Err(e) = self.collaborator.report_heartbeat(&report).await {
                error!(error = ?e, "Heartbeat delivery failed");
                return Err(EngineError::Heartbeat(format!("{e:#}")));
            }
        }
    }
}
