use std::sync::Arc;
use std::time::Duration;

use common::logger::warn_if_slow;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::collaborator::{AlertCollaborator, DeleteOutcome, Firing};
use crate::counters::Counters;

/// Delivers retired alerts to the collaborator, one firing at a time.
///
/// Firings arrive already removed from the store, so nothing here can make
/// an alert fire twice. Delivery runs outside the connection tasks and
/// survives resubscriptions.
pub struct NotificationDispatcher {
    collaborator: Arc<dyn AlertCollaborator>,
    counters: Counters,
    slow_call: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        collaborator: Arc<dyn AlertCollaborator>,
        counters: Counters,
        slow_call: Duration,
    ) -> Self {
        Self {
            collaborator,
            counters,
            slow_call,
        }
    }

    /// Main loop: deliver until shutdown, then drain what is already queued.
    pub async fn run(self, mut rx: UnboundedReceiver<Firing>, shutdown: CancellationToken) {
        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                f = rx.recv() => f,
            };
            match next {
                Some(firing) => self.deliver(&firing).await,
                None => return,
            }
        }

        while let Ok(firing) = rx.try_recv() {
            self.deliver(&firing).await;
        }
        debug!("Dispatcher drained");
    }

    #[instrument(skip_all, fields(alert_id = %firing.alert.id, pair = %firing.alert.pair))]
    pub async fn deliver(&self, firing: &Firing) {
        let notified = warn_if_slow(
            "notify_crossed",
            self.slow_call,
            self.collaborator.notify_crossed(firing),
        )
        .await;

        if let Err(e) = notified {
            Counters::bump(&self.counters.notify_failures);
            warn!(error = ?e, "Crossing notification failed; not retried");
        }

        let Some(origin) = &firing.alert.origin else {
            return;
        };

        match self.collaborator.delete_origin_record(origin).await {
            Ok(DeleteOutcome::Deleted) => debug!(%origin, "Origin record deleted"),
            Ok(DeleteOutcome::NotFound) => debug!(%origin, "Origin record already gone"),
            Err(e) => warn!(%origin, error = ?e, "Failed to delete origin record"),
        }
    }
}
