//! AlertEngine
//!
//! Public facade over the alert registry, the market stream and the
//! outbound collaborator. Arc-managed so the long-lived tasks started by
//! [`AlertEngine::run`] and the callers of add/remove share one instance.

use std::collections::BTreeSet;
use std::sync::Arc;

use corelib::{Alert, AlertId, AlertRequest, OriginRef, Pair};
use market::MarketFeed;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::collaborator::{AlertCollaborator, Firing};
use crate::config::EngineConfig;
use crate::counters::Counters;
use crate::dispatcher::NotificationDispatcher;
use crate::error::EngineError;
use crate::heartbeat::HeartbeatMonitor;
use crate::state::Shared;
use crate::subscription::{StreamState, StreamSubscriptionManager};

pub struct AlertEngine {
    shared: Arc<Shared>,
    feed: Arc<dyn MarketFeed>,
    collaborator: Arc<dyn AlertCollaborator>,
    config: EngineConfig,
    /// Taken by the first call to `run`.
    firings_rx: parking_lot::Mutex<Option<mpsc::UnboundedReceiver<Firing>>>,
}

impl AlertEngine {
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        collaborator: Arc<dyn AlertCollaborator>,
        config: EngineConfig,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            shared: Arc::new(Shared::new(tx)),
            feed,
            collaborator,
            config,
            firings_rx: parking_lot::Mutex::new(Some(rx)),
        })
    }

    /// Load alerts persisted by a previous run. Ids are kept.
    pub async fn restore(&self, alerts: impl IntoIterator<Item = Alert>) -> usize {
        let mut restored = 0;
        for alert in alerts {
            self.track(alert).await;
            restored += 1;
        }
        info!(restored, "Alerts restored");
        restored
    }

    /// Create and arm a new alert.
    pub async fn add_alert(&self, request: AlertRequest, origin: Option<OriginRef>) -> AlertId {
        self.track(Alert::new(request.pair, request.threshold, origin))
            .await
    }

    /// Arm an alert that was created (and possibly persisted) elsewhere.
    pub async fn track(&self, alert: Alert) -> AlertId {
        let pair = alert.pair.clone();
        let threshold = alert.threshold;

        let outcome = self.shared.state.lock().await.alerts.add(alert);

        info!(alert_id = %outcome.id, %pair, threshold, "Alert armed");
        if outcome.first_for_pair {
            debug!(%pair, "First alert on pair; resubscribing");
            self.shared.request_restart();
        }
        outcome.id
    }

    /// Disarm an alert. `false` when it was unknown or already fired.
    pub async fn remove_alert(&self, id: AlertId) -> bool {
        let removed = self.shared.state.lock().await.retire(id);

        let Some(removed) = removed else {
            debug!(alert_id = %id, "Remove requested for unknown alert");
            return false;
        };

        info!(alert_id = %id, pair = %removed.alert.pair, "Alert removed");
        if removed.pair_emptied {
            self.shared.request_restart();
        }
        true
    }

    pub async fn get_alert(&self, id: AlertId) -> Option<Alert> {
        self.shared.state.lock().await.alerts.get(id).cloned()
    }

    pub async fn list_alerts(&self) -> Vec<Alert> {
        self.shared.state.lock().await.alerts.list()
    }

    pub async fn watched_pairs(&self) -> BTreeSet<Pair> {
        self.shared.watched_pairs().await
    }

    pub fn stream_state(&self) -> StreamState {
        self.shared.stream_state()
    }

    pub fn subscribe_stream_state(&self) -> watch::Receiver<StreamState> {
        self.shared.stream_state.subscribe()
    }

    pub fn counters(&self) -> &Counters {
        &self.shared.counters
    }

    /// Run the stream, the dispatcher and the heartbeat until `shutdown`
    /// fires or one of them fails.
    ///
    /// A failure is reported to the collaborator before it is returned.
    #[instrument(skip_all)]
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) -> Result<(), EngineError> {
        let Some(firings_rx) = self.firings_rx.lock().take() else {
            return Err(EngineError::AlreadyRunning);
        };

        let token = shutdown.child_token();

        let manager = StreamSubscriptionManager::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.feed),
            self.config.clone(),
        );
        let heartbeat = HeartbeatMonitor::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.collaborator),
            self.config.heartbeat_step,
        );
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&self.collaborator),
            self.shared.counters.clone(),
            self.config.slow_call,
        );

        info!("Alert engine started");

        // Whichever side finishes first takes the others down with it.
        let (streamed, beat, ()) = tokio::join!(
            async {
                let r = manager.run(token.clone()).await;
                token.cancel();
                r
            },
            async {
                let r = heartbeat.run(token.clone()).await;
                token.cancel();
                r
            },
            dispatcher.run(firings_rx, token.clone()),
        );

        match streamed.and(beat) {
            Ok(()) => {
                info!("Alert engine stopped");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Alert engine stopped on fatal error");
                self.collaborator.report_fatal(&e.to_string()).await;
                Err(e)
            }
        }
    }
}
