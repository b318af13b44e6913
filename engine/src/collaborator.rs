//! The engine's outbound seam.
//!
//! Everything user-facing (chat front end, webhooks, the durable record
//! store) sits behind [`AlertCollaborator`]. The engine decides *when* to
//! call it; implementations decide *how* to deliver.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corelib::{Alert, Direction, OriginRef};

use crate::subscription::StreamState;

/// An alert that has crossed its threshold and was retired.
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub alert: Alert,
    pub direction: Direction,
    pub previous: f64,
    pub price: f64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Already gone; treated as success.
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatReport {
    pub at: DateTime<Utc>,
    /// `None` until the first tick of the process arrives.
    pub last_tick_age: Option<Duration>,
    pub watched_pairs: usize,
    pub stream_state: StreamState,
}

#[async_trait]
pub trait AlertCollaborator: Send + Sync + 'static {
    /// Deliver a crossing notification. Failures are logged, never retried.
    async fn notify_crossed(&self, firing: &Firing) -> anyhow::Result<()>;

    /// Remove the external record the alert was created from.
    async fn delete_origin_record(&self, origin: &OriginRef) -> anyhow::Result<DeleteOutcome>;

    /// Periodic liveness report. An error here stops the engine.
    async fn report_heartbeat(&self, report: &HeartbeatReport) -> anyhow::Result<()>;

    /// Best-effort last word before the engine stops on a fatal error.
    async fn report_fatal(&self, message: &str);
}
