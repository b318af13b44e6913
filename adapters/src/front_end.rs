//! WebhookFrontEnd
//!
//! `AlertCollaborator` for a chat-webhook deployment:
//!   • crossings and fatal errors go to the alerts webhook
//!   • heartbeats go to the logs webhook
//!   • an alert's origin is its durable record, deleted once it fires
//!
//! A missing webhook URL means "log only".

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use corelib::{AlertId, OriginRef};
use engine::{AlertCollaborator, DeleteOutcome, Firing, HeartbeatReport};
use records::AlertRecordStore;
use tracing::{error, info, warn};

use crate::format::{crossing_message, fatal_message, heartbeat_message};
use crate::webhook::WebhookClient;

pub struct WebhookFrontEnd {
    alerts: Option<WebhookClient>,
    logs: Option<WebhookClient>,
    records: Arc<dyn AlertRecordStore>,
    /// Chat user id pinged on crossings and fatal errors.
    mention: Option<String>,
}

impl WebhookFrontEnd {
    pub fn new(
        alerts: Option<WebhookClient>,
        logs: Option<WebhookClient>,
        records: Arc<dyn AlertRecordStore>,
        mention: Option<String>,
    ) -> Self {
        Self {
            alerts,
            logs,
            records,
            mention,
        }
    }
}

#[async_trait]
impl AlertCollaborator for WebhookFrontEnd {
    async fn notify_crossed(&self, firing: &Firing) -> anyhow::Result<()> {
        let text = crossing_message(firing, self.mention.as_deref());

        match &self.alerts {
            Some(hook) => hook.post(&text).await?,
            None => info!(message = %text, "Crossing (no alerts webhook configured)"),
        }
        Ok(())
    }

    async fn delete_origin_record(&self, origin: &OriginRef) -> anyhow::Result<DeleteOutcome> {
        let Ok(id) = AlertId::from_str(origin.as_str()) else {
            warn!(%origin, "Origin is not an alert record; nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        };

        if self.records.delete(id).await? {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn report_heartbeat(&self, report: &HeartbeatReport) -> anyhow::Result<()> {
        if let Some(hook) = &self.logs {
            hook.post(&heartbeat_message(report)).await?;
        }
        Ok(())
    }

    async fn report_fatal(&self, message: &str) {
        let Some(hook) = &self.alerts else {
            return;
        };
        if let Err(e) = hook.post(&fatal_message(message, self.mention.as_deref())).await {
            error!(error = %e, "Failed to report fatal error");
        }
    }
}
