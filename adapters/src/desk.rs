//! AlertDesk
//!
//! Intake service shared by every text front end. Alerts are persisted
//! before they are armed, so a crash between the two steps can only leave
//! an alert that is re-armed on the next start, never a live alert without
//! a record.

use std::sync::Arc;

use corelib::{Alert, AlertId, AlertRequest, OriginRef};
use engine::AlertEngine;
use records::{AlertRecordStore, RecordError};
use tracing::{info, warn};

use crate::command::{Command, USAGE, parse_command};
use crate::format::{alert_label, alert_line};

pub struct AlertDesk {
    engine: Arc<AlertEngine>,
    records: Arc<dyn AlertRecordStore>,
}

impl AlertDesk {
    pub fn new(engine: Arc<AlertEngine>, records: Arc<dyn AlertRecordStore>) -> Self {
        Self { engine, records }
    }

    /// Re-arm every persisted alert.
    pub async fn restore(&self) -> Result<usize, RecordError> {
        let alerts = self.records.load_all().await?;
        Ok(self.engine.restore(alerts).await)
    }

    pub async fn add(&self, request: AlertRequest) -> Result<Alert, RecordError> {
        let mut alert = Alert::new(request.pair, request.threshold, None);
        alert.origin = Some(OriginRef::new(alert.id.to_string()));

        self.records.save(&alert).await?;
        self.engine.track(alert.clone()).await;
        Ok(alert)
    }

    /// `true` if the alert was armed or had a record.
    pub async fn remove(&self, id: AlertId) -> Result<bool, RecordError> {
        let disarmed = self.engine.remove_alert(id).await;
        let deleted = self.records.delete(id).await?;
        if disarmed != deleted {
            warn!(alert_id = %id, disarmed, deleted, "Engine and records disagreed on alert");
        }
        Ok(disarmed || deleted)
    }

    pub async fn list(&self) -> Vec<Alert> {
        self.engine.list_alerts().await
    }

    /// Parse and run one line of user input, returning the reply text.
    pub async fn handle(&self, line: &str) -> String {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => return format!("❌ {e}"),
        };

        match self.execute(command).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Command failed");
                format!("❌ could not save: {e}")
            }
        }
    }

    async fn execute(&self, command: Command) -> Result<String, RecordError> {
        match command {
            Command::Add(request) => {
                let alert = self.add(request).await?;
                info!(alert_id = %alert.id, pair = %alert.pair, "Alert added");
                Ok(format!(
                    "✅ {} (id {})",
                    alert_label(&alert.pair, alert.threshold),
                    alert.id
                ))
            }
            Command::Remove(id) => Ok(if self.remove(id).await? {
                format!("🗑️ removed {id}")
            } else {
                format!("no alert with id {id}")
            }),
            Command::List => {
                let alerts = self.list().await;
                if alerts.is_empty() {
                    return Ok("no active alerts".to_string());
                }
                Ok(alerts.iter().map(alert_line).collect::<Vec<_>>().join("\n"))
            }
            Command::Help => Ok(USAGE.to_string()),
        }
    }
}
