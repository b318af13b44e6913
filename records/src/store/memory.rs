use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use corelib::{Alert, AlertId};
use tokio::sync::Mutex;

use super::AlertRecordStore;
use crate::error::RecordError;

/// Non-durable store for tests and dry runs.
#[derive(Default, Clone)]
pub struct InMemoryAlertRecordStore {
    pub map: Arc<Mutex<HashMap<AlertId, Alert>>>,
}

impl InMemoryAlertRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertRecordStore for InMemoryAlertRecordStore {
    async fn load_all(&self) -> Result<Vec<Alert>, RecordError> {
        let mut alerts: Vec<Alert> = self.map.lock().await.values().cloned().collect();
        alerts.sort_by_key(|a| a.created_at);
        Ok(alerts)
    }

    async fn save(&self, alert: &Alert) -> Result<(), RecordError> {
        self.map.lock().await.insert(alert.id, alert.clone());
        Ok(())
    }

    async fn delete(&self, id: AlertId) -> Result<bool, RecordError> {
        Ok(self.map.lock().await.remove(&id).is_some())
    }
}
