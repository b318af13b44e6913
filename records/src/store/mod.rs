pub mod memory;
pub mod sqlite_store;

use corelib::{Alert, AlertId};

use crate::error::RecordError;

/// Durable copy of the active alerts, keyed by alert id.
///
/// The engine never talks to this directly: the front end persists an alert
/// before arming it and deletes the record once the alert has fired.
#[async_trait::async_trait]
pub trait AlertRecordStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Alert>, RecordError>;
    async fn save(&self, alert: &Alert) -> Result<(), RecordError>;
    /// `Ok(false)` when there was no such record.
    async fn delete(&self, id: AlertId) -> Result<bool, RecordError>;
}
