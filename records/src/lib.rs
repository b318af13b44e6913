pub mod error;
pub mod store;

pub use error::RecordError;
pub use store::AlertRecordStore;
pub use store::memory::InMemoryAlertRecordStore;
pub use store::sqlite_store::SqliteAlertRecordStore;
