use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt alert row '{id}': {reason}")]
    CorruptRow { id: String, reason: String },
}
