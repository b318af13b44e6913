use market::FeedError;
use thiserror::Error;

/// Reasons the engine stops. Every variant ends `AlertEngine::run`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("market feed failed: {0}")]
    Feed(#[from] FeedError),

    #[error("stream task crashed: {0}")]
    StreamTask(String),

    #[error("heartbeat delivery failed: {0}")]
    Heartbeat(String),

    #[error("engine is already running")]
    AlreadyRunning,
}
