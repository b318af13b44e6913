use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Why a feed connection ended.
///
/// The subscription manager picks its reaction from the variant: the first
/// three are retried, `Fatal` stops the engine.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("connection dropped: {0}")]
    Disconnected(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("connection rejected: {0}")]
    Rejected(String),

    #[error("unrecoverable feed error: {0}")]
    Fatal(String),
}

impl FeedError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, FeedError::Fatal(_))
    }

    /// Delay before the next attempt for retryable errors, `None` for fatal ones.
    pub fn retry_after(&self, reconnect: Duration, rejected: Duration) -> Option<Duration> {
        match self {
            FeedError::Disconnected(_) | FeedError::Timeout(_) => Some(reconnect),
            FeedError::Rejected(_) => Some(rejected),
            FeedError::Fatal(_) => None,
        }
    }
}

impl From<tungstenite::Error> for FeedError {
    fn from(err: tungstenite::Error) -> Self {
        use tungstenite::Error;

        match err {
            Error::ConnectionClosed | Error::AlreadyClosed => {
                FeedError::Disconnected(err.to_string())
            }
            Error::Io(e) => FeedError::Disconnected(e.to_string()),
            Error::Protocol(e) => FeedError::Disconnected(e.to_string()),
            // A broken frame poisons the connection, not the feed.
            Error::Utf8(e) => FeedError::Disconnected(format!("bad frame: {e}")),
            Error::Capacity(e) => FeedError::Disconnected(format!("oversized frame: {e}")),
            Error::Tls(e) => FeedError::Rejected(format!("tls: {e}")),
            Error::Http(response) => {
                FeedError::Rejected(format!("http status {}", response.status()))
            }
            other => FeedError::Fatal(other.to_string()),
        }
    }
}

/// A single message that did not have the expected shape. Skipped, never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(String),

    #[error("unexpected payload shape: {0}")]
    Shape(String),

    #[error("invalid ask price '{0}'")]
    Price(String),

    #[error("symbol '{0}' is not subscribed")]
    UnknownSymbol(String),
}
