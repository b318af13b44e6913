use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Discord rejects message bodies longer than this.
pub const MAX_CONTENT_CHARS: usize = 2_000;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Posts `{"content": "..."}` messages to a chat webhook.
#[derive(Clone)]
pub struct WebhookClient {
    http: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: String) -> Result<Self, WebhookError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }

    #[instrument(skip_all, level = "debug")]
    pub async fn post(&self, content: &str) -> Result<(), WebhookError> {
        let content = truncate(content, MAX_CONTENT_CHARS);

        self.http
            .post(&self.url)
            .json(&WebhookMessage { content })
            .send()
            .await?
            .error_for_status()?;

        debug!(chars = content.chars().count(), "webhook message delivered");
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
