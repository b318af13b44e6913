use async_trait::async_trait;
use chrono::Utc;
use corelib::Pair;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::Sender;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use super::BinanceBookTickerFeed;
use super::parser::{parse_book_ticker, symbol_map};
use crate::error::FeedError;
use crate::feed::MarketFeed;
use crate::types::FeedEvent;

#[async_trait]
impl MarketFeed for BinanceBookTickerFeed {
    /// Open one combined-stream connection and pump ticks until it dies or is cancelled.
    #[instrument(skip_all, fields(pairs = pairs.len()))]
    async fn stream(
        &self,
        pairs: &[Pair],
        sender: Sender<FeedEvent>,
        cancel: CancellationToken,
    ) -> Result<(), FeedError> {
        if pairs.is_empty() {
            cancel.cancelled().await;
            return Ok(());
        }

        let url = self.stream_url(pairs);
        let symbols = symbol_map(pairs);

        debug!(%url, "Connecting to Binance combined stream");

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            res = timeout(self.config.connect_timeout, connect_async(url.as_str())) => res,
        };

        let (ws, _) = match connected {
            Ok(res) => res.map_err(FeedError::from)?,
            Err(_) => {
                return Err(FeedError::Timeout(format!(
                    "handshake exceeded {:?}",
                    self.config.connect_timeout
                )));
            }
        };

        info!("Binance stream connected");

        if sender.send(FeedEvent::Connected).await.is_err() {
            debug!("Consumer dropped before first event; closing");
            return Ok(());
        }

        let (mut write, mut read) = ws.split();

        let ping_every = self.config.ping_interval;
        let mut ping = interval_at(Instant::now() + ping_every, ping_every);
        ping.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Set while a ping is unanswered.
        let mut pong_deadline: Option<Instant> = None;

        loop {
            let deadline = pong_deadline;

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Cancellation requested; closing stream");
                    let _ = timeout(self.config.pong_timeout, write.send(Message::Close(None))).await;
                    return Ok(());
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    return Err(FeedError::Timeout(format!(
                        "no pong within {:?}",
                        self.config.pong_timeout
                    )));
                }

                _ = ping.tick() => {
                    write
                        .send(Message::Ping(Default::default()))
                        .await
                        .map_err(FeedError::from)?;

                    if pong_deadline.is_none() {
                        pong_deadline = Some(Instant::now() + self.config.pong_timeout);
                    }
                    trace!("Ping sent");
                }

                frame = read.next() => {
                    let Some(frame) = frame else {
                        return Err(FeedError::Disconnected("stream ended".into()));
                    };

                    match frame.map_err(FeedError::from)? {
                        Message::Text(text) => {
                            match parse_book_ticker(text.as_str(), &symbols, Utc::now()) {
                                Ok(Some(tick)) => {
                                    if sender.send(FeedEvent::Tick(tick)).await.is_err() {
                                        debug!("Consumer dropped; closing stream");
                                        return Ok(());
                                    }
                                }
                                Ok(None) => debug!("Ignoring non-ticker frame"),
                                Err(e) => {
                                    warn!(error = %e, raw = %text.as_str(), "Skipping malformed frame")
                                }
                            }
                        }
                        Message::Pong(_) => {
                            pong_deadline = None;
                            trace!("Pong received");
                        }
                        Message::Ping(_) => trace!("Server ping (answered by transport)"),
                        Message::Close(frame) => {
                            return Err(FeedError::Disconnected(format!(
                                "closed by peer: {frame:?}"
                            )));
                        }
                        other => debug!(msg_type = ?other, "Ignoring non-text frame"),
                    }
                }
            }
        }
    }
}
