//! StreamSubscriptionManager
//!
//! Keeps exactly one market connection alive for the current set of
//! watched pairs.
//!
//! Lifecycle:
//!   • No pairs: stay `Idle`, re-check on every restart request or `idle_poll`
//!   • Pairs: spawn one connection task under a child cancellation token
//!   • Pair set changed: cancel, wait for the old task to exit (abort after
//!     `restart_grace`), then reconnect with the new set
//!   • Retryable feed error: back off, reconnect
//!   • Fatal feed error or crashed task: return `EngineError`

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use corelib::Pair;
use market::{FeedError, FeedEvent, MarketFeed};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::EngineConfig;
use crate::counters::Counters;
use crate::error::EngineError;
use crate::state::Shared;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamState {
    /// No watched pairs, no connection.
    Idle,
    /// A connection task is running but has not confirmed the handshake.
    Connecting,
    /// Ticks are flowing.
    Streaming,
    /// Tearing down the current connection to resubscribe.
    Restarting,
    /// Shut down.
    Stopped,
}

impl StreamState {
    pub fn is_live(&self) -> bool {
        matches!(self, StreamState::Streaming)
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamState::Idle => "idle",
            StreamState::Connecting => "connecting",
            StreamState::Streaming => "streaming",
            StreamState::Restarting => "restarting",
            StreamState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

type Session = JoinHandle<Result<(), FeedError>>;

enum Wake {
    Shutdown,
    Restart,
    Ended(Result<Result<(), FeedError>, JoinError>),
}

pub(crate) struct StreamSubscriptionManager {
    shared: Arc<Shared>,
    feed: Arc<dyn MarketFeed>,
    config: EngineConfig,
}

impl StreamSubscriptionManager {
    pub fn new(shared: Arc<Shared>, feed: Arc<dyn MarketFeed>, config: EngineConfig) -> Self {
        Self {
            shared,
            feed,
            config,
        }
    }

    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), EngineError> {
        let result = self.supervise(&shutdown).await;
        self.shared.set_stream_state(StreamState::Stopped);
        result
    }

    async fn supervise(&self, shutdown: &CancellationToken) -> Result<(), EngineError> {
        while !shutdown.is_cancelled() {
            let pairs = self.shared.watched_pairs().await;

            if pairs.is_empty() {
                self.shared.set_stream_state(StreamState::Idle);
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = self.shared.restart.notified() => {}
                    _ = sleep(self.config.idle_poll) => {}
                }
                continue;
            }

            self.shared.set_stream_state(StreamState::Connecting);
            let generation = shutdown.child_token();
            let mut session = self.spawn_session(&pairs, generation.clone());

            let ended = loop {
                let wake = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => Wake::Shutdown,
                    res = &mut session => Wake::Ended(res),
                    _ = self.shared.restart.notified() => Wake::Restart,
                };

                match wake {
                    Wake::Shutdown => {
                        self.stop_session(&generation, session).await?;
                        return Ok(());
                    }
                    Wake::Restart => {
                        let current = self.shared.watched_pairs().await;
                        if current == pairs {
                            debug!("Pair set unchanged; restart skipped");
                            continue;
                        }
                        info!(
                            from = pairs.len(),
                            to = current.len(),
                            "Pair set changed; resubscribing"
                        );
                        self.shared.set_stream_state(StreamState::Restarting);
                        Counters::bump(&self.shared.counters.restarts);
                        self.stop_session(&generation, session).await?;
                        break None;
                    }
                    Wake::Ended(res) => break Some(res),
                }
            };

            let Some(res) = ended else {
                continue;
            };

            let delay = match res {
                Ok(Ok(())) => {
                    debug!("Stream ended without error; resubscribing");
                    self.config.reconnect_delay
                }
                Ok(Err(e)) => {
                    let Some(delay) =
                        e.retry_after(self.config.reconnect_delay, self.config.rejected_delay)
                    else {
                        error!(error = %e, "Market feed failed permanently");
                        return Err(EngineError::Feed(e));
                    };
                    Counters::bump(&self.shared.counters.reconnects);
                    warn!(error = %e, ?delay, "Stream failed; reconnecting");
                    delay
                }
                Err(join_err) => {
                    error!(error = %join_err, "Stream task crashed");
                    return Err(EngineError::StreamTask(join_err.to_string()));
                }
            };

            self.shared.set_stream_state(StreamState::Connecting);
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.shared.restart.notified() => {}
                _ = sleep(delay) => {}
            }
        }

        Ok(())
    }

    fn spawn_session(&self, pairs: &BTreeSet<Pair>, cancel: CancellationToken) -> Session {
        Counters::bump(&self.shared.counters.sessions_opened);

        let pairs: Vec<Pair> = pairs.iter().cloned().collect();
        let span = info_span!("stream_session", pairs = pairs.len());

        info!(
            pairs = %pairs.iter().map(Pair::id).collect::<Vec<_>>().join(","),
            "Opening market stream"
        );

        tokio::spawn(
            run_session(
                Arc::clone(&self.feed),
                Arc::clone(&self.shared),
                pairs,
                cancel,
                self.config.tick_buffer,
            )
            .instrument(span),
        )
    }

    /// Cancel a connection and wait until its task is gone.
    ///
    /// A fatal feed error or a crash that raced the cancellation is still
    /// returned; transient errors are dropped since a new connection follows.
    async fn stop_session(
        &self,
        generation: &CancellationToken,
        mut session: Session,
    ) -> Result<(), EngineError> {
        generation.cancel();

        match timeout(self.config.restart_grace, &mut session).await {
            Ok(Ok(Ok(()))) => debug!("Previous stream exited"),
            Ok(Ok(Err(e))) if e.is_transient() => {
                debug!(error = %e, "Previous stream exited with error")
            }
            Ok(Ok(Err(e))) => {
                error!(error = %e, "Market feed failed permanently during teardown");
                return Err(EngineError::Feed(e));
            }
            Ok(Err(e)) => {
                error!(error = %e, "Previous stream task crashed");
                return Err(EngineError::StreamTask(e.to_string()));
            }
            Err(_) => {
                warn!(
                    grace = ?self.config.restart_grace,
                    "Previous stream ignored cancellation; aborting"
                );
                session.abort();
                let _ = session.await;
            }
        }
        Ok(())
    }
}

/// One connection generation: the feed produces, this task consumes.
async fn run_session(
    feed: Arc<dyn MarketFeed>,
    shared: Arc<Shared>,
    pairs: Vec<Pair>,
    cancel: CancellationToken,
    buffer: usize,
) -> Result<(), FeedError> {
    let (tx, mut rx) = mpsc::channel(buffer);

    let consumer = {
        let cancel = cancel.clone();
        let subscribed = pairs.clone();
        async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    ev = rx.recv() => ev,
                };
                let Some(event) = event else {
                    break;
                };

                match event {
                    FeedEvent::Connected => shared.on_connected(&subscribed).await,
                    FeedEvent::Tick(tick) => shared.on_tick(&tick).await,
                }
            }
        }
    };

    let (res, ()) = tokio::join!(feed.stream(&pairs, tx, cancel), consumer);
    res
}
