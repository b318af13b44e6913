use async_trait::async_trait;
use corelib::Pair;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::error::FeedError;
use crate::types::FeedEvent;

/// A streaming market-data provider keyed by a set of pairs.
///
/// One call is one connection lifetime: connect, emit `FeedEvent::Connected`,
/// forward ticks until the connection fails or `cancel` fires.
/// Returns `Ok(())` only when cancelled (or the consumer went away).
#[async_trait]
pub trait MarketFeed: Send + Sync + 'static {
    async fn stream(
        &self,
        pairs: &[Pair],
        sender: Sender<FeedEvent>,
        cancel: CancellationToken,
    ) -> Result<(), FeedError>;
}
