use chrono::{DateTime, Utc};
use corelib::Pair;

/// One best-ask observation for a subscribed pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub pair: Pair,
    pub ask: f64,
    pub ts: DateTime<Utc>,
}

/// Everything a feed connection hands to its consumer, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The connection is open and subscribed. Any price continuity with a
    /// previous connection is lost from here on.
    Connected,
    Tick(Tick),
}
