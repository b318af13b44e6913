pub mod binance;
pub mod error;
pub mod feed;
pub mod types;

pub use error::{FeedError, ParseError};
pub use feed::MarketFeed;
pub use types::{FeedEvent, Tick};
