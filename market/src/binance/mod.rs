pub mod parser;
mod ws;

use std::time::Duration;

use corelib::Pair;

pub const BINANCE_STREAM_URL: &str = "wss://stream.binance.com:9443/stream";
const BOOK_TICKER_STREAM: &str = "@bookTicker";
const STREAMS_DELIMITER: &str = "/";

#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// Combined-stream endpoint, without the `?streams=` query.
    pub base_url: String,
    /// How often the client pings the server.
    pub ping_interval: Duration,
    /// How long an unanswered ping may stay outstanding before the connection is dead.
    pub pong_timeout: Duration,
    /// Upper bound on the WebSocket handshake.
    pub connect_timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_STREAM_URL.to_string(),
            ping_interval: Duration::from_secs(20),
            pong_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Binance spot best bid/ask feed over a single combined-stream WebSocket.
pub struct BinanceBookTickerFeed {
    config: BinanceConfig,
}

impl BinanceBookTickerFeed {
    pub fn new(config: BinanceConfig) -> Self {
        Self { config }
    }

    /// `wss://.../stream?streams=btcusdt@bookTicker/ethusdt@bookTicker`
    pub fn stream_url(&self, pairs: &[Pair]) -> String {
        let streams = pairs
            .iter()
            .map(|p| format!("{}{}", p.symbol().to_lowercase(), BOOK_TICKER_STREAM))
            .collect::<Vec<_>>()
            .join(STREAMS_DELIMITER);

        format!("{}?streams={}", self.config.base_url, streams)
    }
}
