//! Decoder for Binance combined-stream `@bookTicker` frames.
//!
//! ```jsonc
//! {
//!   "stream": "btcusdt@bookTicker",
//!   "data": { "u": 400900217, "s": "BTCUSDT", "b": "99990.1", "B": "3.2", "a": "99990.2", "A": "0.5" }
//! }
//! ```
//!
//! Frames without `data` (subscription acks and similar) are not ticks and
//! yield `Ok(None)`. Everything else that does not decode into a tick for a
//! subscribed symbol is a `ParseError`; the caller skips it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use corelib::Pair;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::types::Tick;

/// Exchange symbol (`BTCUSDT`) to the subscribed pair.
pub type SymbolMap = HashMap<String, Pair>;

#[derive(Debug, Deserialize)]
struct StreamEnvelope {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BookTicker {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "a")]
    ask: String,
    /// Only present on some deployments (futures); spot frames carry no time.
    #[serde(rename = "E", default)]
    event_time_ms: Option<i64>,
}

pub fn symbol_map(pairs: &[Pair]) -> SymbolMap {
    pairs.iter().map(|p| (p.symbol(), p.clone())).collect()
}

pub fn parse_book_ticker(
    raw: &str,
    symbols: &SymbolMap,
    received_at: DateTime<Utc>,
) -> Result<Option<Tick>, ParseError> {
    let envelope: StreamEnvelope =
        serde_json::from_str(raw).map_err(|e| ParseError::Json(e.to_string()))?;

    let Some(data) = envelope.data else {
        return Ok(None);
    };

    let ticker: BookTicker =
        serde_json::from_value(data).map_err(|e| ParseError::Shape(e.to_string()))?;

    let ask: f64 = ticker
        .ask
        .parse()
        .map_err(|_| ParseError::Price(ticker.ask.clone()))?;
    if !ask.is_finite() || ask <= 0.0 {
        return Err(ParseError::Price(ticker.ask));
    }

    let pair = symbols
        .get(&ticker.symbol)
        .cloned()
        .ok_or_else(|| ParseError::UnknownSymbol(ticker.symbol.clone()))?;

    let ts = ticker
        .event_time_ms
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(received_at);

    Ok(Some(Tick { pair, ask, ts }))
}
