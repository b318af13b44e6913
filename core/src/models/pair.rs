use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const PAIR_SEPARATOR: char = '/';

/// Quote assets recognised in the concatenated `BASEQUOTE` form.
/// Longest first so `FDUSD` wins over `USD` and `USDT` over `USD`.
const KNOWN_QUOTES: &[&str] = &[
    "FDUSD", "USDT", "USDC", "BUSD", "TUSD", "DAI", "USD", "EUR", "GBP", "TRY", "BRL", "BTC",
    "ETH", "BNB",
];

/// A tradable instrument, e.g. `BTC/USDT`.
///
/// Both legs are stored uppercase. Ordering is by base then quote, which is the
/// display order used when listing alerts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pair {
    pub base: String,
    pub quote: String,
}

impl Pair {
    /// Build a pair from already-validated legs, normalising casing.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_ascii_uppercase(),
            quote: quote.into().to_ascii_uppercase(),
        }
    }

    /// Parse `BASE/QUOTE` or the concatenated `BASEQUOTE` form.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let upper = raw.trim().to_ascii_uppercase();

        let (base, quote) = match upper.split_once(PAIR_SEPARATOR) {
            Some((base, quote)) => (base.to_string(), quote.to_string()),
            None => Self::split_symbol(&upper)?,
        };

        if base.is_empty() || quote.is_empty() || quote.contains(PAIR_SEPARATOR) {
            return Err(ValidationError::MalformedPair(raw.to_string()));
        }

        for leg in [&base, &quote] {
            if !leg.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ValidationError::InvalidAsset(leg.clone()));
            }
        }

        Ok(Self { base, quote })
    }

    fn split_symbol(symbol: &str) -> Result<(String, String), ValidationError> {
        if symbol.is_empty() {
            return Err(ValidationError::MalformedPair(symbol.to_string()));
        }

        KNOWN_QUOTES
            .iter()
            .find_map(|quote| {
                symbol
                    .strip_suffix(quote)
                    .filter(|base| !base.is_empty())
                    .map(|base| (base.to_string(), quote.to_string()))
            })
            .ok_or_else(|| ValidationError::UnknownQuote(symbol.to_string()))
    }

    /// Display id, `BASE/QUOTE`.
    pub fn id(&self) -> String {
        format!("{}{}{}", self.base, PAIR_SEPARATOR, self.quote)
    }

    /// Exchange symbol, `BASEQUOTE`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.base, PAIR_SEPARATOR, self.quote)
    }
}

impl FromStr for Pair {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
