use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pair::Pair;
use crate::error::ValidationError;

/// Stable identity of an alert. Assigned once at creation and kept across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertId(Uuid);

impl AlertId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AlertId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Opaque reference to the external record (message, row) an alert was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginRef(String);

impl OriginRef {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An active price threshold on a pair. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: AlertId,
    pub pair: Pair,
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
    pub origin: Option<OriginRef>,
}

impl Alert {
    pub fn new(pair: Pair, threshold: f64, origin: Option<OriginRef>) -> Self {
        Self {
            id: AlertId::new(),
            pair,
            threshold,
            created_at: Utc::now(),
            origin,
        }
    }
}

/// Which way the price moved through a threshold. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `Up` unless the price fell between the two observations.
    pub fn between(previous: f64, current: f64) -> Self {
        if current >= previous {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// A validated "add alert" request.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRequest {
    pub pair: Pair,
    pub threshold: f64,
}

impl AlertRequest {
    pub fn new(pair: Pair, threshold: f64) -> Result<Self, ValidationError> {
        if !threshold.is_finite() {
            return Err(ValidationError::InvalidPrice(threshold.to_string()));
        }
        if threshold <= 0.0 {
            return Err(ValidationError::NonPositivePrice(threshold));
        }
        Ok(Self { pair, threshold })
    }

    /// Validate raw user input: pair text and price text.
    pub fn parse(pair: &str, price: &str) -> Result<Self, ValidationError> {
        let pair = Pair::parse(pair)?;
        let threshold: f64 = price
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidPrice(price.to_string()))?;
        Self::new(pair, threshold)
    }
}
