/// Core data types for the ticker feed
///
/// These types match the JSON message format of the upstream feed: inbound
/// messages are batches (ordered arrays) of `CoinRecord`, outbound messages
/// are `ClientRequest` values.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Direction of the price move within the current aggregation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn is_up(&self) -> bool {
        matches!(self, Direction::Up)
    }
}

/// Latest state of one traded symbol, as pushed by the feed
///
/// The feed replaces records wholesale; there are no field-level patches.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRecord {
    /// Unique symbol, used as the store key (e.g., "BTCUSDT")
    pub symbol: String,
    /// Open price of the current aggregation window
    pub open: f64,
    /// Latest close price of the current aggregation window
    pub close: f64,
    /// Signed percentage change; the sign carries the direction
    pub change: f64,
    /// Up/down tag as decided upstream
    pub direction: Direction,
    /// Upstream emphasis flag
    #[serde(default)]
    pub is_hot: bool,
    /// 24h trade volume; absent on older feed revisions
    #[serde(default)]
    pub volume_24h: Option<f64>,
}

/// Aggregation window selected by the user
///
/// Exactly one timeframe is active at a time; changing it replaces the feed
/// subscription via a full reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
}

impl Timeframe {
    /// All selectable timeframes, in menu order
    pub const ALL: [Timeframe; 6] = [
        Timeframe::M1,
        Timeframe::M3,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
    ];

    /// Interval length in minutes
    pub fn minutes(&self) -> u64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M3 => 3,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
        }
    }

    /// Wire/display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Timeframe::M1),
            "3m" => Ok(Timeframe::M3),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "30m" => Ok(Timeframe::M30),
            "1h" => Ok(Timeframe::H1),
            other => Err(Error::UnknownTimeframe(other.to_string())),
        }
    }
}

/// Outbound request to the feed
///
/// Sent exactly once per connection, immediately after the socket opens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ClientRequest {
    #[serde(rename = "setTimeframe")]
    SetTimeframe { timeframe: Timeframe },
}
