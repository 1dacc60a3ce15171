use crate::error::Error;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way a position was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            other => Err(Error::UnknownDirection(other.to_string())),
        }
    }
}

/// Lifecycle state of a journaled trade. Only closed trades feed analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Open => write!(f, "open"),
            TradeStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for TradeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// A single journaled trade, as stored and as served over the API.
///
/// Monetary fields are `Decimal` and serialize as strings on the wire,
/// matching the `numeric` columns they come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i64,
    pub user_id: i64,
    pub ticker: String,
    pub direction: Direction,
    pub status: TradeStatus,
    pub entry_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub position_size: Decimal,
    pub pnl: Option<Decimal>,
    pub commissions: Option<Decimal>,
    pub risk_amount: Option<Decimal>,
    pub reward_amount: Option<Decimal>,
    pub tick_size: Decimal,
    pub tick_value: Decimal,
    pub notes: Option<String>,
    pub screenshot_url: Option<String>,
}

impl Trade {
    /// The instant the trade is considered finished for ordering purposes.
    ///
    /// A closed trade without an exit date falls back to its entry date.
    pub fn completion_time(&self) -> DateTime<Utc> {
        self.exit_date.unwrap_or(self.entry_date)
    }
}

/// Payload for creating a trade. Missing optional fields take the same
/// defaults the trades table declares.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub ticker: String,
    pub direction: Direction,
    #[serde(default = "default_status")]
    pub status: TradeStatus,
    pub entry_date: Option<DateTime<Utc>>,
    pub exit_date: Option<DateTime<Utc>>,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub position_size: Decimal,
    pub pnl: Option<Decimal>,
    pub commissions: Option<Decimal>,
    pub risk_amount: Option<Decimal>,
    pub reward_amount: Option<Decimal>,
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    #[serde(default = "default_tick_value")]
    pub tick_value: Decimal,
    pub notes: Option<String>,
    pub screenshot_url: Option<String>,
}

/// Partial update for an existing trade. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeUpdate {
    pub ticker: Option<String>,
    pub direction: Option<Direction>,
    pub status: Option<TradeStatus>,
    pub entry_date: Option<DateTime<Utc>>,
    pub exit_date: Option<DateTime<Utc>>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub position_size: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub commissions: Option<Decimal>,
    pub risk_amount: Option<Decimal>,
    pub reward_amount: Option<Decimal>,
    pub tick_size: Option<Decimal>,
    pub tick_value: Option<Decimal>,
    pub notes: Option<String>,
    pub screenshot_url: Option<String>,
}

fn default_status() -> TradeStatus {
    TradeStatus::Open
}

// Futures contract metadata defaults (ES-style: a quarter point worth $12.50).
fn default_tick_size() -> Decimal {
    Decimal::new(25, 2)
}

fn default_tick_value() -> Decimal {
    Decimal::new(1250, 2)
}

/// A journal account. The password hash lives only in the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
}
