use chrono::{DateTime, Utc};
use core_types::{Trade, User};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Raw `trades` row. Direction and status live as text in the table and are
/// parsed into their enums when converting to the domain `Trade`.
#[derive(Debug, FromRow)]
pub struct TradeRow {
    pub id: i64,
    pub user_id: i64,
    pub ticker: String,
    pub direction: String,
    pub status: String,
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

impl TryFrom<TradeRow> for Trade {
    type Error = core_types::Error;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        Ok(Trade {
            id: row.id,
            user_id: row.user_id,
            ticker: row.ticker,
            direction: row.direction.parse()?,
            status: row.status.parse()?,
            entry_date: row.entry_date,
            exit_date: row.exit_date,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            position_size: row.position_size,
            pnl: row.pnl,
            commissions: row.commissions,
            risk_amount: row.risk_amount,
            reward_amount: row.reward_amount,
            tick_size: row.tick_size,
            tick_value: row.tick_value,
            notes: row.notes,
            screenshot_url: row.screenshot_url,
        })
    }
}

/// Raw `users` row, including the password hash. Converted to the public
/// `User` before it leaves this crate; the hash is only handed out through
/// `Db::get_user_with_password`.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
        }
    }
}
