use app_config::types::DatabaseSettings;
use chrono::{DateTime, Utc};
use core_types::{NewTrade, Trade, TradeUpdate, User};
use sqlx::{PgPool, postgres::PgPoolOptions};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
use types::{TradeRow, UserRow};

/// Column list shared by every query that returns full trade rows.
const TRADE_COLUMNS: &str = "id, user_id, ticker, direction, status, entry_date, exit_date, \
     entry_price, exit_price, position_size, pnl, commissions, risk_amount, reward_amount, \
     tick_size, tick_value, notes, screenshot_url";

/// A wrapper around the `sqlx` connection pool.
#[derive(Debug, Clone)]
pub struct Db(PgPool);

/// Establishes a connection pool to the PostgreSQL database and runs migrations.
///
/// # Arguments
///
/// * `settings`: The database configuration settings.
///
/// # Returns
///
/// A `Result` containing the `Db` wrapper on success, or an `Error` on failure.
pub async fn connect(settings: &DatabaseSettings) -> Result<Db> {
    // Create a connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        // The `?` operator uses the `#[from]` attribute in our error enum
        // to automatically convert the `sqlx::Error` into a `database::Error`.
        .connect(&settings.url)
        .await?;

    // Run database migrations. This ensures the database schema is up-to-date.
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(Error::from)?;

    Ok(Db(pool))
}

impl Db {
    // --- Trades (always scoped to one owner) ---

    /// Fetches all of one user's trades, newest entry first.
    pub async fn list_trades(&self, user_id: i64) -> Result<Vec<Trade>> {
        let rows = sqlx::query_as::<_, TradeRow>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE user_id = $1 ORDER BY entry_date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        rows.into_iter()
            .map(|row| Trade::try_from(row).map_err(Error::from))
            .collect()
    }

    /// Fetches a single trade, or `None` if it does not exist or belongs to
    /// another user.
    pub async fn get_trade(&self, id: i64, user_id: i64) -> Result<Option<Trade>> {
        let row = sqlx::query_as::<_, TradeRow>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        row.map(|row| Trade::try_from(row).map_err(Error::from))
            .transpose()
    }

    /// Inserts a new trade for the given user and returns the stored row.
    pub async fn create_trade(&self, user_id: i64, new_trade: &NewTrade) -> Result<Trade> {
        let entry_date = new_trade.entry_date.unwrap_or_else(Utc::now);

        let row = sqlx::query_as::<_, TradeRow>(&format!(
            "INSERT INTO trades (user_id, ticker, direction, status, entry_date, exit_date, \
             entry_price, exit_price, position_size, pnl, commissions, risk_amount, \
             reward_amount, tick_size, tick_value, notes, screenshot_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {TRADE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&new_trade.ticker)
        .bind(new_trade.direction.to_string())
        .bind(new_trade.status.to_string())
        .bind(entry_date)
        .bind(new_trade.exit_date)
        .bind(new_trade.entry_price)
        .bind(new_trade.exit_price)
        .bind(new_trade.position_size)
        .bind(new_trade.pnl)
        .bind(new_trade.commissions)
        .bind(new_trade.risk_amount)
        .bind(new_trade.reward_amount)
        .bind(new_trade.tick_size)
        .bind(new_trade.tick_value)
        .bind(&new_trade.notes)
        .bind(&new_trade.screenshot_url)
        .fetch_one(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        Trade::try_from(row).map_err(Error::from)
    }

    /// Applies a partial update to a trade and returns the new row, or
    /// `None` if the trade does not exist for this user.
    pub async fn update_trade(
        &self,
        id: i64,
        user_id: i64,
        update: &TradeUpdate,
    ) -> Result<Option<Trade>> {
        // Read-merge-write: unset fields keep their stored values.
        let Some(existing) = self.get_trade(id, user_id).await? else {
            return Ok(None);
        };
        let merged = apply_update(existing, update);

        let row = sqlx::query_as::<_, TradeRow>(&format!(
            "UPDATE trades SET ticker = $1, direction = $2, status = $3, entry_date = $4, \
             exit_date = $5, entry_price = $6, exit_price = $7, position_size = $8, pnl = $9, \
             commissions = $10, risk_amount = $11, reward_amount = $12, tick_size = $13, \
             tick_value = $14, notes = $15, screenshot_url = $16 \
             WHERE id = $17 AND user_id = $18 \
             RETURNING {TRADE_COLUMNS}"
        ))
        .bind(&merged.ticker)
        .bind(merged.direction.to_string())
        .bind(merged.status.to_string())
        .bind(merged.entry_date)
        .bind(merged.exit_date)
        .bind(merged.entry_price)
        .bind(merged.exit_price)
        .bind(merged.position_size)
        .bind(merged.pnl)
        .bind(merged.commissions)
        .bind(merged.risk_amount)
        .bind(merged.reward_amount)
        .bind(merged.tick_size)
        .bind(merged.tick_value)
        .bind(&merged.notes)
        .bind(&merged.screenshot_url)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        row.map(|row| Trade::try_from(row).map_err(Error::from))
            .transpose()
    }

    /// Deletes a trade. Returns `true` if a row was removed.
    pub async fn delete_trade(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.0)
            .await
            .map_err(Error::OperationFailed)?;

        Ok(result.rows_affected() > 0)
    }

    // --- Users ---

    /// Creates a user account. The caller supplies an already-hashed password.
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let result = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.0)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::EmailTaken(email.to_string()))
            }
            Err(e) => Err(Error::OperationFailed(e)),
        }
    }

    /// Looks a user up by email, returning the account and its password hash
    /// for credential verification.
    pub async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        Ok(row.map(|row| {
            let hash = row.password_hash.clone();
            (row.into(), hash)
        }))
    }

    // --- Sessions ---

    /// Stores a new login session.
    pub async fn create_session(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.0)
            .await
            .map_err(Error::OperationFailed)?;

        Ok(())
    }

    /// Resolves a session token to its user, ignoring expired sessions.
    pub async fn get_session_user(&self, token: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.email, u.password_hash FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = $1 AND s.expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        Ok(row.map(User::from))
    }

    /// Removes a session (logout). Deleting an unknown token is not an error.
    pub async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.0)
            .await
            .map_err(Error::OperationFailed)?;

        Ok(())
    }

    /// Sweeps out sessions that have passed their expiry.
    pub async fn delete_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.0)
            .await
            .map_err(Error::OperationFailed)?;

        Ok(result.rows_affected())
    }
}

/// Overlays the set fields of a `TradeUpdate` onto an existing trade.
fn apply_update(mut trade: Trade, update: &TradeUpdate) -> Trade {
    if let Some(ticker) = &update.ticker {
        trade.ticker = ticker.clone();
    }
    if let Some(direction) = update.direction {
        trade.direction = direction;
    }
    if let Some(status) = update.status {
        trade.status = status;
    }
    if let Some(entry_date) = update.entry_date {
        trade.entry_date = entry_date;
    }
    if let Some(exit_date) = update.exit_date {
        trade.exit_date = Some(exit_date);
    }
    if let Some(entry_price) = update.entry_price {
        trade.entry_price = entry_price;
    }
    if let Some(exit_price) = update.exit_price {
        trade.exit_price = Some(exit_price);
    }
    if let Some(position_size) = update.position_size {
        trade.position_size = position_size;
    }
    if let Some(pnl) = update.pnl {
        trade.pnl = Some(pnl);
    }
    if let Some(commissions) = update.commissions {
        trade.commissions = Some(commissions);
    }
    if let Some(risk_amount) = update.risk_amount {
        trade.risk_amount = Some(risk_amount);
    }
    if let Some(reward_amount) = update.reward_amount {
        trade.reward_amount = Some(reward_amount);
    }
    if let Some(tick_size) = update.tick_size {
        trade.tick_size = tick_size;
    }
    if let Some(tick_value) = update.tick_value {
        trade.tick_value = tick_value;
    }
    if let Some(notes) = &update.notes {
        trade.notes = Some(notes.clone());
    }
    if let Some(screenshot_url) = &update.screenshot_url {
        trade.screenshot_url = Some(screenshot_url.clone());
    }
    trade
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{Direction, TradeStatus};
    use rust_decimal::Decimal;

    fn open_trade() -> Trade {
        Trade {
            id: 1,
            user_id: 1,
            ticker: "ES".to_string(),
            direction: Direction::Long,
            status: TradeStatus::Open,
            entry_date: Utc.with_ymd_and_hms(2024, 4, 2, 13, 0, 0).unwrap(),
            exit_date: None,
            entry_price: Decimal::new(510025, 2),
            exit_price: None,
            position_size: Decimal::ONE,
            pnl: None,
            commissions: None,
            risk_amount: None,
            reward_amount: None,
            tick_size: Decimal::new(25, 2),
            tick_value: Decimal::new(1250, 2),
            notes: None,
            screenshot_url: None,
        }
    }

    #[test]
    fn apply_update_overlays_only_set_fields() {
        let update = TradeUpdate {
            status: Some(TradeStatus::Closed),
            exit_date: Some(Utc.with_ymd_and_hms(2024, 4, 2, 15, 30, 0).unwrap()),
            exit_price: Some(Decimal::new(511000, 2)),
            pnl: Some(Decimal::new(48750, 2)),
            ..TradeUpdate::default()
        };

        let merged = apply_update(open_trade(), &update);
        assert_eq!(merged.status, TradeStatus::Closed);
        assert_eq!(merged.pnl, Some(Decimal::new(48750, 2)));
        // Untouched fields survive the merge.
        assert_eq!(merged.ticker, "ES");
        assert_eq!(merged.direction, Direction::Long);
        assert_eq!(merged.entry_price, Decimal::new(510025, 2));
    }

    #[test]
    fn apply_update_with_empty_update_is_identity() {
        let before = open_trade();
        let after = apply_update(before.clone(), &TradeUpdate::default());
        assert_eq!(after.ticker, before.ticker);
        assert_eq!(after.status, before.status);
        assert_eq!(after.exit_date, before.exit_date);
        assert_eq!(after.notes, before.notes);
    }

    #[test]
    fn trade_row_parse_rejects_unknown_direction() {
        let row = types::TradeRow {
            id: 1,
            user_id: 1,
            ticker: "ES".to_string(),
            direction: "sideways".to_string(),
            status: "open".to_string(),
            entry_date: Utc::now(),
            exit_date: None,
            entry_price: Decimal::ONE,
            exit_price: None,
            position_size: Decimal::ONE,
            pnl: None,
            commissions: None,
            risk_amount: None,
            reward_amount: None,
            tick_size: Decimal::new(25, 2),
            tick_value: Decimal::new(1250, 2),
            notes: None,
            screenshot_url: None,
        };
        assert!(Trade::try_from(row).is_err());
    }
}
