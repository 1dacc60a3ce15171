use crate::error::{Error, Result};
use core_types::{NewTrade, TradeUpdate};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Credentials payload shared by register and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

const MIN_PASSWORD_LEN: usize = 8;

/// Checks a registration payload before an account is created.
pub fn validate_credentials(request: &CredentialsRequest) -> Result<()> {
    if !request.email.contains('@') {
        return Err(Error::validation("A valid email is required", "email"));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(Error::validation(
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            "password",
        ));
    }
    Ok(())
}

/// Semantic checks on a create-trade payload, beyond what serde typing
/// already enforces.
pub fn validate_new_trade(trade: &NewTrade) -> Result<()> {
    if trade.ticker.trim().is_empty() {
        return Err(Error::validation("Ticker is required", "ticker"));
    }
    if trade.entry_price <= Decimal::ZERO {
        return Err(Error::validation(
            "Entry price must be positive",
            "entryPrice",
        ));
    }
    if trade.position_size <= Decimal::ZERO {
        return Err(Error::validation(
            "Position size must be positive",
            "positionSize",
        ));
    }
    Ok(())
}

/// Same checks for the fields an update actually sets.
pub fn validate_trade_update(update: &TradeUpdate) -> Result<()> {
    if let Some(ticker) = &update.ticker {
        if ticker.trim().is_empty() {
            return Err(Error::validation("Ticker is required", "ticker"));
        }
    }
    if let Some(entry_price) = update.entry_price {
        if entry_price <= Decimal::ZERO {
            return Err(Error::validation(
                "Entry price must be positive",
                "entryPrice",
            ));
        }
    }
    if let Some(position_size) = update.position_size {
        if position_size <= Decimal::ZERO {
            return Err(Error::validation(
                "Position size must be positive",
                "positionSize",
            ));
        }
    }
    Ok(())
}
