pub mod error;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use types::{Direction, NewTrade, Trade, TradeStatus, TradeUpdate, User};
