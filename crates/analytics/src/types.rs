use serde::{Deserialize, Serialize};

/// One point on the cumulative P&L curve: the running net P&L total after
/// the trade that completed at `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePoint {
    /// Completion time of the trade, as an ISO-8601 string.
    pub date: String,
    pub cumulative_pnl: f64,
}

/// Aggregate performance statistics over a user's closed trades.
///
/// Recomputed from the trade list on every request, never persisted.
/// Numeric fields are IEEE-754 doubles in the transport encoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_trades: u32,
    pub wins: u32,
    pub losses: u32,
    /// `wins / totalTrades * 100`, or 0 with no closed trades.
    pub win_rate: f64,
    /// Sum of net P&L (pnl minus commissions) across all closed trades.
    pub total_pnl: f64,
    /// Mean reward/risk ratio over winning trades that declared a positive
    /// risk amount; 0 when no trade qualifies.
    pub average_risk_reward: f64,
    pub performance_curve: Vec<PerformancePoint>,
}
