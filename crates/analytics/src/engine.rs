use crate::types::{AnalyticsResponse, PerformancePoint};
use chrono::SecondsFormat;
use core_types::{Trade, TradeStatus};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// The engine responsible for calculating performance statistics from a
/// user's trade history.
///
/// A pure fold over its input: no state, no I/O, deterministic. Open trades
/// are ignored entirely; closed trades are re-sorted by completion time, so
/// the input order never affects the result.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the full analytics summary from a set of trades.
    ///
    /// Missing `pnl`/`commissions`/`riskAmount` are treated as zero; a
    /// missing `rewardAmount` on a qualifying winner falls back to the
    /// trade's absolute net P&L. Sums are accumulated as `Decimal` and
    /// converted to `f64` only at the boundary.
    pub fn compute(&self, trades: &[Trade]) -> AnalyticsResponse {
        let mut closed: Vec<&Trade> = trades
            .iter()
            .filter(|t| t.status == TradeStatus::Closed)
            .collect();
        // Stable sort: trades completing at the same instant keep input order.
        closed.sort_by_key(|t| t.completion_time());

        let mut response = AnalyticsResponse {
            total_trades: closed.len() as u32,
            ..AnalyticsResponse::default()
        };

        let mut total_pnl = Decimal::ZERO;
        let mut cumulative_pnl = Decimal::ZERO;
        let mut risk_reward_sum = 0.0_f64;
        let mut risk_reward_count = 0_u32;

        for trade in closed {
            let net_pnl = trade.pnl.unwrap_or(Decimal::ZERO)
                - trade.commissions.unwrap_or(Decimal::ZERO);

            // Break-even trades count as neither a win nor a loss.
            if net_pnl > Decimal::ZERO {
                response.wins += 1;
            } else if net_pnl < Decimal::ZERO {
                response.losses += 1;
            }

            total_pnl += net_pnl;
            cumulative_pnl += net_pnl;
            response.performance_curve.push(PerformancePoint {
                date: trade
                    .completion_time()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                cumulative_pnl: cumulative_pnl.to_f64().unwrap_or(0.0),
            });

            // Only winners with a declared positive risk contribute to the
            // average reward/risk ratio.
            let risk = trade.risk_amount.unwrap_or(Decimal::ZERO);
            let reward = trade.reward_amount.unwrap_or_else(|| net_pnl.abs());
            if risk > Decimal::ZERO && net_pnl > Decimal::ZERO {
                risk_reward_sum += (reward / risk).to_f64().unwrap_or(0.0);
                risk_reward_count += 1;
            }
        }

        response.total_pnl = total_pnl.to_f64().unwrap_or(0.0);
        if response.total_trades > 0 {
            response.win_rate =
                (response.wins as f64 / response.total_trades as f64) * 100.0;
        }
        if risk_reward_count > 0 {
            response.average_risk_reward = risk_reward_sum / risk_reward_count as f64;
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::Direction;
    use rust_decimal_macros::dec;

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, n, 16, 0, 0).unwrap()
    }

    struct TradeParams {
        status: TradeStatus,
        exit_date: Option<DateTime<Utc>>,
        pnl: Option<Decimal>,
        commissions: Option<Decimal>,
        risk_amount: Option<Decimal>,
        reward_amount: Option<Decimal>,
    }

    impl Default for TradeParams {
        fn default() -> Self {
            Self {
                status: TradeStatus::Closed,
                exit_date: Some(day(1)),
                pnl: None,
                commissions: None,
                risk_amount: None,
                reward_amount: None,
            }
        }
    }

    fn trade(id: i64, params: TradeParams) -> Trade {
        Trade {
            id,
            user_id: 1,
            ticker: "ES".to_string(),
            direction: Direction::Long,
            status: params.status,
            entry_date: Utc.with_ymd_and_hms(2024, 5, 30, 9, 30, 0).unwrap(),
            exit_date: params.exit_date,
            entry_price: dec!(5000),
            exit_price: None,
            position_size: dec!(1),
            pnl: params.pnl,
            commissions: params.commissions,
            risk_amount: params.risk_amount,
            reward_amount: params.reward_amount,
            tick_size: dec!(0.25),
            tick_value: dec!(12.50),
            notes: None,
            screenshot_url: None,
        }
    }

    #[test]
    fn empty_input_yields_all_zeroes() {
        let response = AnalyticsEngine::new().compute(&[]);
        assert_eq!(response.total_trades, 0);
        assert_eq!(response.wins, 0);
        assert_eq!(response.losses, 0);
        assert_eq!(response.win_rate, 0.0);
        assert_eq!(response.total_pnl, 0.0);
        assert_eq!(response.average_risk_reward, 0.0);
        assert!(response.performance_curve.is_empty());
    }

    #[test]
    fn one_winner_one_loser() {
        let trades = vec![
            trade(
                1,
                TradeParams {
                    exit_date: Some(day(1)),
                    pnl: Some(dec!(500.00)),
                    commissions: Some(dec!(0)),
                    risk_amount: Some(dec!(200.00)),
                    reward_amount: Some(dec!(500.00)),
                    ..TradeParams::default()
                },
            ),
            trade(
                2,
                TradeParams {
                    exit_date: Some(day(2)),
                    pnl: Some(dec!(-500.00)),
                    commissions: Some(dec!(0)),
                    risk_amount: Some(dec!(500.00)),
                    reward_amount: Some(dec!(1000.00)),
                    ..TradeParams::default()
                },
            ),
        ];

        let response = AnalyticsEngine::new().compute(&trades);
        assert_eq!(response.total_trades, 2);
        assert_eq!(response.wins, 1);
        assert_eq!(response.losses, 1);
        assert_eq!(response.win_rate, 50.0);
        assert_eq!(response.total_pnl, 0.0);
        // Only the winner qualifies: 500 / 200.
        assert_eq!(response.average_risk_reward, 2.5);

        assert_eq!(response.performance_curve.len(), 2);
        assert_eq!(response.performance_curve[0].cumulative_pnl, 500.0);
        assert_eq!(response.performance_curve[0].date, "2024-06-01T16:00:00.000Z");
        assert_eq!(response.performance_curve[1].cumulative_pnl, 0.0);
    }

    #[test]
    fn open_trades_are_excluded() {
        let trades = vec![trade(
            1,
            TradeParams {
                status: TradeStatus::Open,
                exit_date: None,
                pnl: Some(dec!(999)),
                ..TradeParams::default()
            },
        )];

        let response = AnalyticsEngine::new().compute(&trades);
        assert_eq!(response.total_trades, 0);
        assert!(response.performance_curve.is_empty());
    }

    #[test]
    fn commissions_can_turn_a_gross_win_into_a_loss() {
        let trades = vec![trade(
            1,
            TradeParams {
                pnl: Some(dec!(100)),
                commissions: Some(dec!(150)),
                ..TradeParams::default()
            },
        )];

        let response = AnalyticsEngine::new().compute(&trades);
        assert_eq!(response.wins, 0);
        assert_eq!(response.losses, 1);
        assert_eq!(response.total_pnl, -50.0);
    }

    #[test]
    fn winner_without_declared_risk_is_excluded_from_risk_reward() {
        let trades = vec![trade(
            1,
            TradeParams {
                pnl: Some(dec!(300)),
                reward_amount: Some(dec!(600)),
                ..TradeParams::default()
            },
        )];

        let response = AnalyticsEngine::new().compute(&trades);
        assert_eq!(response.wins, 1);
        assert_eq!(response.average_risk_reward, 0.0);
    }

    #[test]
    fn missing_reward_falls_back_to_net_pnl() {
        let trades = vec![trade(
            1,
            TradeParams {
                pnl: Some(dec!(400)),
                commissions: Some(dec!(100)),
                risk_amount: Some(dec!(150)),
                ..TradeParams::default()
            },
        )];

        let response = AnalyticsEngine::new().compute(&trades);
        // reward defaults to |net P&L| = 300, risk = 150.
        assert_eq!(response.average_risk_reward, 2.0);
    }

    #[test]
    fn break_even_trade_is_neither_win_nor_loss() {
        let trades = vec![
            trade(
                1,
                TradeParams {
                    pnl: Some(dec!(50)),
                    commissions: Some(dec!(50)),
                    ..TradeParams::default()
                },
            ),
            trade(
                2,
                TradeParams {
                    exit_date: Some(day(2)),
                    pnl: Some(dec!(100)),
                    ..TradeParams::default()
                },
            ),
        ];

        let response = AnalyticsEngine::new().compute(&trades);
        assert_eq!(response.total_trades, 2);
        assert_eq!(response.wins, 1);
        assert_eq!(response.losses, 0);
        assert!(response.wins + response.losses < response.total_trades);
    }

    #[test]
    fn curve_is_sorted_by_completion_time_regardless_of_input_order() {
        let later = trade(
            1,
            TradeParams {
                exit_date: Some(day(9)),
                pnl: Some(dec!(-100)),
                ..TradeParams::default()
            },
        );
        let earlier = trade(
            2,
            TradeParams {
                exit_date: Some(day(3)),
                pnl: Some(dec!(250)),
                ..TradeParams::default()
            },
        );
        // Closed but never given an exit date: ordered by its entry date,
        // which precedes both exits here.
        let no_exit = trade(
            3,
            TradeParams {
                exit_date: None,
                pnl: Some(dec!(40)),
                ..TradeParams::default()
            },
        );

        let response = AnalyticsEngine::new().compute(&[later, earlier, no_exit]);
        let cumulative: Vec<f64> = response
            .performance_curve
            .iter()
            .map(|p| p.cumulative_pnl)
            .collect();
        assert_eq!(cumulative, vec![40.0, 290.0, 190.0]);
        assert_eq!(response.performance_curve[0].date, "2024-05-30T09:30:00.000Z");
    }

    #[test]
    fn total_pnl_matches_last_curve_point_and_result_is_order_independent() {
        let a = trade(
            1,
            TradeParams {
                exit_date: Some(day(1)),
                pnl: Some(dec!(120.50)),
                commissions: Some(dec!(4.10)),
                risk_amount: Some(dec!(60)),
                ..TradeParams::default()
            },
        );
        let b = trade(
            2,
            TradeParams {
                exit_date: Some(day(2)),
                pnl: Some(dec!(-75.25)),
                ..TradeParams::default()
            },
        );
        let c = trade(
            3,
            TradeParams {
                exit_date: Some(day(3)),
                pnl: Some(dec!(10)),
                commissions: Some(dec!(10)),
                ..TradeParams::default()
            },
        );

        let engine = AnalyticsEngine::new();
        let forward = engine.compute(&[a.clone(), b.clone(), c.clone()]);
        let reversed = engine.compute(&[c, b, a]);

        assert_eq!(
            forward.total_pnl,
            forward.performance_curve.last().unwrap().cumulative_pnl
        );
        assert_eq!(forward.total_pnl, reversed.total_pnl);
        assert_eq!(forward.performance_curve, reversed.performance_curve);
        assert_eq!(forward.wins, reversed.wins);
        assert_eq!(forward.losses, reversed.losses);
    }

    #[test]
    fn response_serializes_with_camel_case_keys() {
        let response = AnalyticsEngine::new().compute(&[trade(
            1,
            TradeParams {
                pnl: Some(dec!(25)),
                ..TradeParams::default()
            },
        )]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalTrades"], 1);
        assert_eq!(json["winRate"], 100.0);
        assert_eq!(json["performanceCurve"][0]["cumulativePnl"], 25.0);
        assert!(json["performanceCurve"][0]["date"].is_string());
    }
}
