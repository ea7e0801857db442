//! Valuation tests: per-holding mark-to-market, summary identities, and
//! allocation percentages.

use chrono::Utc;
use papertrade::portfolio::{Holding, summarize};
use papertrade::types::instrument::Instrument;
use uuid::Uuid;

fn instrument(symbol: &str, current_price: f64) -> Instrument {
    Instrument {
        id: Uuid::new_v4(),
        symbol: symbol.to_string(),
        name: format!("{symbol} Ltd."),
        current_price,
        previous_close: current_price,
        updated_at: Utc::now(),
    }
}

fn holding(symbol: &str, quantity: i64, average_cost: f64, current_price: f64) -> Holding {
    Holding::from_parts(
        instrument(symbol, current_price),
        quantity,
        average_cost,
        Utc::now(),
    )
}

#[test]
fn holding_marks_to_market() {
    let h = holding("ACME", 10, 100.0, 120.0);

    assert_eq!(h.current_value, 1_200.0);
    assert_eq!(h.profit_loss, 200.0);
    assert_eq!(h.profit_loss_percentage, 20.0);
}

#[test]
fn holding_with_loss_has_negative_pnl() {
    let h = holding("ACME", 4, 50.0, 40.0);

    assert_eq!(h.current_value, 160.0);
    assert_eq!(h.profit_loss, -40.0);
    assert_eq!(h.profit_loss_percentage, -20.0);
}

#[test]
fn zero_average_cost_does_not_divide_by_zero() {
    let h = holding("ACME", 10, 0.0, 120.0);

    assert_eq!(h.profit_loss_percentage, 0.0);
}

#[test]
fn summary_total_value_is_current_plus_cash() {
    let holdings = vec![
        holding("AAA", 10, 100.0, 120.0),
        holding("BBB", 5, 200.0, 180.0),
    ];
    let summary = summarize(&holdings, 42_500.0);

    assert_eq!(summary.total_invested_value, 2_000.0);
    assert_eq!(summary.total_current_value, 2_100.0);
    assert_eq!(summary.total_value, summary.total_current_value + summary.wallet_balance);
    assert_eq!(summary.total_value, 44_600.0);
    assert_eq!(summary.profit_loss, 100.0);
    assert_eq!(summary.profit_loss_percentage, 5.0);
}

#[test]
fn allocation_percentages_sum_to_100() {
    let holdings = vec![
        holding("AAA", 10, 100.0, 100.0),
        holding("BBB", 30, 10.0, 10.0),
        holding("CCC", 7, 100.0, 100.0),
    ];
    let summary = summarize(&holdings, 0.0);

    let total: f64 = summary
        .asset_allocation
        .iter()
        .map(|slice| slice.percentage)
        .sum();
    assert!((total - 100.0).abs() < 1e-9);
    assert_eq!(summary.asset_allocation.len(), 3);
}

#[test]
fn empty_portfolio_summary_is_cash_only() {
    let summary = summarize(&[], 100_000.0);

    assert_eq!(summary.total_invested_value, 0.0);
    assert_eq!(summary.total_current_value, 0.0);
    assert_eq!(summary.total_value, 100_000.0);
    assert_eq!(summary.profit_loss, 0.0);
    assert_eq!(summary.profit_loss_percentage, 0.0);
    assert!(summary.asset_allocation.is_empty());
}

#[test]
fn worthless_holdings_zero_out_allocation() {
    // current_price floors at a cent in the simulator, but the valuator must
    // stay zero-safe if total current value ever reaches 0.
    let summary = summarize(&[], 0.0);

    assert_eq!(summary.total_value, 0.0);
    assert_eq!(summary.profit_loss_percentage, 0.0);
}

#[test]
fn summary_matches_worked_example() {
    // After BUY 10 @ 100 and SELL 4 @ 120 the ledger holds 99480 cash and a
    // 6-share position at average cost 100. Mark at 120.
    let holdings = vec![holding("ACME", 6, 100.0, 120.0)];
    let summary = summarize(&holdings, 99_480.0);

    assert_eq!(summary.total_invested_value, 600.0);
    assert_eq!(summary.total_current_value, 720.0);
    assert_eq!(summary.total_value, 100_200.0);
    assert_eq!(summary.profit_loss, 120.0);
    assert_eq!(summary.asset_allocation[0].percentage, 100.0);
}
