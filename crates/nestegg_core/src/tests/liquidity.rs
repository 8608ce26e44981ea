//! Cushion top-offs, crisis home sales and reinvestment over full runs

use jiff::civil::date;

use super::fixtures::pinned_state;
use crate::config::{HomeConfig, HouseholdBuilder, HouseholdConfig};
use crate::ledger::memo;
use crate::model::{SALE_COMMISSION, label};
use crate::simulation::run;

fn paid_off_home() -> HomeConfig {
    HomeConfig {
        value: 300_000.0,
        ..HomeConfig::default()
    }
}

fn cash_strapped() -> HouseholdBuilder {
    HouseholdBuilder::new("Pat", "1960-01-01")
        .cash(1_000.0)
        .cushion(20_000.0)
        .monthly_living(2_000.0)
}

// ============================================================================
// Top-offs
// ============================================================================

#[test]
fn test_cushion_is_refilled_from_savings() {
    let config: HouseholdConfig = cash_strapped().slush_fund("Savings", 200_000.0).build();
    let result = run(pinned_state(&config, date(2025, 1, 1), 0.0, date(2027, 1, 1)));

    let first = result.balances[0].get("Cash").unwrap();
    assert!((first - 20_000.0).abs() < 0.01, "refilled to the cushion, got {first}");
    for snapshot in &result.balances {
        let cash = snapshot.get("Cash").unwrap();
        assert!(
            cash >= 15_000.0 - 0.01,
            "cash {cash} fell below 75% of the cushion on {}",
            snapshot.date
        );
    }
    let pulls = result
        .transactions
        .iter()
        .filter(|t| t.memo == memo::CUSHION)
        .count();
    assert!(pulls >= 8, "about one pull every three months, got {pulls}");
    assert!(!result.events.has(label::LIQUIDITY_CRISIS));
}

#[test]
fn test_locked_retirement_savings_are_not_touched() {
    let config = HouseholdBuilder::new("Pat", "1980-01-01")
        .cash(1_000.0)
        .cushion(20_000.0)
        .monthly_living(2_000.0)
        .tax_deferred("Work", 200_000.0)
        .build();
    let result = run(pinned_state(&config, date(2025, 1, 1), 0.0, date(2026, 1, 1)));
    assert!(
        result.transactions.iter().all(|t| t.memo != memo::CUSHION),
        "a 45 year old cannot draw on a 401k"
    );
    let last = result.balances.last().unwrap().get("Cash").unwrap();
    assert!(last < 0.0, "cash overdraws instead, got {last}");
}

// ============================================================================
// Crisis
// ============================================================================

#[test]
fn test_crisis_sells_the_home() {
    let config = cash_strapped().home(paid_off_home()).build();
    let result = run(pinned_state(&config, date(2025, 1, 1), 0.0, date(2026, 1, 1)));

    let crisis: Vec<_> = result
        .events
        .iter()
        .filter(|e| e.value == label::LIQUIDITY_CRISIS)
        .collect();
    assert_eq!(crisis.len(), 1, "the home can only be sold once");
    assert_eq!(crisis[0].date, date(2025, 1, 1));
    assert!(result.events.has(label::SELL_HOUSE));

    let first = &result.balances[0];
    assert!(first.get("Home").is_none(), "home is gone after the sale");
    let commission: f64 = result
        .transactions
        .iter()
        .filter(|t| t.memo == memo::HOME_SALE_COMMISSION)
        .map(|t| -t.amount)
        .sum();
    let proceeds: f64 = result
        .transactions
        .iter()
        .filter(|t| t.memo == memo::HOME_SALE)
        .map(|t| t.amount)
        .sum();
    assert!((commission - proceeds * SALE_COMMISSION).abs() < 1e-6);
    assert!(first.get("Cash").unwrap() > 250_000.0, "proceeds land in cash");
}

#[test]
fn test_sale_proceeds_are_reinvested_above_the_floor() {
    let config = cash_strapped()
        .slush_fund("Savings", 0.0)
        .home(paid_off_home())
        .build();
    let result = run(pinned_state(&config, date(2025, 1, 1), 0.0, date(2026, 1, 1)));

    assert!(result.events.has(label::LIQUIDITY_CRISIS));
    let first = &result.balances[0];
    let cash = first.get("Cash").unwrap();
    assert!((cash - 30_000.0).abs() < 0.01, "keeps one and a half cushions, got {cash}");
    let reinvested: f64 = result
        .transactions
        .iter()
        .filter(|t| t.memo == memo::REINVEST)
        .map(|t| -t.amount)
        .sum();
    assert!(reinvested > 240_000.0, "the rest goes back to work, got {reinvested}");
    assert!(first.get("Acct 0 - Savings").is_some());
}
