//! Cash-only households spending down under a flat market.
//!
//! With no investments, home, car or debts the cash balance follows a closed
//! recurrence: inflation erodes it, benefits add to it and living expenses
//! come out of it.

use jiff::civil::date;

use super::fixtures::pinned_state;
use crate::config::HouseholdBuilder;
use crate::date_math::start_of_month;
use crate::model::{Economy, label};
use crate::simulation::run;

// ============================================================================
// Recurrence
// ============================================================================

#[test]
fn test_cash_follows_expenses_and_inflation() {
    let start = date(2025, 1, 1);
    let config = HouseholdBuilder::new("Pat", "1950-06-01")
        .cash(50_000.0)
        .monthly_living(2_000.0)
        .cushion(10_000.0)
        .build();
    let economy = Economy::flat(start, 0.0);
    let result = run(pinned_state(&config, start, 0.0, date(2040, 1, 1)));

    assert_eq!(result.balances.len(), 180, "15 years of months");
    let mut expected = 50_000.0;
    let mut previous = f64::INFINITY;
    for snapshot in &result.balances {
        let month = start_of_month(snapshot.date);
        expected -= expected * economy.inflation(month) / 1200.0;
        expected -= 2_000.0;
        let cash = snapshot.get("Cash").unwrap();
        assert!(
            (cash - expected).abs() < 0.01,
            "cash on {} was {cash}, expected {expected}",
            snapshot.date
        );
        if cash > 0.0 {
            assert!(cash < previous, "cash must fall every month on {}", snapshot.date);
        }
        previous = cash;
    }
}

#[test]
fn test_social_security_offsets_expenses() {
    let start = date(2025, 1, 1);
    // Small enough to stay under the standard deduction, so nothing is withheld.
    let config = HouseholdBuilder::new("Pat", "1950-06-01")
        .social_security(62.0, [500.0, 700.0, 900.0])
        .cash(50_000.0)
        .monthly_living(2_000.0)
        .build();
    let economy = Economy::flat(start, 0.0);
    let result = run(pinned_state(&config, start, 0.0, date(2030, 1, 1)));

    let mut expected = 50_000.0;
    for snapshot in &result.balances {
        let month = start_of_month(snapshot.date);
        expected -= expected * economy.inflation(month) / 1200.0;
        expected += 500.0 - 2_000.0;
        let cash = snapshot.get("Cash").unwrap();
        assert!(
            (cash - expected).abs() < 0.01,
            "cash on {} was {cash}, expected {expected}",
            snapshot.date
        );
    }
    assert!(
        !result.events.has(label::TAX_BILL),
        "benefits under the standard deduction owe nothing"
    );
}

// ============================================================================
// Bankruptcy
// ============================================================================

#[test]
fn test_bankruptcy_logged_once_when_cash_runs_out() {
    let start = date(2025, 1, 1);
    let config = HouseholdBuilder::new("Pat", "1950-06-01")
        .cash(10_000.0)
        .monthly_living(3_000.0)
        .build();
    let result = run(pinned_state(&config, start, 0.0, date(2030, 1, 1)));

    let bankruptcies: Vec<_> = result
        .events
        .iter()
        .filter(|e| e.value == label::BANKRUPTCY)
        .collect();
    assert_eq!(bankruptcies.len(), 1, "logged once");

    let first_broke = result
        .balances
        .iter()
        .find(|s| s.get("Total").unwrap() <= 0.0)
        .unwrap();
    assert_eq!(
        bankruptcies[0].date,
        start_of_month(first_broke.date),
        "logged the month net worth first hit zero"
    );
    assert!(result.balance < 0.0);
}

#[test]
fn test_terminal_events_follow_death() {
    let start = date(2025, 1, 1);
    let config = HouseholdBuilder::new("Pat", "1970-01-01")
        .retirement_age(60.0)
        .social_security(70.0, [0.0, 0.0, 1_000.0])
        .cash(1_000_000.0)
        .child("Robin", "2015-03-01", &[10_000.0; 18])
        .build();
    // Dies at 58: no retirement, no benefits, but Robin graduates first.
    let result = run(pinned_state(&config, start, 0.0, date(2028, 1, 1)));

    assert!(!result.events.has(label::RETIRE));
    assert!(!result.events.has(label::SOCIAL_SECURITY));
    assert!(!result.events.has("Robin Graduation"), "graduates in 2033");
    let last = result.events.iter().last().unwrap();
    assert_eq!(last.value, label::DEATH);
    assert!(result.age < 65.0);
    // Terminal balance is net of the tuition Robin still needs.
    let total = result.balances.last().unwrap().get("Total").unwrap();
    assert!(result.balance < total - 50_000.0);
}
