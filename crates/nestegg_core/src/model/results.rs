//! Simulation results and snapshots
//!
//! Contains the output of a single run (balance history, events and the cash
//! ledger) and the aggregate Monte Carlo summary built from many runs.

use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::ledger::Transaction;
use crate::model::EventList;

/// Named balances at the end of one month, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub date: Date,
    /// Zero balances are omitted; "Cash" and "Total" are always present.
    pub balances: BTreeMap<String, f64>,
}

impl BalanceSnapshot {
    pub fn new(date: Date) -> Self {
        Self {
            date,
            balances: BTreeMap::new(),
        }
    }

    /// Records `balance` under `name` unless it rounds to zero.
    pub fn insert_nonzero(&mut self, name: impl Into<String>, balance: f64) {
        let balance = round_cents(balance);
        if balance != 0.0 {
            self.balances.insert(name.into(), balance);
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, balance: f64) {
        self.balances.insert(name.into(), round_cents(balance));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.balances.get(name).copied()
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A run's ranking triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Headline {
    pub index: usize,
    /// Age at death in years.
    pub age: f64,
    /// Terminal net worth less outstanding tuition.
    pub balance: f64,
    /// Annualized market return over the run, as a fraction.
    pub market: f64,
}

/// Complete output of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub index: usize,
    pub age: f64,
    pub balance: f64,
    pub market: f64,
    /// Net worth less liabilities when the run began.
    pub start_balance: f64,
    /// Primary retirement age from configuration, for early-death counts.
    pub retirement_age: f64,
    pub balances: Vec<BalanceSnapshot>,
    pub events: EventList,
    /// Cash ledger of the household.
    pub transactions: Vec<Transaction>,
}

impl RunResult {
    pub fn headline(&self) -> Headline {
        Headline {
            index: self.index,
            age: self.age,
            balance: self.balance,
            market: self.market,
        }
    }

    /// Every balance name that appears anywhere in the history, sorted.
    pub fn balance_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .balances
            .iter()
            .flat_map(|s| s.balances.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// A value together with the run it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexedValue {
    pub index: usize,
    pub value: f64,
}

/// One rank taken independently from each sorted headline distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadlineRecord {
    pub age: IndexedValue,
    pub balance: IndexedValue,
    pub market: IndexedValue,
}

/// Aggregate over all runs of a Monte Carlo batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub count: usize,
    /// Runs whose primary died before retirement.
    pub early_deaths: Vec<usize>,
    pub liquidity_crises: Vec<usize>,
    pub bankruptcies: Vec<usize>,
    pub runs: Vec<Headline>,
    /// Net worth less liabilities at the start date.
    pub start: f64,
    pub worst: HeadlineRecord,
    pub p5: HeadlineRecord,
    pub p25: HeadlineRecord,
    pub median: HeadlineRecord,
    pub p75: HeadlineRecord,
    pub p95: HeadlineRecord,
    pub best: HeadlineRecord,
    pub mean: Headline,
}
