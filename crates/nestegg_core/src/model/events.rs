//! Household life events logged during a run.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Event labels the harness and reports look for by name.
pub mod label {
    pub const TAX_BILL: &str = "Tax Bill";
    pub const TAX_REFUND: &str = "Tax Refund";
    pub const LIQUIDITY_CRISIS: &str = "Liquidity Crisis";
    pub const BANKRUPTCY: &str = "Bankruptcy";
    pub const RETIRE: &str = "Retire";
    pub const SOCIAL_SECURITY: &str = "Social Security";
    pub const DEATH: &str = "Death";
    pub const SELL_HOUSE: &str = "Sell House";
    pub const HOME_REPAIRS: &str = "Home Repairs";
    pub const PROPERTY_TAXES: &str = "Property Taxes";
    pub const ASSISTED_LIVING: &str = "Move to Assisted Living";
    pub const HEALTH_ISSUE: &str = "Health Issue";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub date: Date,
    /// Label shown in reports, e.g. "Tax Bill" or "Alice Job Loss".
    pub value: String,
    /// 1 (routine) to 10 (catastrophic).
    pub severity: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventList(Vec<Event>);

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, date: Date, value: impl Into<String>, severity: u8) {
        self.0.push(Event {
            date,
            value: value.into(),
            severity,
        });
    }

    pub fn has(&self, value: &str) -> bool {
        self.0.iter().any(|e| e.value == value)
    }

    /// Stable chronological sort; same-day events keep insertion order.
    pub fn sort(&mut self) {
        self.0.sort_by_key(|e| e.date);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a EventList {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
