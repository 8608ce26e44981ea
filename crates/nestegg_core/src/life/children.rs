use jiff::civil::{Date, date};

use crate::date_math::{add_years, years_between};
use crate::ledger::memo;
use crate::model::CashAccount;

/// A dependent with a per-grade-year tuition schedule. Tuition for year `i`
/// is due while the child's age in whole years is `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    name: String,
    birth_date: Date,
    tuition: Vec<f64>,
}

impl Child {
    pub fn new(name: &str, birth_date: Date, tuition: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            birth_date,
            tuition,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self, date: Date) -> f64 {
        years_between(self.birth_date, date)
    }

    /// June 30 after the last tuition year. Children born from September on
    /// start a year later.
    pub fn graduation_date(&self) -> Date {
        let late_birthday = i16::from(self.birth_date.month() >= 9);
        let first = date(self.birth_date.year() + late_birthday, 6, 30);
        add_years(first, self.tuition.len() as i32)
    }

    /// Tuition still to be paid from `date` on, prorating the current year.
    pub fn remaining(&self, date: Date) -> f64 {
        let age = self.age(date);
        if age <= 0.0 {
            return self.tuition.iter().sum();
        }
        let year = age.floor() as usize;
        let Some(current) = self.tuition.get(year) else {
            return 0.0;
        };
        let left_this_year = 1.0 + year as f64 - age;
        current * left_this_year + self.tuition[year + 1..].iter().sum::<f64>()
    }

    pub fn monthly(&self, date: Date, cash: &mut CashAccount) {
        let age = self.age(date);
        if age < 0.0 {
            return;
        }
        if let Some(annual) = self.tuition.get(age.floor() as usize) {
            let _ = cash.withdraw(annual / 12.0, date, memo::TUITION_PAYMENT);
        }
    }
}
