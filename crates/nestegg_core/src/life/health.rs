use jiff::civil::Date;
use rand::rngs::SmallRng;

use crate::date_math::years_between;
use crate::ledger::memo;
use crate::model::{CashAccount, EventList, Lifespan, label};
use crate::sampling::uniform;

/// Insurance premiums and random out-of-pocket medical costs, both growing
/// with health-care inflation from the start date.
#[derive(Debug, Clone)]
pub struct HealthCare {
    start: Date,
    premium: f64,
    out_of_pocket: f64,
    inflation: f64,
    rng: SmallRng,
}

impl HealthCare {
    pub fn new(start: Date, premium: f64, out_of_pocket: f64, inflation: f64, rng: SmallRng) -> Self {
        Self {
            start,
            premium,
            out_of_pocket,
            inflation,
            rng,
        }
    }

    pub fn inflator(&self, date: Date) -> f64 {
        (1.0 + self.inflation).powf(years_between(self.start, date))
    }

    pub fn premium(&self, date: Date) -> f64 {
        self.premium * self.inflator(date)
    }

    /// A health issue strikes with a twelfth of the year's death risk and
    /// costs the out-of-pocket maximum.
    pub fn out_of_pocket(&mut self, date: Date, death_risk: f64, events: &mut EventList) -> f64 {
        if uniform(&mut self.rng) <= death_risk / 12.0 {
            events.add(date, label::HEALTH_ISSUE, 8);
            self.out_of_pocket * self.inflator(date)
        } else {
            0.0
        }
    }

    pub fn monthly(&mut self, date: Date, death_risk: f64, cash: &mut CashAccount, events: &mut EventList) {
        let _ = cash.withdraw(self.premium(date), date, memo::HEALTH_INSURANCE);
        let cost = self.out_of_pocket(date, death_risk, events);
        let _ = cash.withdraw(cost, date, memo::HEALTH_CARE);
    }
}

/// Care needed late in a long life. Deterministic given the sampled
/// lifespan, so it draws no randomness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssistedLiving {
    owner: Lifespan,
    basic_rate: f64,
    terminal_rate: f64,
}

impl AssistedLiving {
    pub fn new(owner: Lifespan, basic_rate: f64, terminal_rate: f64) -> Self {
        Self {
            owner,
            basic_rate,
            terminal_rate,
        }
    }

    /// Only people who live past 82 need care: past 95, or in their final
    /// two years.
    pub fn needed(&self, date: Date) -> bool {
        let death = self.owner.death_age();
        if death < 82.0 {
            return false;
        }
        let age = self.owner.age(date);
        age > 95.0 || age > death - 2.0
    }

    /// Final-year care for people who live past 85.
    pub fn terminal(&self, date: Date) -> bool {
        let death = self.owner.death_age();
        death >= 85.0 && self.owner.age(date) > death - 1.0
    }

    pub fn monthly_cost(&self, date: Date) -> f64 {
        if !self.needed(date) {
            0.0
        } else if self.terminal(date) {
            self.terminal_rate
        } else {
            self.basic_rate
        }
    }

    pub fn monthly(&self, date: Date, cash: &mut CashAccount) {
        let _ = cash.withdraw(self.monthly_cost(date), date, memo::ASSISTED_LIVING);
    }
}
