use jiff::civil::Date;
use rand::rngs::SmallRng;

use crate::date_math::add_months;
use crate::ledger::memo;
use crate::model::{Books, EventList, Lifespan};
use crate::sampling::gauss;

/// Monthly benefit while unemployed.
pub const UNEMPLOYMENT_BENEFIT: f64 = 2_500.0;
/// Benefits are paid in unemployment months 2 through 12.
const BENEFIT_MONTHS: std::ops::RangeInclusive<u32> = 2..=12;

/// Layoff risk when the market return falls under `below`.
struct Downturn {
    below: f64,
    /// Tenure (mean, sd) in months after which a layoff lands.
    tenure: (f64, f64),
    /// Months until re-employment (mean, sd), as a negative tenure.
    gap: (f64, f64),
    /// Longest allowed gap, as a non-positive tenure.
    gap_cap: f64,
    pay_cut: Option<(f64, &'static str, u8)>,
}

const DOWNTURNS: [Downturn; 4] = [
    Downturn {
        below: -10.0,
        tenure: (12.0, 4.0),
        gap: (-4.0, 2.0),
        gap_cap: -1.0,
        pay_cut: Some((0.9, "10% Pay Cut", 5)),
    },
    Downturn {
        below: -2.0,
        tenure: (24.0, 6.0),
        gap: (-2.0, 2.0),
        gap_cap: -1.0,
        pay_cut: Some((0.95, "5% Pay Cut", 4)),
    },
    Downturn {
        below: 2.0,
        tenure: (36.0, 6.0),
        gap: (-2.0, 1.0),
        gap_cap: -1.0,
        pay_cut: None,
    },
    Downturn {
        below: 8.0,
        tenure: (42.0, 6.0),
        gap: (-2.0, 1.0),
        gap_cap: 0.0,
        pay_cut: None,
    },
];

const BOOM_TENURE: (f64, f64) = (42.0, 6.0);
const BOOM_RAISE: f64 = 1.05;
const ANNIVERSARY_RAISE: f64 = 1.01;

/// Salaried employment until retirement, with market-driven layoffs.
///
/// `tenure` counts months in the current job; a negative value counts down
/// the months until the next job starts.
#[derive(Debug, Clone)]
pub struct Job {
    owner_name: String,
    owner: Lifespan,
    retirement_age: f64,
    monthly: f64,
    tenure: i32,
    unemployed: u32,
    rng: SmallRng,
}

impl Job {
    pub fn new(owner_name: &str, owner: Lifespan, retirement_age: f64, annual_salary: f64, rng: SmallRng) -> Self {
        Self {
            owner_name: owner_name.to_string(),
            owner,
            retirement_age,
            monthly: annual_salary / 12.0,
            tenure: 0,
            unemployed: 0,
            rng,
        }
    }

    pub fn monthly_salary(&self) -> f64 {
        self.monthly
    }

    pub fn retired(&self, date: Date) -> bool {
        self.owner.age(date) >= self.retirement_age
    }

    fn event(&self, events: &mut EventList, date: Date, what: &str, severity: u8) {
        events.add(date, format!("{} {what}", self.owner_name), severity);
    }

    /// Advances the employment state for `date` given the month's
    /// annualized market return in percent.
    pub fn employed(&mut self, date: Date, market_return: f64, events: &mut EventList) -> bool {
        if self.retired(date) {
            self.unemployed = 0;
            return false;
        }
        if self.tenure < 0 {
            return false;
        }

        let Some(downturn) = DOWNTURNS.iter().find(|d| market_return < d.below) else {
            let (mean, sd) = BOOM_TENURE;
            if f64::from(self.tenure) > gauss(&mut self.rng, mean, sd).round()
                && self.owner.age(date) < self.retirement_age - 2.0
            {
                self.tenure = 0;
                self.monthly *= BOOM_RAISE;
                self.event(events, date, "Better Job", 3);
            }
            return true;
        };

        let (mean, sd) = downturn.tenure;
        if f64::from(self.tenure) <= gauss(&mut self.rng, mean, sd).round() {
            return true;
        }

        let (mean, sd) = downturn.gap;
        self.tenure = gauss(&mut self.rng, mean, sd).round().min(downturn.gap_cap) as i32;
        if let Some((factor, _, _)) = downturn.pay_cut {
            self.monthly *= factor;
        }
        self.event(events, date, "Job Loss", 7);

        let rehired = add_months(date, -self.tenure);
        if self.owner.age(rehired) < self.retirement_age - 0.5 {
            self.event(events, rehired, "New Job", 3);
            if let Some((_, what, severity)) = downturn.pay_cut {
                self.event(events, rehired, what, severity);
            }
        } else {
            self.tenure -= 12;
        }
        false
    }

    /// This month's salary, zero when out of work.
    pub fn earn(&mut self, date: Date, market_return: f64, events: &mut EventList) -> f64 {
        if !self.employed(date, market_return, events) {
            self.unemployed += 1;
            return 0.0;
        }
        self.unemployed = 0;
        if self.tenure != 0 && self.tenure % 12 == 0 {
            self.monthly *= ANNIVERSARY_RAISE;
        }
        self.monthly
    }

    pub fn unemployment(&self) -> f64 {
        if BENEFIT_MONTHS.contains(&self.unemployed) {
            UNEMPLOYMENT_BENEFIT
        } else {
            0.0
        }
    }

    /// Deposits salary (payroll-withheld) and any unemployment benefit
    /// (withheld as ordinary income).
    pub fn monthly(&mut self, date: Date, market_return: f64, books: &mut Books<'_>, events: &mut EventList) {
        let salary = self.earn(date, market_return, events);
        let _ = books.cash.deposit(salary, date, memo::SALARY);
        books.taxes.withhold(salary, date, true, books.cash);

        let benefit = self.unemployment();
        let _ = books.cash.deposit(benefit, date, memo::UNEMPLOYMENT);
        books.taxes.withhold(benefit, date, false, books.cash);

        self.tenure += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, CashAccount};
    use crate::taxes::TaxMen;
    use jiff::civil::date;
    use rand::SeedableRng;

    fn worker(retirement_age: f64) -> Job {
        let owner = Lifespan {
            birth_date: date(1985, 1, 1),
            death_date: date(2080, 1, 1),
        };
        Job::new("Sam", owner, retirement_age, 120_000.0, SmallRng::seed_from_u64(17))
    }

    fn run_months(job: &mut Job, start: Date, months: i32, market: f64) -> (CashAccount, EventList) {
        let mut cash = CashAccount::open(0.0, start);
        let mut taxes = TaxMen::new("");
        let mut events = EventList::new();
        for m in 0..months {
            let mut books = Books {
                cash: &mut cash,
                taxes: &mut taxes,
            };
            job.monthly(add_months(start, m), market, &mut books, &mut events);
        }
        (cash, events)
    }

    #[test]
    fn test_steady_market_pays_salary_with_raises() {
        let mut job = worker(65.0);
        let start = date(2025, 1, 1);
        // Just under the boom threshold with tenure kept short of any layoff.
        let (cash, events) = run_months(&mut job, start, 13, 8.5);
        let salary = cash.ledger().memo_in(&[memo::SALARY]);
        assert_eq!(salary.len(), 13);
        assert_eq!(salary.transactions()[0].amount, 10_000.0);
        assert!(
            (salary.transactions()[12].amount - 10_100.0).abs() < 1e-9,
            "1% raise on the first anniversary"
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_crash_eventually_lays_off_and_rehires() {
        let mut job = worker(65.0);
        let start = date(2025, 1, 1);
        let (cash, events) = run_months(&mut job, start, 60, -20.0);
        assert!(events.has("Sam Job Loss"));
        assert!(events.has("Sam New Job"));
        assert!(events.has("Sam 10% Pay Cut"));
        assert!(job.monthly_salary() < 10_000.0);
        assert!(cash.ledger().memo_in(&[memo::UNEMPLOYMENT]).len() <= 60);
    }

    #[test]
    fn test_retired_worker_earns_nothing() {
        let mut job = worker(30.0);
        let (cash, events) = run_months(&mut job, date(2025, 1, 1), 24, 0.0);
        assert!(cash.ledger().is_empty() || cash.balance() == 0.0);
        assert_eq!(job.unemployment(), 0.0, "retirement is not unemployment");
        assert!(events.is_empty());
    }

    #[test]
    fn test_benefit_window() {
        let mut job = worker(65.0);
        job.unemployed = 1;
        assert_eq!(job.unemployment(), 0.0);
        job.unemployed = 2;
        assert_eq!(job.unemployment(), UNEMPLOYMENT_BENEFIT);
        job.unemployed = 12;
        assert_eq!(job.unemployment(), UNEMPLOYMENT_BENEFIT);
        job.unemployed = 13;
        assert_eq!(job.unemployment(), 0.0);
    }

    #[test]
    fn test_layoff_near_retirement_is_final() {
        // Retires in the middle of 2027.
        let owner = Lifespan {
            birth_date: date(1962, 7, 1),
            death_date: date(2080, 1, 1),
        };
        let mut job = Job::new("Sam", owner, 65.0, 120_000.0, SmallRng::seed_from_u64(5));
        job.tenure = 200;
        let mut events = EventList::new();
        assert!(!job.employed(date(2027, 3, 1), -20.0, &mut events));
        assert!(events.has("Sam Job Loss"));
        assert!(!events.has("Sam New Job"));
    }
}
