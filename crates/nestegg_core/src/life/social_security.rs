use jiff::civil::Date;

use crate::date_math::add_fractional_years;
use crate::ledger::memo;
use crate::model::{Books, Lifespan};

/// Earliest claiming age.
pub const EARLY_AGE: f64 = 62.0;
const FULL_AGE: f64 = 67.0;
const DELAYED_AGE: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SocialSecurity {
    owner: Lifespan,
    /// Age benefits begin.
    age: f64,
    /// Monthly benefit.
    payout: f64,
}

impl SocialSecurity {
    pub fn new(owner: Lifespan, age: f64, payout: f64) -> Self {
        Self { owner, age, payout }
    }

    /// Picks a payout tier from the planned claiming age. `payouts` holds
    /// the monthly benefit at 62, at full retirement age and at 70.
    pub fn from_tiers(owner: Lifespan, claiming_age: f64, payouts: [f64; 3]) -> Self {
        if claiming_age >= DELAYED_AGE {
            Self::new(owner, claiming_age, payouts[2])
        } else if claiming_age >= FULL_AGE {
            Self::new(owner, claiming_age, payouts[1])
        } else {
            Self::new(owner, EARLY_AGE, payouts[0])
        }
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn payout(&self) -> f64 {
        self.payout
    }

    pub fn benefits_date(&self) -> Date {
        add_fractional_years(self.owner.birth_date, self.age)
    }

    pub fn earn(&self, date: Date) -> f64 {
        if self.owner.age(date) < self.age {
            0.0
        } else {
            self.payout
        }
    }

    /// Deposits the benefit, withheld as ordinary income.
    pub fn monthly(&self, date: Date, books: &mut Books<'_>) {
        let amount = self.earn(date);
        let _ = books.cash.deposit(amount, date, memo::SOCIAL_SECURITY);
        books.taxes.withhold(amount, date, false, books.cash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, CashAccount};
    use crate::taxes::TaxMen;
    use jiff::civil::date;

    fn owner() -> Lifespan {
        Lifespan {
            birth_date: date(1960, 3, 15),
            death_date: date(2060, 1, 1),
        }
    }

    #[test]
    fn test_tier_selection() {
        let payouts = [1_500.0, 2_200.0, 2_800.0];
        let early = SocialSecurity::from_tiers(owner(), 64.0, payouts);
        assert_eq!((early.age(), early.payout()), (62.0, 1_500.0));
        let full = SocialSecurity::from_tiers(owner(), 67.5, payouts);
        assert_eq!((full.age(), full.payout()), (67.5, 2_200.0));
        let late = SocialSecurity::from_tiers(owner(), 70.0, payouts);
        assert_eq!((late.age(), late.payout()), (70.0, 2_800.0));
    }

    #[test]
    fn test_benefits_date_adds_fractional_year() {
        let ss = SocialSecurity::new(owner(), 67.5, 2_000.0);
        // 182 days past the 67th birthday
        assert_eq!(ss.benefits_date(), date(2027, 9, 13));
    }

    #[test]
    fn test_payments_start_at_claiming_age() {
        let ss = SocialSecurity::new(owner(), 62.0, 1_000.0);
        let mut cash = CashAccount::open(0.0, date(2022, 1, 1));
        let mut taxes = TaxMen::new("");
        let mut books = Books {
            cash: &mut cash,
            taxes: &mut taxes,
        };
        ss.monthly(date(2022, 3, 1), &mut books);
        ss.monthly(date(2022, 4, 1), &mut books);
        let deposits = cash.ledger().memo_in(&[memo::SOCIAL_SECURITY]);
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits.transactions()[0].date, date(2022, 4, 1));
        assert_eq!(taxes.social_security.earnings(), 0.0, "not payroll income");
    }
}
