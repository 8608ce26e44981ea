use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{add_years, start_of_year};
use crate::error::AccountError;
use crate::ledger::{Ledger, Transaction, memo};
use crate::model::{Account, Books, CashAccount, Debt, EventList, label};

/// Value lost each month until the next repair cycle.
pub const MONTHLY_DEPRECIATION: f64 = 200.0;
pub const SALE_COMMISSION: f64 = 0.06;

/// The household residence: a value ledger plus its mortgage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Home {
    ledger: Ledger,
    mortgage: Debt,
    /// Fraction of value due every November.
    property_tax: f64,
    /// Monthly rent once the home is gone or was never owned.
    rent: f64,
}

impl Home {
    pub fn new(value: f64, mortgage: Debt, property_tax: f64, rent: f64, start: Date) -> Self {
        let mut home = Self {
            ledger: Ledger::new(),
            mortgage,
            property_tax,
            rent,
        };
        home.transact(value, start, memo::OPEN_ACCOUNT);
        home
    }

    /// Renting, with a placeholder mortgage.
    pub fn rented(rent: f64, start: Date) -> Self {
        Self::new(0.0, Debt::imaginary("Imaginary Mortgage", start), 0.0, rent, start)
    }

    pub fn value(&self) -> f64 {
        self.ledger.balance()
    }

    pub fn mortgage(&self) -> &Debt {
        &self.mortgage
    }

    pub fn rent(&self) -> f64 {
        self.rent
    }

    /// Cash-funded improvement to the home's value.
    pub fn deposit(
        &mut self,
        amount: f64,
        date: Date,
        memo: &str,
        cash: &mut CashAccount,
    ) -> Result<Option<Transaction>, AccountError> {
        if amount < 0.0 {
            return Err(AccountError::NegativeAmount {
                account: self.name().to_string(),
                amount,
            });
        }
        if amount == 0.0 {
            return Ok(None);
        }
        cash.withdraw(amount, date, memo)?;
        Ok(self.transact(amount, date, memo))
    }

    pub fn withdraw(&mut self, amount: f64) -> Result<Option<Transaction>, AccountError> {
        if amount == 0.0 {
            return Ok(None);
        }
        Err(AccountError::Unsupported {
            account: self.name().to_string(),
            operation: "withdraw from",
        })
    }

    pub fn depreciate(&mut self, date: Date) -> Option<Transaction> {
        self.transact(-MONTHLY_DEPRECIATION, date, memo::HOME_DEPRECIATION)
    }

    /// Every June of a year divisible by five, repairs undo the last five
    /// years of depreciation.
    pub fn maintain(&mut self, date: Date, cash: &mut CashAccount, events: &mut EventList) {
        if date.year() % 5 != 0 || date.month() != 6 {
            return;
        }
        let lookback = add_years(date, -5);
        let depreciation = self
            .ledger
            .on_or_after(lookback)
            .memo_in(&[memo::HOME_DEPRECIATION])
            .balance();
        let _ = self.deposit(-depreciation, date, memo::HOME_MAINTENANCE, cash);
        events.add(date, label::HOME_REPAIRS, 4);
    }

    pub fn pay_off(&mut self, date: Date, cash: &mut CashAccount) -> Option<Transaction> {
        self.mortgage.pay_off(date, memo::MORTGAGE_PAYOFF, cash)
    }

    /// Pays off the mortgage and sells at current value less commission.
    pub fn liquidate(&mut self, date: Date, cash: &mut CashAccount, events: &mut EventList) -> Option<Transaction> {
        self.pay_off(date, cash);
        let sale = self.transact(-self.balance(), date, memo::HOME_SALE)?;
        let proceeds = -sale.amount;
        let _ = cash.deposit(proceeds, date, memo::HOME_SALE);
        let _ = cash.withdraw(proceeds * SALE_COMMISSION, date, memo::HOME_SALE_COMMISSION);
        events.add(date, label::SELL_HOUSE, 8);
        tracing::debug!(%date, proceeds, "home sold");
        Some(sale)
    }

    pub fn monthly(&mut self, date: Date, needs_assisted_living: bool, books: &mut Books<'_>, events: &mut EventList) {
        if needs_assisted_living {
            if self.value() > 0.0 {
                self.liquidate(date, books.cash, events);
                events.add(date, label::ASSISTED_LIVING, 7);
            }
            return;
        }
        if self.value() > 0.0 {
            if date.month() == 11 {
                let tax = self.value() * self.property_tax;
                let _ = books.cash.withdraw(tax, date, memo::PROPERTY_TAX);
                books.taxes.deduct(tax);
                events.add(date, label::PROPERTY_TAXES, 2);
            }
            self.depreciate(date);
            self.maintain(date, books.cash, events);
            self.mortgage.monthly(date, books.cash, books.taxes, events);
        } else {
            let _ = books.cash.withdraw(self.rent, date, memo::RENT);
        }
    }
}

impl Account for Home {
    fn name(&self) -> &str {
        "Home"
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn transact(&mut self, amount: f64, date: Date, memo: &str) -> Option<Transaction> {
        self.ledger.record(amount, date, memo)
    }

    /// Equity: value plus the (non-positive) mortgage balance.
    fn balance(&self) -> f64 {
        self.value() + self.mortgage.balance()
    }

    fn year_end_balance(&self, date: Date) -> f64 {
        self.ledger.before(start_of_year(date)).balance() + self.mortgage.year_end_balance(date)
    }

    fn balance_on(&self, date: Date) -> f64 {
        self.ledger.before(date).balance() + self.mortgage.balance_on(date)
    }

    fn can_withdraw(&self, _date: Date) -> bool {
        false
    }

    fn can_deposit(&self, _date: Date) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_math::add_months;
    use crate::taxes::TaxMen;
    use jiff::civil::date;

    fn owned(start: Date) -> Home {
        let mortgage = Debt::mortgage("Home", 100_000.0, 0.04, date(2045, 1, 1), start);
        Home::new(400_000.0, mortgage, 0.01, 2_000.0, start)
    }

    #[test]
    fn test_equity_nets_mortgage() {
        let start = date(2025, 1, 1);
        let home = owned(start);
        assert_eq!(home.value(), 400_000.0);
        assert_eq!(home.balance(), 300_000.0);
        assert_eq!(home.mortgage().name(), "Home Mortgage");
    }

    #[test]
    fn test_liquidation_pays_commission() {
        let start = date(2025, 1, 1);
        let mut cash = CashAccount::open(200_000.0, start);
        let mut events = EventList::new();
        let mut home = owned(start);
        let sale = home.liquidate(start, &mut cash, &mut events).unwrap();
        assert_eq!(sale.amount, -400_000.0);
        assert_eq!(home.value(), 0.0);
        assert_eq!(home.mortgage().balance(), 0.0);
        // 200k - 100k payoff + 400k sale - 24k commission
        assert!((cash.balance() - 476_000.0).abs() < 1e-6);
        assert!(events.has(label::SELL_HOUSE));
    }

    #[test]
    fn test_rent_once_home_is_gone() {
        let start = date(2025, 1, 1);
        let mut cash = CashAccount::open(10_000.0, start);
        let mut taxes = TaxMen::new("");
        let mut events = EventList::new();
        let mut home = Home::rented(1_500.0, start);
        let mut books = Books {
            cash: &mut cash,
            taxes: &mut taxes,
        };
        home.monthly(start, false, &mut books, &mut events);
        assert_eq!(cash.balance(), 8_500.0);
        assert_eq!(cash.ledger().transactions()[1].memo, memo::RENT);
    }

    #[test]
    fn test_assisted_living_sells_and_stops_rent() {
        let start = date(2025, 1, 1);
        let mut cash = CashAccount::open(0.0, start);
        let mut taxes = TaxMen::new("");
        let mut events = EventList::new();
        let mut home = owned(start);
        let mut books = Books {
            cash: &mut cash,
            taxes: &mut taxes,
        };
        home.monthly(start, true, &mut books, &mut events);
        assert!(events.has(label::ASSISTED_LIVING));
        assert_eq!(home.value(), 0.0);
        let entries = cash.ledger().len();
        let mut books = Books {
            cash: &mut cash,
            taxes: &mut taxes,
        };
        home.monthly(add_months(start, 1), true, &mut books, &mut events);
        assert_eq!(cash.ledger().len(), entries, "no rent while in care");
    }

    #[test]
    fn test_november_property_tax() {
        let start = date(2025, 11, 1);
        let mut cash = CashAccount::open(50_000.0, start);
        let mut taxes = TaxMen::new("");
        let mut events = EventList::new();
        let mut home = Home::new(300_000.0, Debt::imaginary("Imaginary Mortgage", start), 0.012, 0.0, start);
        let mut books = Books {
            cash: &mut cash,
            taxes: &mut taxes,
        };
        home.monthly(start, false, &mut books, &mut events);
        assert!(events.has(label::PROPERTY_TAXES));
        assert!((cash.balance() - (50_000.0 - 3_600.0)).abs() < 1e-6);
        assert_eq!(home.value(), 300_000.0 - MONTHLY_DEPRECIATION);
    }

    #[test]
    fn test_repairs_reverse_five_years_of_depreciation() {
        // The June 2025 cycle falls just before the first month simulated.
        let start = date(2025, 7, 1);
        let mut cash = CashAccount::open(1_000_000.0, start);
        let mut taxes = TaxMen::new("");
        let mut events = EventList::new();
        let mut home = Home::new(500_000.0, Debt::imaginary("Imaginary Mortgage", start), 0.0, 0.0, start);
        let mut d = start;
        while d < date(2030, 6, 1) {
            let mut books = Books {
                cash: &mut cash,
                taxes: &mut taxes,
            };
            home.monthly(d, false, &mut books, &mut events);
            d = add_months(d, 1);
        }
        assert!(!events.has(label::HOME_REPAIRS));
        let mut books = Books {
            cash: &mut cash,
            taxes: &mut taxes,
        };
        home.monthly(d, false, &mut books, &mut events);
        assert!(events.has(label::HOME_REPAIRS));
        assert!(
            (home.value() - 500_000.0).abs() < 1e-6,
            "value restored, got {}",
            home.value()
        );
    }

    #[test]
    fn test_withdrawal_rejected() {
        let mut home = owned(date(2025, 1, 1));
        assert!(home.withdraw(1.0).is_err());
        assert_eq!(home.withdraw(0.0), Ok(None));
    }
}
