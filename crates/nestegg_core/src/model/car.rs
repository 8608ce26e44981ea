use std::f64::consts::PI;

use jiff::civil::Date;
use rand::rngs::SmallRng;

use crate::date_math::{add_years, start_of_year, years_between};
use crate::error::AccountError;
use crate::ledger::{Ledger, Transaction, memo};
use crate::model::{Account, Books, CashAccount, Debt, EventList, Lifespan};
use crate::sampling::gauss;

const LOAN_RATE: f64 = 0.05;
const LOAN_YEARS: i32 = 5;
const MAINTENANCE_RATE: f64 = 0.005;
const MAINTENANCE_AFTER_YEARS: f64 = 5.0;

/// Fraction of the purchase price a car keeps after `age_months`. Falls
/// along an arctangent curve toward a 10% floor.
pub fn residual_value(age_months: f64) -> f64 {
    0.1 + 0.9 * ((-0.03 * (age_months - 80.0)).atan() + PI / 2.0) / PI
}

/// Share of a replacement financed, given cash on hand.
pub fn financed_share(cash: f64, cost: f64) -> f64 {
    if cash > cost {
        0.5
    } else if cash > cost / 2.0 {
        0.75
    } else {
        0.95
    }
}

/// One person's car and its loan. A purchase price of zero means no car.
#[derive(Debug, Clone)]
pub struct Car {
    name: String,
    owner_name: String,
    owner: Lifespan,
    ledger: Ledger,
    purchase_price: f64,
    purchase_date: Date,
    loan: Debt,
    rng: SmallRng,
}

impl Car {
    pub fn new(
        owner_name: &str,
        owner: Lifespan,
        purchase_price: f64,
        purchase_date: Date,
        loan: Debt,
        start: Date,
        rng: SmallRng,
    ) -> Self {
        let mut car = Self {
            name: format!("{owner_name}'s Car"),
            owner_name: owner_name.to_string(),
            owner,
            ledger: Ledger::new(),
            purchase_price,
            purchase_date,
            loan,
            rng,
        };
        car.transact(purchase_price, purchase_date, memo::OPEN_ACCOUNT);
        car.depreciate(start);
        car
    }

    pub fn value(&self) -> f64 {
        self.ledger.balance()
    }

    pub fn loan(&self) -> &Debt {
        &self.loan
    }

    pub fn purchase_price(&self) -> f64 {
        self.purchase_price
    }

    pub fn purchase_date(&self) -> Date {
        self.purchase_date
    }

    /// Years since purchase.
    pub fn age(&self, date: Date) -> f64 {
        years_between(self.purchase_date, date)
    }

    /// Marks the value down to the residual curve, never below zero.
    pub fn depreciate(&mut self, date: Date) -> Option<Transaction> {
        let value = self.value();
        if value <= 0.0 {
            return None;
        }
        let target = self.purchase_price * residual_value(self.age(date) * 12.0);
        let delta = (target - value).max(-value);
        self.transact(delta, date, memo::CAR_DEPRECIATION)
    }

    pub fn maintain(&mut self, date: Date, cash: &mut CashAccount) {
        if self.value() > 0.0 && self.age(date) > MAINTENANCE_AFTER_YEARS {
            let _ = cash.withdraw(
                self.purchase_price * MAINTENANCE_RATE,
                date,
                memo::CAR_MAINTENANCE,
            );
        }
    }

    pub fn pay_off(&mut self, date: Date, cash: &mut CashAccount) -> Option<Transaction> {
        self.loan.pay_off(date, memo::CAR_PAYOFF, cash)
    }

    /// Pays off the loan and sells at current value.
    pub fn liquidate(&mut self, date: Date, cash: &mut CashAccount) -> Option<Transaction> {
        self.pay_off(date, cash);
        let sale = self.transact(-self.balance(), date, memo::CAR_SALE)?;
        let _ = cash.deposit(-sale.amount, date, memo::CAR_SALE);
        Some(sale)
    }

    /// Sells the current car and buys another at the original price,
    /// financing more of it the less cash there is.
    pub fn replace(&mut self, date: Date, cash: &mut CashAccount, events: &mut EventList) {
        let cost = self.purchase_price;
        let finance = financed_share(cash.balance(), cost);
        self.liquidate(date, cash);
        self.loan = Debt::open("Car Loan", cost * finance, LOAN_RATE, add_years(date, LOAN_YEARS), date);
        let _ = cash.withdraw(cost * (1.0 - finance), date, memo::CAR_PURCHASE);
        self.transact(cost, date, memo::CAR_PURCHASE);
        self.purchase_date = date;
        self.depreciate(date);
        events.add(date, format!("{} New Car", self.owner_name), 4);
    }

    fn quit_driving(&mut self, date: Date, cash: &mut CashAccount, events: &mut EventList) {
        if self.value() > 0.0 {
            self.liquidate(date, cash);
            events.add(date, format!("{} Quit Driving", self.owner_name), 7);
        }
    }

    pub fn monthly(&mut self, date: Date, books: &mut Books<'_>, events: &mut EventList) {
        self.depreciate(date);
        self.loan.monthly(date, books.cash, books.taxes, events);
        if self.purchase_price <= 0.0 || self.value() <= 0.0 {
            return;
        }

        let age = self.owner.age(date);
        let terminal = age >= 80.0 && self.owner.death_age() - age <= 1.0;
        if age > 85.0 || terminal {
            self.quit_driving(date, books.cash, events);
        } else if self.age(date) > gauss(&mut self.rng, 10.0, 2.0) {
            if age < 80.0 {
                self.replace(date, books.cash, events);
            } else {
                self.quit_driving(date, books.cash, events);
            }
        } else {
            self.maintain(date, books.cash);
        }
    }

    pub fn withdraw(&mut self, amount: f64) -> Result<Option<Transaction>, AccountError> {
        self.unsupported(amount, "withdraw from")
    }

    pub fn deposit(&mut self, amount: f64) -> Result<Option<Transaction>, AccountError> {
        self.unsupported(amount, "deposit into")
    }

    fn unsupported(&self, amount: f64, operation: &'static str) -> Result<Option<Transaction>, AccountError> {
        if amount == 0.0 {
            return Ok(None);
        }
        Err(AccountError::Unsupported {
            account: self.name.clone(),
            operation,
        })
    }
}

impl Account for Car {
    fn name(&self) -> &str {
        &self.name
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn transact(&mut self, amount: f64, date: Date, memo: &str) -> Option<Transaction> {
        self.ledger.record(amount, date, memo)
    }

    /// Value net of the loan.
    fn balance(&self) -> f64 {
        self.value() + self.loan.balance()
    }

    fn year_end_balance(&self, date: Date) -> f64 {
        self.ledger.before(start_of_year(date)).balance() + self.loan.year_end_balance(date)
    }

    fn balance_on(&self, date: Date) -> f64 {
        self.ledger.before(date).balance() + self.loan.balance_on(date)
    }

    fn can_withdraw(&self, _date: Date) -> bool {
        false
    }

    fn can_deposit(&self, _date: Date) -> bool {
        false
    }
}
