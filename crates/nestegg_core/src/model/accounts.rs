//! Ledger-backed accounts: the household cash account and investment accounts.
//!
//! Every transfer between cash and another account posts two legs of equal and
//! opposite amount, one on each ledger.

use std::sync::LazyLock;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{add_days, end_of_year, start_of_year};
use crate::error::AccountError;
use crate::ledger::{Ledger, Transaction, memo};
use crate::model::actuary::Lifespan;
use crate::model::rmd::RmdTable;
use crate::taxes::TaxMen;

/// RMDs smaller than half a cent are treated as satisfied.
const RMD_EPSILON: f64 = 0.005;

static UNIFORM_LIFETIME: LazyLock<RmdTable> = LazyLock::new(RmdTable::uniform_lifetime);
static SINGLE_LIFE: LazyLock<RmdTable> = LazyLock::new(RmdTable::single_life_expectancy);

/// Capabilities shared by every account.
pub trait Account {
    fn name(&self) -> &str;

    fn ledger(&self) -> &Ledger;

    /// Posts a single leg. Zero amounts are dropped.
    fn transact(&mut self, amount: f64, date: Date, memo: &str) -> Option<Transaction>;

    fn balance(&self) -> f64 {
        self.ledger().balance()
    }

    /// Balance as of the close of the previous calendar year.
    fn year_end_balance(&self, date: Date) -> f64 {
        self.ledger().before(start_of_year(date)).balance()
    }

    /// Balance from entries dated strictly before `date`.
    fn balance_on(&self, date: Date) -> f64 {
        self.ledger().before(date).balance()
    }

    fn can_withdraw(&self, date: Date) -> bool;

    fn can_deposit(&self, date: Date) -> bool;

    fn accrue_interest(&mut self, _date: Date) -> Option<Transaction> {
        None
    }

    /// Applies a period return (a fraction, not a percentage).
    fn accrue_market_return(&mut self, _date: Date, _rate: f64) -> Option<Transaction> {
        None
    }
}

/// Counter-leg collaborators for transfers that touch cash and withholding.
pub struct Books<'a> {
    pub cash: &'a mut CashAccount,
    pub taxes: &'a mut TaxMen,
}

// ============================================================================
// Cash
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashAccount {
    ledger: Ledger,
}

impl CashAccount {
    pub fn open(balance: f64, date: Date) -> Self {
        let mut account = Self::default();
        account.transact(balance, date, memo::OPEN_ACCOUNT);
        account
    }

    pub fn withdraw(
        &mut self,
        amount: f64,
        date: Date,
        memo: &str,
    ) -> Result<Option<Transaction>, AccountError> {
        if amount < 0.0 {
            return Err(AccountError::NegativeAmount {
                account: self.name().to_string(),
                amount,
            });
        }
        Ok(self.transact(-amount, date, memo))
    }

    pub fn deposit(
        &mut self,
        amount: f64,
        date: Date,
        memo: &str,
    ) -> Result<Option<Transaction>, AccountError> {
        if amount < 0.0 {
            return Err(AccountError::NegativeAmount {
                account: self.name().to_string(),
                amount,
            });
        }
        Ok(self.transact(amount, date, memo))
    }

    /// Purchasing-power loss for one month at `inflation` percent a year.
    pub fn accrue_inflation(&mut self, date: Date, inflation: f64) -> Option<Transaction> {
        self.accrue_market_return(date, -inflation / 1200.0)
    }

    pub fn reconcile(&mut self) -> f64 {
        self.ledger.reconcile()
    }
}

impl Account for CashAccount {
    fn name(&self) -> &str {
        "Cash"
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn transact(&mut self, amount: f64, date: Date, memo: &str) -> Option<Transaction> {
        self.ledger.record(amount, date, memo)
    }

    fn can_withdraw(&self, _date: Date) -> bool {
        true
    }

    fn can_deposit(&self, _date: Date) -> bool {
        true
    }

    fn accrue_market_return(&mut self, date: Date, rate: f64) -> Option<Transaction> {
        let delta = self.balance() * rate;
        self.transact(delta, date, memo::INFLATION)
    }
}

// ============================================================================
// Investments
// ============================================================================

/// Distribution and eligibility rules of an investment account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountPolicy {
    /// Ordinary brokerage or savings. No RMD, always open.
    Brokerage,
    /// Employer plan: locked before 59.5, closed to deposits from 70.5,
    /// uniform-lifetime RMDs from 70.5.
    TaxDeferred,
    /// Inherited IRA: never accepts deposits, single-life RMDs from a basis
    /// fixed in the year after inheritance.
    Inherited { basis_year: i16, basis_divisor: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAccount {
    name: String,
    ledger: Ledger,
    policy: AccountPolicy,
    /// Withdrawals are withheld as ordinary income.
    taxable: bool,
    owner: Lifespan,
}

impl InvestmentAccount {
    fn open(
        name: String,
        balance: f64,
        date: Date,
        policy: AccountPolicy,
        taxable: bool,
        owner: Lifespan,
    ) -> Self {
        let mut account = Self {
            name,
            ledger: Ledger::new(),
            policy,
            taxable,
            owner,
        };
        account.transact(balance, date, memo::OPEN_ACCOUNT);
        account
    }

    pub fn brokerage(name: &str, balance: f64, date: Date, owner: Lifespan) -> Self {
        Self::open(name.to_string(), balance, date, AccountPolicy::Brokerage, false, owner)
    }

    pub fn tax_deferred(name: &str, balance: f64, date: Date, owner: Lifespan) -> Self {
        Self::open(
            format!("{name} 401k"),
            balance,
            date,
            AccountPolicy::TaxDeferred,
            true,
            owner,
        )
    }

    pub fn inherited(
        name: &str,
        balance: f64,
        date: Date,
        inherited_on: Date,
        owner: Lifespan,
    ) -> Self {
        let basis_date = end_of_year(add_days(end_of_year(inherited_on), 1));
        let basis_age = owner.age(basis_date) as i32;
        let policy = AccountPolicy::Inherited {
            basis_year: basis_date.year(),
            basis_divisor: SINGLE_LIFE.clamped_divisor(basis_age),
        };
        Self::open(format!("{name} IRA"), balance, date, policy, true, owner)
    }

    pub fn policy(&self) -> AccountPolicy {
        self.policy
    }

    pub fn taxable(&self) -> bool {
        self.taxable
    }

    /// Full-year required distribution, before netting this year's withdrawals.
    pub fn annual_rmd(&self, date: Date) -> f64 {
        let year_end = self.year_end_balance(date);
        let balance = self.balance();
        match self.policy {
            AccountPolicy::Brokerage => 0.0,
            AccountPolicy::TaxDeferred => {
                let age = self.owner.age(end_of_year(date));
                if age < 70.5 {
                    return 0.0;
                }
                let divisor = UNIFORM_LIFETIME.clamped_divisor(age as i32);
                (year_end / divisor).min(balance)
            }
            AccountPolicy::Inherited {
                basis_year,
                basis_divisor,
            } => {
                let remaining = basis_divisor - f64::from(date.year() - basis_year);
                if remaining < 1.0 {
                    year_end.min(balance)
                } else {
                    (year_end / remaining).min(balance)
                }
            }
        }
    }

    /// Withdrawals so far this calendar year, as a positive amount.
    pub fn ytd_withdrawals(&self, date: Date) -> f64 {
        -self
            .ledger
            .on_or_after(start_of_year(date))
            .amount_at_most(0.0)
            .memo_not_in(&[memo::MARKET_RETURN, memo::INTEREST_ACCRUAL])
            .balance()
    }

    /// Outstanding required distribution for the year of `date`.
    pub fn rmd(&self, date: Date) -> f64 {
        let outstanding = self.annual_rmd(date) - self.ytd_withdrawals(date);
        if outstanding < RMD_EPSILON {
            0.0
        } else {
            outstanding
        }
    }

    pub fn take_rmd(
        &mut self,
        date: Date,
        books: &mut Books<'_>,
    ) -> Result<Option<Transaction>, AccountError> {
        let amount = self.rmd(date);
        self.withdraw(amount, date, memo::REQUIRED_MINIMUM_DISTRIBUTION, books)
    }

    /// Moves up to `amount` into cash, withholding income tax on taxable
    /// accounts. The amount is capped at the balance.
    pub fn withdraw(
        &mut self,
        amount: f64,
        date: Date,
        memo: &str,
        books: &mut Books<'_>,
    ) -> Result<Option<Transaction>, AccountError> {
        if amount < 0.0 {
            return Err(AccountError::NegativeAmount {
                account: self.name.clone(),
                amount,
            });
        }
        if !self.can_withdraw(date) {
            return Err(AccountError::WithdrawalForbidden {
                account: self.name.clone(),
            });
        }
        let amount = amount.min(self.balance());
        if amount <= 0.0 {
            return Ok(None);
        }
        let t = self.transact(-amount, date, memo);
        books.cash.deposit(amount, date, memo)?;
        if self.taxable {
            books.taxes.withhold(amount, date, false, books.cash);
        }
        Ok(t)
    }

    pub fn deposit(
        &mut self,
        amount: f64,
        date: Date,
        memo: &str,
        cash: &mut CashAccount,
    ) -> Result<Option<Transaction>, AccountError> {
        if amount < 0.0 {
            return Err(AccountError::NegativeAmount {
                account: self.name.clone(),
                amount,
            });
        }
        if !self.can_deposit(date) {
            return Err(AccountError::DepositForbidden {
                account: self.name.clone(),
            });
        }
        if amount == 0.0 {
            return Ok(None);
        }
        cash.withdraw(amount, date, memo)?;
        Ok(self.transact(amount, date, memo))
    }
}

impl Account for InvestmentAccount {
    fn name(&self) -> &str {
        &self.name
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn transact(&mut self, amount: f64, date: Date, memo: &str) -> Option<Transaction> {
        self.ledger.record(amount, date, memo)
    }

    fn can_withdraw(&self, date: Date) -> bool {
        match self.policy {
            AccountPolicy::TaxDeferred => self.owner.age(date) >= 59.5,
            AccountPolicy::Brokerage | AccountPolicy::Inherited { .. } => true,
        }
    }

    fn can_deposit(&self, date: Date) -> bool {
        match self.policy {
            AccountPolicy::Brokerage => true,
            AccountPolicy::TaxDeferred => self.owner.age(date) < 70.5,
            AccountPolicy::Inherited { .. } => false,
        }
    }

    fn accrue_market_return(&mut self, date: Date, rate: f64) -> Option<Transaction> {
        let balance = self.balance();
        if balance <= 0.0 {
            return None;
        }
        self.transact(balance * rate.max(-1.0), date, memo::MARKET_RETURN)
    }
}
