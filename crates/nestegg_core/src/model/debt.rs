use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::months_between;
use crate::error::AccountError;
use crate::ledger::{Ledger, Transaction, memo};
use crate::model::{Account, CashAccount, EventList};
use crate::taxes::TaxMen;

/// Due date of placeholder loans that never come due.
pub fn imaginary_due_date() -> Date {
    jiff::civil::date(2200, 1, 1)
}

/// An amortizing loan. The balance is never positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    name: String,
    ledger: Ledger,
    interest_rate: f64,
    due_date: Date,
    tax_deductible: bool,
}

impl Debt {
    pub fn open(name: &str, principal: f64, interest_rate: f64, due_date: Date, start: Date) -> Self {
        let mut debt = Self {
            name: name.to_string(),
            ledger: Ledger::new(),
            interest_rate,
            due_date,
            tax_deductible: false,
        };
        debt.transact(-principal, start, memo::OPEN_ACCOUNT);
        debt
    }

    /// A home loan. Interest is an itemized deduction.
    pub fn mortgage(name: &str, principal: f64, interest_rate: f64, due_date: Date, start: Date) -> Self {
        let mut debt = Self::open(&format!("{name} Mortgage"), principal, interest_rate, due_date, start);
        debt.tax_deductible = true;
        debt
    }

    /// Zero-balance stand-in for a missing loan.
    pub fn imaginary(name: &str, start: Date) -> Self {
        Self::open(name, 0.0, 0.0, imaginary_due_date(), start)
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn due_date(&self) -> Date {
        self.due_date
    }

    pub fn tax_deductible(&self) -> bool {
        self.tax_deductible
    }

    pub fn monthly_interest_rate(&self) -> f64 {
        self.interest_rate / 12.0
    }

    pub fn months_until_due(&self, date: Date) -> i32 {
        months_between(date, self.due_date)
    }

    /// Payment that retires the balance by the due date:
    /// `P * m^n / (1 + m + ... + m^(n-1))` with `m = 1 + r/12`.
    pub fn minimum_payment(&self, date: Date) -> f64 {
        let owed = -self.balance();
        if owed <= 0.0 {
            return 0.0;
        }
        let months = self.months_until_due(date);
        if months <= 0 {
            return owed;
        }
        let rate = self.monthly_interest_rate();
        if rate == 0.0 {
            return owed / f64::from(months);
        }
        let growth = (1.0 + rate).powi(months);
        owed * growth * rate / (growth - 1.0)
    }

    /// Pays up to `amount` from cash, never past zero.
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
        let owed = -self.balance();
        if owed <= 0.0 {
            return Ok(None);
        }
        let amount = amount.min(owed);
        cash.withdraw(amount, date, memo)?;
        Ok(self.transact(amount, date, memo))
    }

    pub fn withdraw(&mut self, amount: f64) -> Result<Option<Transaction>, AccountError> {
        if amount == 0.0 {
            return Ok(None);
        }
        Err(AccountError::Unsupported {
            account: self.name.clone(),
            operation: "withdraw from",
        })
    }

    pub fn pay_off(&mut self, date: Date, memo: &str, cash: &mut CashAccount) -> Option<Transaction> {
        let owed = -self.balance();
        self.deposit(owed.max(0.0), date, memo, cash).ok().flatten()
    }

    /// Accrues a month of interest, deducting it when allowed, then makes
    /// the minimum payment.
    pub fn monthly(
        &mut self,
        date: Date,
        cash: &mut CashAccount,
        taxes: &mut TaxMen,
        events: &mut EventList,
    ) {
        if let Some(interest) = self.accrue_interest(date)
            && self.tax_deductible
        {
            taxes.deduct(-interest.amount);
        }
        let amount = self.minimum_payment(date);
        let _ = self.deposit(amount, date, memo::DEBT_PAYMENT, cash);
        if amount > 0.0 && self.balance() == 0.0 {
            events.add(date, format!("Payoff {}", self.name), 6);
        }
    }
}

impl Account for Debt {
    fn name(&self) -> &str {
        &self.name
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn transact(&mut self, amount: f64, date: Date, memo: &str) -> Option<Transaction> {
        self.ledger.record(amount, date, memo)
    }

    fn can_withdraw(&self, _date: Date) -> bool {
        false
    }

    fn can_deposit(&self, _date: Date) -> bool {
        self.balance() < 0.0
    }

    fn accrue_interest(&mut self, date: Date) -> Option<Transaction> {
        let delta = self.balance() * self.monthly_interest_rate();
        self.transact(delta, date, memo::INTEREST_ACCRUAL)
    }
}
