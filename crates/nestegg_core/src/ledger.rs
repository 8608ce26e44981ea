//! Append-only transaction log backing every account.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Standard memos attached to ledger entries.
pub mod memo {
    pub const OPEN_ACCOUNT: &str = "Open Account";
    pub const INTEREST_ACCRUAL: &str = "Interest Accrual";
    pub const MARKET_RETURN: &str = "Market Return";
    pub const INFLATION: &str = "Inflation";
    pub const TAX_PAYMENT: &str = "Tax Payment";
    pub const TAX_REFUND: &str = "Tax Refund";
    pub const DEBT_PAYMENT: &str = "Debt Payment";
    pub const CASH_WITHDRAWAL: &str = "Cash Withdrawal";
    pub const CASH_DEPOSIT: &str = "Cash Deposit";
    pub const REQUIRED_MINIMUM_DISTRIBUTION: &str = "Required Minimum Distribution";
    pub const INVESTMENT_DEPOSIT: &str = "Investment Deposit";
    pub const INVESTMENT_WITHDRAWAL: &str = "Investment Withdrawal";
    pub const SALARY: &str = "Salary";
    pub const UNEMPLOYMENT: &str = "Unemployment";
    pub const SOCIAL_SECURITY: &str = "Social Security";
    pub const MONTHLY_EXPENSES: &str = "Monthly Expenses";
    pub const HEALTH_INSURANCE: &str = "Health Insurance";
    pub const HEALTH_CARE: &str = "Health Care";
    pub const ASSISTED_LIVING: &str = "Assisted Living";
    pub const TUITION_PAYMENT: &str = "Tuition Payment";
    pub const PROPERTY_TAX: &str = "Property Tax";
    pub const RENT: &str = "Rent";
    pub const HOME_DEPRECIATION: &str = "Home Depreciation";
    pub const HOME_MAINTENANCE: &str = "Home Maintenance";
    pub const HOME_SALE: &str = "Home Sale";
    pub const HOME_SALE_COMMISSION: &str = "Home Sale Commission";
    pub const MORTGAGE_PAYOFF: &str = "Mortgage Payoff";
    pub const CAR_DEPRECIATION: &str = "Car Depreciation";
    pub const CAR_MAINTENANCE: &str = "Car Maintenance";
    pub const CAR_PAYOFF: &str = "Car Payoff";
    pub const CAR_SALE: &str = "Car Sale";
    pub const CAR_PURCHASE: &str = "Car Purchase";
    pub const INVEST: &str = "Invest";
    pub const REINVEST: &str = "ReInvest";
    pub const CUSHION: &str = "Cushion";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    pub date: Date,
    pub memo: String,
}

/// Ordered transactions for one account.
///
/// The running balance is the left-to-right sum of every recorded amount.
/// Filtered views are new ledgers; the source is never touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    balance: f64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a transaction. Zero amounts are dropped and return `None`.
    pub fn record(&mut self, amount: f64, date: Date, memo: &str) -> Option<Transaction> {
        if amount == 0.0 {
            return None;
        }
        let t = Transaction {
            amount,
            date,
            memo: memo.to_string(),
        };
        self.balance += amount;
        self.transactions.push(t.clone());
        Some(t)
    }

    #[inline]
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Recomputes the balance from the recorded entries.
    pub fn reconcile(&mut self) -> f64 {
        self.balance = self.transactions.iter().map(|t| t.amount).sum();
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn filter(&self, mut keep: impl FnMut(&Transaction) -> bool) -> Ledger {
        let mut out = Ledger::new();
        for t in self.transactions.iter().filter(|t| keep(t)) {
            out.balance += t.amount;
            out.transactions.push(t.clone());
        }
        out
    }

    /// Entries dated on or after `start`.
    pub fn on_or_after(&self, start: Date) -> Ledger {
        self.filter(|t| t.date >= start)
    }

    /// Entries dated strictly before `end`.
    pub fn before(&self, end: Date) -> Ledger {
        self.filter(|t| t.date < end)
    }

    pub fn memo_in(&self, memos: &[&str]) -> Ledger {
        self.filter(|t| memos.contains(&t.memo.as_str()))
    }

    pub fn memo_not_in(&self, memos: &[&str]) -> Ledger {
        self.filter(|t| !memos.contains(&t.memo.as_str()))
    }

    pub fn amount_at_least(&self, min: f64) -> Ledger {
        self.filter(|t| t.amount >= min)
    }

    pub fn amount_at_most(&self, max: f64) -> Ledger {
        self.filter(|t| t.amount <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn sample() -> Ledger {
        let mut l = Ledger::new();
        l.record(1000.0, date(2025, 1, 1), memo::OPEN_ACCOUNT);
        l.record(-250.0, date(2025, 2, 1), memo::CASH_WITHDRAWAL);
        l.record(75.5, date(2025, 3, 1), memo::MARKET_RETURN);
        l.record(-10.0, date(2026, 1, 1), memo::CASH_WITHDRAWAL);
        l
    }

    #[test]
    fn test_zero_amount_not_recorded() {
        let mut l = Ledger::new();
        assert!(l.record(0.0, date(2025, 1, 1), memo::CASH_DEPOSIT).is_none());
        assert!(l.is_empty());
        assert_eq!(l.balance(), 0.0);
    }

    #[test]
    fn test_balance_is_sum_of_amounts() {
        let mut l = sample();
        let sum: f64 = l.transactions().iter().map(|t| t.amount).sum();
        assert_eq!(l.balance(), sum);
        assert_eq!(l.reconcile(), sum);
    }

    #[test]
    fn test_date_filters() {
        let l = sample();
        assert_eq!(l.before(date(2025, 2, 1)).balance(), 1000.0);
        assert_eq!(l.on_or_after(date(2025, 2, 1)).len(), 3);
        assert_eq!(l.on_or_after(date(2026, 1, 1)).balance(), -10.0);
    }

    #[test]
    fn test_memo_and_amount_filters() {
        let l = sample();
        assert_eq!(l.memo_in(&[memo::CASH_WITHDRAWAL]).balance(), -260.0);
        assert_eq!(l.memo_not_in(&[memo::CASH_WITHDRAWAL]).balance(), 1075.5);
        assert_eq!(l.amount_at_most(0.0).len(), 2);
        assert_eq!(l.amount_at_least(75.5).len(), 2);
    }

    #[test]
    fn test_filtering_leaves_source_untouched() {
        let l = sample();
        let before = l.clone();
        let _ = l.before(date(2025, 3, 1)).memo_in(&[memo::OPEN_ACCOUNT]);
        assert_eq!(l, before);
    }
}
