//! Progressive-bracket withholding and annual settlement
//!
//! Each person carries four jurisdictions: federal income tax, Social
//! Security payroll tax, Medicare payroll tax and a state income tax. Income
//! is withheld monthly on an annualized basis and trued up every January.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::ledger::memo;
use crate::model::{CashAccount, EventList, label};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min: f64,
    pub max: f64,
    pub rate: f64,
}

const fn bracket(min: f64, max: f64, rate: f64) -> TaxBracket {
    TaxBracket { min, max, rate }
}

const FEDERAL_BRACKETS: [TaxBracket; 7] = [
    bracket(0.0, 9_525.0, 0.10),
    bracket(9_525.0, 38_700.0, 0.15),
    bracket(38_700.0, 93_700.0, 0.25),
    bracket(93_700.0, 195_450.0, 0.28),
    bracket(195_450.0, 424_950.0, 0.33),
    bracket(424_950.0, 426_700.0, 0.35),
    bracket(426_700.0, f64::MAX, 0.396),
];

const SOCIAL_SECURITY_BRACKETS: [TaxBracket; 2] = [
    bracket(0.0, 128_400.0, 0.062),
    bracket(128_400.0, f64::MAX, 0.0),
];

const MEDICARE_BRACKETS: [TaxBracket; 1] = [bracket(0.0, f64::MAX, 0.0145)];

const CALIFORNIA_BRACKETS: [TaxBracket; 9] = [
    bracket(0.0, 8_223.0, 0.01),
    bracket(8_223.0, 19_495.0, 0.02),
    bracket(19_495.0, 30_769.0, 0.04),
    bracket(30_769.0, 42_711.0, 0.06),
    bracket(42_711.0, 53_980.0, 0.08),
    bracket(53_980.0, 275_738.0, 0.093),
    bracket(275_738.0, 330_884.0, 0.103),
    bracket(330_884.0, 551_473.0, 0.113),
    bracket(551_473.0, f64::MAX, 0.123),
];

/// Tax on `net` income: for every bracket the income reaches, the bracket's
/// rate times the slice of income inside it.
pub fn bracket_tax(net: f64, brackets: &[TaxBracket]) -> f64 {
    let mut tax = 0.0;
    for b in brackets {
        if net < b.min {
            break;
        }
        tax += b.rate * (b.max.min(net) - b.min);
    }
    tax
}

/// A jurisdiction's brackets and standard deduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    pub name: String,
    pub standard_deduction: f64,
    pub brackets: Vec<TaxBracket>,
}

impl TaxSchedule {
    pub fn federal() -> Self {
        Self {
            name: "US".to_string(),
            standard_deduction: 6_500.0,
            brackets: FEDERAL_BRACKETS.to_vec(),
        }
    }

    pub fn social_security() -> Self {
        Self {
            name: "SSA".to_string(),
            standard_deduction: 0.0,
            brackets: SOCIAL_SECURITY_BRACKETS.to_vec(),
        }
    }

    pub fn medicare() -> Self {
        Self {
            name: "MED".to_string(),
            standard_deduction: 0.0,
            brackets: MEDICARE_BRACKETS.to_vec(),
        }
    }

    /// State income tax by postal code. States without a modeled schedule
    /// levy nothing.
    pub fn state(code: &str) -> Self {
        let code = code.trim().to_ascii_uppercase();
        match code.as_str() {
            "CA" => Self {
                name: code,
                standard_deduction: 4_236.0,
                brackets: CALIFORNIA_BRACKETS.to_vec(),
            },
            _ => {
                if !code.is_empty() {
                    tracing::warn!(state = %code, "no income tax schedule for state, assuming none");
                }
                Self {
                    name: code,
                    standard_deduction: 0.0,
                    brackets: Vec::new(),
                }
            }
        }
    }

    pub fn tax(&self, net: f64) -> f64 {
        bracket_tax(net, &self.brackets)
    }
}

/// Outcome of one jurisdiction's annual settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Settlement {
    /// Full-year liability.
    pub total: f64,
    /// Liability less withholding; negative means a refund.
    pub owed: f64,
}

/// Running totals for one jurisdiction since the last settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxMan {
    schedule: TaxSchedule,
    earnings: f64,
    withholding: f64,
    deductions: f64,
}

impl TaxMan {
    pub fn new(schedule: TaxSchedule) -> Self {
        Self {
            schedule,
            earnings: 0.0,
            withholding: 0.0,
            deductions: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.schedule.name
    }

    pub fn earnings(&self) -> f64 {
        self.earnings
    }

    pub fn withholding(&self) -> f64 {
        self.withholding
    }

    /// Withholds one month's tax on `earnings` as if earned all year.
    pub fn withhold(&mut self, earnings: f64, date: Date, cash: &mut CashAccount) -> f64 {
        self.earnings += earnings;
        let annualized = earnings * 12.0 - self.schedule.standard_deduction;
        let w = self.schedule.tax(annualized) / 12.0;
        if w > 0.0 {
            let _ = cash.withdraw(w, date, &format!("{} Withholding", self.name()));
        }
        self.withholding += w;
        w
    }

    pub fn deduct(&mut self, amount: f64) {
        self.deductions += amount;
    }

    /// Closes the year and resets the accumulators.
    pub fn settle(&mut self) -> Settlement {
        let paid = self.withholding;
        let net = self.earnings - self.deductions - self.schedule.standard_deduction;
        let settlement = if net < 0.0 {
            Settlement {
                total: 0.0,
                owed: -paid,
            }
        } else {
            let total = self.schedule.tax(net);
            Settlement {
                total,
                owed: total - paid,
            }
        };
        self.earnings = 0.0;
        self.withholding = 0.0;
        self.deductions = 0.0;
        settlement
    }
}

/// The four jurisdictions taxing one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxMen {
    pub federal: TaxMan,
    pub social_security: TaxMan,
    pub medicare: TaxMan,
    pub state: TaxMan,
}

impl TaxMen {
    pub fn new(state: &str) -> Self {
        Self {
            federal: TaxMan::new(TaxSchedule::federal()),
            social_security: TaxMan::new(TaxSchedule::social_security()),
            medicare: TaxMan::new(TaxSchedule::medicare()),
            state: TaxMan::new(TaxSchedule::state(state)),
        }
    }

    /// Withholds on one month of income. Payroll income also pays Social
    /// Security and Medicare.
    pub fn withhold(
        &mut self,
        earnings: f64,
        date: Date,
        payroll: bool,
        cash: &mut CashAccount,
    ) -> f64 {
        if earnings <= 0.0 {
            return 0.0;
        }
        let mut w = 0.0;
        if payroll {
            w += self.social_security.withhold(earnings, date, cash);
            w += self.medicare.withhold(earnings, date, cash);
        }
        w += self.federal.withhold(earnings, date, cash);
        w += self.state.withhold(earnings, date, cash);
        w
    }

    /// Itemized deduction against federal and state income.
    pub fn deduct(&mut self, amount: f64) {
        self.federal.deduct(amount);
        self.state.deduct(amount);
    }

    /// January true-up of last year's taxes. State tax paid is deductible
    /// from federal income. Returns the net amount owed (negative for a
    /// refund).
    pub fn annual(&mut self, date: Date, cash: &mut CashAccount, events: &mut EventList) -> f64 {
        let state = self.state.settle();
        self.federal.deduct(state.total);
        let federal = self.federal.settle();
        let social_security = self.social_security.settle();
        let medicare = self.medicare.settle();
        let owed = state.owed + federal.owed + social_security.owed + medicare.owed;

        if owed > 0.0 {
            let _ = cash.withdraw(owed, date, memo::TAX_PAYMENT);
            events.add(date, label::TAX_BILL, 1);
        } else if owed < 0.0 {
            let _ = cash.deposit(-owed, date, memo::TAX_REFUND);
            events.add(date, label::TAX_REFUND, 1);
        }
        tracing::trace!(%date, owed, "annual tax settlement");
        owed
    }
}
