mod accounts;
mod actuary;
mod car;
mod debt;
mod events;
mod home;
mod market;
mod portfolio;
mod results;
mod rmd;

pub use accounts::{Account, AccountPolicy, Books, CashAccount, InvestmentAccount};
pub use actuary::{Actuary, BASE_HAZARD, Lifespan, RiskFactor};
pub use car::{Car, financed_share, residual_value};
pub use debt::{Debt, imaginary_due_date};
pub use events::{Event, EventList, label};
pub use home::{Home, MONTHLY_DEPRECIATION, SALE_COMMISSION};
pub use market::{Economy, HORIZON_MONTHS, Regime, RegimeKind, Transition};
pub use portfolio::{Portfolio, RiskProfile};
pub use results::{
    BalanceSnapshot, Headline, HeadlineRecord, IndexedValue, MonteCarloSummary, RunResult,
    round_cents,
};
pub use rmd::{RmdTable, RmdTableEntry};
