//! Monthly cash management between the cash account and investments
//!
//! After a month's income and expenses post, the household keeps its cash
//! near the configured cushion:
//!
//! 1. On the start-date anniversary a net cash surplus is swept into the
//!    first untaxed account that accepts deposits.
//! 2. Below 75% of the cushion, cash is pulled from the account with the
//!    largest outstanding RMD, capped at that RMD.
//! 3. Still short, from the first untaxed account that allows withdrawals,
//!    then from any account that allows withdrawals.
//! 4. Below 25% of the cushion with home equity left, the home is sold.
//! 5. Sale proceeds above the larger of 1.5 cushions and the month's opening
//!    cash are reinvested.

use jiff::civil::Date;

use crate::ledger::memo;
use crate::model::{Account, Books, InvestmentAccount, label};
use crate::simulation_state::{SimHousehold, SimulationState};
use crate::taxes::TaxMen;

/// Top-off threshold as a share of the cushion.
const TOP_OFF_SHARE: f64 = 0.75;
/// Home sale threshold as a share of the cushion.
const CRISIS_SHARE: f64 = 0.25;
/// Cash kept back from home sale proceeds, in cushions.
const REINVEST_FLOOR_CUSHIONS: f64 = 1.5;
/// Pulls allowed per loop in one month before giving up.
const MAX_PULLS: usize = 256;

/// What the waterfall did in one month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiquidityReport {
    /// Surplus moved into investments on the anniversary.
    pub invested: f64,
    /// Cash pulled against outstanding RMDs.
    pub from_rmds: f64,
    /// Cash pulled from untaxed accounts.
    pub from_untaxed: f64,
    /// Cash pulled from any eligible account.
    pub from_any: f64,
    pub home_sold: bool,
    /// Sale proceeds moved back into investments.
    pub reinvested: f64,
}

/// Which accounts a top-off pass may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Untaxed,
    Any,
}

impl Source {
    fn admits(self, account: &InvestmentAccount, date: Date) -> bool {
        if !account.can_withdraw(date) || account.balance() <= 0.0 {
            return false;
        }
        match self {
            Source::Untaxed => !account.taxable(),
            Source::Any => true,
        }
    }
}

/// Deposits `amount` into the first untaxed account that accepts deposits.
/// Returns the amount placed, zero when no account qualifies.
pub fn invest(household: &mut SimHousehold, amount: f64, date: Date, memo: &str) -> f64 {
    let SimHousehold {
        cash, investments, ..
    } = household;
    let Some(account) = investments
        .iter_mut()
        .find(|a| !a.taxable() && a.can_deposit(date))
    else {
        return 0.0;
    };
    match account.deposit(amount, date, memo, cash) {
        Ok(_) => amount,
        Err(e) => {
            tracing::debug!(error = %e, "surplus deposit refused");
            0.0
        }
    }
}

/// Pulls cash toward the cushion from the accounts with the largest
/// outstanding RMDs, capped at each RMD.
pub fn top_off_from_rmds(household: &mut SimHousehold, taxes: &mut TaxMen, date: Date) -> f64 {
    let floor = household.cushion * TOP_OFF_SHARE;
    let SimHousehold {
        cash,
        investments,
        cushion,
        ..
    } = household;
    let mut pulled = 0.0;
    for _ in 0..MAX_PULLS {
        if cash.balance() >= floor {
            return pulled;
        }
        let Some((i, rmd)) = investments
            .iter()
            .enumerate()
            .map(|(i, a)| (i, a.rmd(date)))
            .filter(|&(_, rmd)| rmd > 0.0)
            .fold(None, |best: Option<(usize, f64)>, (i, rmd)| match best {
                Some((_, max)) if max >= rmd => best,
                _ => Some((i, rmd)),
            })
        else {
            return pulled;
        };
        let target = (*cushion - cash.balance()).min(rmd);
        let mut books = Books {
            cash: &mut *cash,
            taxes: &mut *taxes,
        };
        match investments[i].withdraw(target, date, memo::CUSHION, &mut books) {
            Ok(Some(t)) => pulled -= t.amount,
            Ok(None) => return pulled,
            Err(e) => {
                tracing::debug!(error = %e, "rmd top-off refused");
                return pulled;
            }
        }
    }
    tracing::warn!(%date, pulled, "rmd top-off hit its iteration guard");
    pulled
}

fn top_off(household: &mut SimHousehold, taxes: &mut TaxMen, date: Date, source: Source) -> f64 {
    let floor = household.cushion * TOP_OFF_SHARE;
    let SimHousehold {
        cash,
        investments,
        cushion,
        ..
    } = household;
    let mut pulled = 0.0;
    for _ in 0..MAX_PULLS {
        if cash.balance() >= floor {
            return pulled;
        }
        let Some(account) = investments.iter_mut().find(|a| source.admits(a, date)) else {
            return pulled;
        };
        let target = *cushion - cash.balance();
        let mut books = Books {
            cash: &mut *cash,
            taxes: &mut *taxes,
        };
        match account.withdraw(target, date, memo::CUSHION, &mut books) {
            Ok(Some(t)) => pulled -= t.amount,
            Ok(None) => return pulled,
            Err(e) => {
                tracing::debug!(error = %e, ?source, "top-off refused");
                return pulled;
            }
        }
    }
    tracing::warn!(%date, ?source, pulled, "top-off hit its iteration guard");
    pulled
}

/// Sells the home when cash is nearly gone and there is equity to free.
pub fn sell_home_in_crisis(household: &mut SimHousehold, date: Date) -> bool {
    if household.cash.balance() >= household.cushion * CRISIS_SHARE
        || household.home.balance() <= 0.0
    {
        return false;
    }
    let SimHousehold {
        cash, events, home, ..
    } = household;
    events.add(date, label::LIQUIDITY_CRISIS, 1);
    home.liquidate(date, cash, events);
    true
}

/// Moves home sale proceeds above the cash floor back into investments.
pub fn reinvest_sale(household: &mut SimHousehold, date: Date, opening_cash: f64) -> f64 {
    let floor = opening_cash.max(household.cushion * REINVEST_FLOOR_CUSHIONS);
    let excess = household.cash.balance() - floor;
    if excess <= 0.0 {
        return 0.0;
    }
    invest(household, excess, date, memo::REINVEST)
}

/// Runs the whole waterfall for `date`. `opening_cash` is the cash balance
/// before the month's activity and `had_home` whether a home was owned then.
pub fn manage_liquidity(
    state: &mut SimulationState,
    date: Date,
    opening_cash: f64,
    had_home: bool,
) -> LiquidityReport {
    let SimulationState {
        timeline,
        household,
        primary,
        history,
        ..
    } = state;
    let mut report = LiquidityReport::default();

    history.surplus += household.cash.balance() - opening_cash;
    let anniversary = date.month() == timeline.start_date.month() && date != timeline.start_date;
    if history.surplus > 0.0 && anniversary {
        let surplus = history.surplus;
        if household
            .investments
            .iter()
            .any(|a| !a.taxable() && a.can_deposit(date))
        {
            report.invested = invest(household, surplus, date, memo::INVEST);
            history.surplus = 0.0;
        }
    }

    let taxes = &mut primary.taxes;
    report.from_rmds = top_off_from_rmds(household, taxes, date);
    report.from_untaxed = top_off(household, taxes, date, Source::Untaxed);
    report.from_any = top_off(household, taxes, date, Source::Any);
    report.home_sold = sell_home_in_crisis(household, date);

    if had_home && household.home.value() <= 0.0 {
        report.reinvested = reinvest_sale(household, date, opening_cash);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::life::AssistedLiving;
    use crate::model::{CashAccount, Debt, EventList, Home, Lifespan};
    use jiff::civil::date;

    fn owner() -> Lifespan {
        Lifespan {
            birth_date: date(1950, 1, 1),
            death_date: date(2050, 1, 1),
        }
    }

    fn household(cash: f64, investments: Vec<InvestmentAccount>, home: Home) -> SimHousehold {
        SimHousehold {
            cash: CashAccount::open(cash, date(2025, 1, 1)),
            events: EventList::new(),
            home,
            debts: Vec::new(),
            investments,
            children: Vec::new(),
            assisted_living: AssistedLiving::new(owner(), 0.0, 0.0),
            monthly_living: 0.0,
            cushion: 10_000.0,
        }
    }

    fn rented() -> Home {
        Home::rented(0.0, date(2025, 1, 1))
    }

    #[test]
    fn test_rmd_account_is_drawn_first() {
        // Opened last year so there is a year-end balance to divide.
        let start = date(2024, 1, 1);
        let accounts = vec![
            InvestmentAccount::brokerage("Slush", 100_000.0, start, owner()),
            InvestmentAccount::tax_deferred("Work", 100_000.0, start, owner()),
        ];
        let mut household = household(0.0, accounts, rented());
        let mut taxes = TaxMen::new("");
        let when = date(2025, 6, 1);
        let rmd = household.investments[1].rmd(when);
        assert!(rmd > 0.0, "a 75 year old owes an RMD");

        let pulled = top_off_from_rmds(&mut household, &mut taxes, when);
        assert!((pulled - rmd.min(10_000.0)).abs() < 1e-6);
        assert_eq!(household.investments[0].balance(), 100_000.0, "slush untouched");
    }

    #[test]
    fn test_untaxed_before_taxed() {
        let start = date(2025, 1, 1);
        let young = Lifespan {
            birth_date: date(1980, 1, 1),
            death_date: date(2070, 1, 1),
        };
        let accounts = vec![
            InvestmentAccount::tax_deferred("Work", 100_000.0, start, young),
            InvestmentAccount::brokerage("Slush", 4_000.0, start, young),
            InvestmentAccount::brokerage("Savings", 50_000.0, start, young),
        ];
        let mut household = household(1_000.0, accounts, rented());
        let mut taxes = TaxMen::new("");
        let when = date(2025, 2, 1);

        let untaxed = top_off(&mut household, &mut taxes, when, Source::Untaxed);
        assert_eq!(untaxed, 9_000.0);
        assert_eq!(household.investments[1].balance(), 0.0, "drained first");
        assert_eq!(household.investments[2].balance(), 45_000.0);
        assert_eq!(household.cash.balance(), 10_000.0);
        assert_eq!(household.investments[0].balance(), 100_000.0, "locked before 59.5");
    }

    #[test]
    fn test_crisis_sells_home() {
        let start = date(2025, 1, 1);
        let home = Home::new(300_000.0, Debt::imaginary("Imaginary Mortgage", start), 0.0, 1_500.0, start);
        let mut household = household(1_000.0, Vec::new(), home);
        assert!(sell_home_in_crisis(&mut household, date(2025, 3, 1)));
        assert!(household.events.has(label::LIQUIDITY_CRISIS));
        assert_eq!(household.home.value(), 0.0);
        assert!((household.cash.balance() - 283_000.0).abs() < 1e-6);

        let reinvested = reinvest_sale(&mut household, date(2025, 3, 1), 1_000.0);
        assert_eq!(reinvested, 0.0, "nowhere to put it");
    }

    #[test]
    fn test_reinvest_keeps_cash_floor() {
        let start = date(2025, 1, 1);
        let accounts = vec![InvestmentAccount::brokerage("Slush", 0.0, start, owner())];
        let mut household = household(100_000.0, accounts, rented());
        let reinvested = reinvest_sale(&mut household, date(2025, 3, 1), 20_000.0);
        assert_eq!(reinvested, 80_000.0);
        assert_eq!(household.cash.balance(), 20_000.0);
        assert_eq!(household.investments[0].balance(), 80_000.0);
    }

    #[test]
    fn test_no_crisis_with_enough_cash() {
        let start = date(2025, 1, 1);
        let home = Home::new(300_000.0, Debt::imaginary("Imaginary Mortgage", start), 0.0, 0.0, start);
        let mut household = household(5_000.0, Vec::new(), home);
        assert!(!sell_home_in_crisis(&mut household, date(2025, 3, 1)));
        assert!(household.events.is_empty());
    }
}
