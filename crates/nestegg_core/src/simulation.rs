use std::ops::Range;

use jiff::civil::Date;

use crate::analysis::SummaryBuilder;
use crate::config::{HouseholdConfig, MonteCarloConfig};
use crate::date_math::add_months;
use crate::error::{Result, SimulationError};
use crate::ledger::memo;
use crate::liquidation::{LiquidityReport, manage_liquidity};
use crate::model::{Account, Books, MonteCarloSummary, RunResult, label};
use crate::simulation_state::{SimHousehold, SimMarket, SimulationState};

/// Runs per batch. Each batch finishes before its results reach the sink.
const MAX_BATCH_SIZE: usize = 100;

/// Builds and runs household `index` of a batch.
pub fn simulate(config: &HouseholdConfig, index: usize, options: &MonteCarloConfig) -> Result<RunResult> {
    let state = SimulationState::from_config(config, index, options)?;
    Ok(run(state))
}

/// Advances the household month by month until the primary person dies.
pub fn run(mut state: SimulationState) -> RunResult {
    let death = state.primary.death_date();
    let start_balance = state.net_worth() - state.liabilities(state.timeline.start_date);
    tracing::debug!(index = state.index, %death, start_balance, "run started");

    while state.timeline.current_date < death {
        let date = state.timeline.current_date;
        step_month(&mut state, date);
        state.timeline.current_date = add_months(date, 1);
        state.timeline.months += 1;
    }

    finish(state, start_balance)
}

/// One month of income, expenses, cash management and market growth.
pub fn step_month(state: &mut SimulationState, date: Date) -> LiquidityReport {
    let opening_cash = state.household.cash.balance();
    let had_home = state.household.home.value() > 0.0;
    let market_return = state.market.economy.market_return(date);

    post_cash_flows(state, date, market_return);
    let report = manage_liquidity(state, date, opening_cash, had_home);
    grow_investments(state, date, market_return);

    state.household.cash.reconcile();
    let snapshot = state.snapshot(date);
    state.history.balances.push(snapshot);
    if !state.history.bankrupt && state.net_worth() <= 0.0 {
        state.household.events.add(date, label::BANKRUPTCY, 10);
        state.history.bankrupt = true;
    }
    report
}

fn post_cash_flows(state: &mut SimulationState, date: Date, market_return: f64) {
    let SimulationState {
        market,
        household,
        primary,
        spouse,
        ..
    } = state;
    let SimHousehold {
        cash,
        events,
        home,
        debts,
        investments,
        children,
        assisted_living,
        monthly_living,
        ..
    } = household;

    cash.accrue_inflation(date, market.economy.inflation(date));
    if date.month() == 1 {
        primary.taxes.annual(date, cash, events);
    }

    let mut books = Books {
        cash: &mut *cash,
        taxes: &mut primary.taxes,
    };
    primary.job.monthly(date, market_return, &mut books, events);
    primary.social_security.monthly(date, &mut books);
    home.monthly(date, assisted_living.needed(date), &mut books, events);
    primary.car.monthly(date, &mut books, events);
    for child in children.iter() {
        child.monthly(date, books.cash);
    }
    for debt in debts.iter_mut() {
        debt.monthly(date, books.cash, books.taxes, events);
    }
    let risk = primary.actuary.death_risk(date);
    primary.health_care.monthly(date, risk, books.cash, events);
    assisted_living.monthly(date, books.cash);
    let _ = books.cash.withdraw(*monthly_living, date, memo::MONTHLY_EXPENSES);

    if let Some(spouse) = spouse.as_mut().filter(|s| s.is_alive(date)) {
        if date.month() == 1 {
            spouse.taxes.annual(date, cash, events);
        }
        let mut books = Books {
            cash: &mut *cash,
            taxes: &mut spouse.taxes,
        };
        spouse.job.monthly(date, market_return, &mut books, events);
        spouse.social_security.monthly(date, &mut books);
        let risk = spouse.actuary.death_risk(date);
        spouse.health_care.monthly(date, risk, books.cash, events);
        spouse.car.monthly(date, &mut books, events);
    }

    if date.month() == 12 {
        let mut books = Books {
            cash: &mut *cash,
            taxes: &mut primary.taxes,
        };
        for account in investments.iter_mut() {
            if let Err(e) = account.take_rmd(date, &mut books) {
                tracing::debug!(error = %e, "required distribution skipped");
            }
        }
    }
}

fn grow_investments(state: &mut SimulationState, date: Date, market_return: f64) {
    let years_to_retirement = state.primary.years_to_retirement(date);
    let SimMarket {
        portfolio, index, ..
    } = &mut state.market;
    for account in state.household.investments.iter_mut() {
        let rate = portfolio.monthly_return(date, years_to_retirement, market_return);
        account.accrue_market_return(date, rate);
    }
    *index *= 1.0 + market_return / 1200.0;
}

/// Annualizes the market index and appends the life milestones.
fn finish(mut state: SimulationState, start_balance: f64) -> RunResult {
    let death = state.primary.death_date();
    let months = state.timeline.months;
    let market = if months == 0 {
        0.0
    } else {
        state.market.index.powf(12.0 / f64::from(months)) - 1.0
    };

    let events = &mut state.household.events;
    let retirement = state.primary.retirement_date();
    if retirement < death {
        events.add(retirement, label::RETIRE, 6);
    }
    let benefits = state.primary.social_security.benefits_date();
    if benefits < death {
        events.add(benefits, label::SOCIAL_SECURITY, 6);
    }
    for child in &state.household.children {
        let graduation = child.graduation_date();
        if graduation < death {
            events.add(graduation, format!("{} Graduation", child.name()), 6);
        }
    }
    events.add(death, label::DEATH, 10);
    if let Some(spouse) = &state.spouse
        && spouse.death_date() < death
    {
        events.add(spouse.death_date(), format!("{}'s Death", spouse.name), 10);
    }
    events.sort();

    let balance = state.net_worth() - state.liabilities(death);
    let age = state.primary.actuary.death_age();
    tracing::debug!(index = state.index, %death, age, balance, months, "run finished");

    RunResult {
        index: state.index,
        age,
        balance,
        market,
        start_balance,
        retirement_age: state.primary.retirement_age,
        balances: state.history.balances,
        events: state.household.events,
        transactions: state.household.cash.ledger().transactions().to_vec(),
    }
}

fn run_batch(config: &HouseholdConfig, options: &MonteCarloConfig, indices: Range<usize>) -> Vec<Result<RunResult>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        indices
            .into_par_iter()
            .map(|i| simulate(config, i, options))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        indices.map(|i| simulate(config, i, options)).collect()
    }
}

/// Runs `options.runs` households and reduces them to a summary, handing
/// each full result to `sink` in run-index order.
pub fn monte_carlo_simulate_with<F>(
    config: &HouseholdConfig,
    options: &MonteCarloConfig,
    mut sink: F,
) -> Result<MonteCarloSummary>
where
    F: FnMut(&RunResult) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>,
{
    if options.runs == 0 {
        return Err(SimulationError::NoRuns);
    }
    let num_batches = options.runs.div_ceil(MAX_BATCH_SIZE);
    let mut summary = SummaryBuilder::with_capacity(options.runs);

    for batch in 0..num_batches {
        let first = batch * MAX_BATCH_SIZE;
        let last = (first + MAX_BATCH_SIZE).min(options.runs);
        for (index, result) in (first..last).zip(run_batch(config, options, first..last)) {
            let result = result.map_err(|source| SimulationError::Run {
                index,
                source: Box::new(source),
            })?;
            sink(&result).map_err(SimulationError::Sink)?;
            summary.add(&result);
        }
        tracing::info!(batch = batch + 1, of = num_batches, completed = last, "batch finished");
    }

    let summary = summary.finish()?;
    tracing::info!(
        runs = summary.count,
        early_deaths = summary.early_deaths.len(),
        liquidity_crises = summary.liquidity_crises.len(),
        bankruptcies = summary.bankruptcies.len(),
        median_balance = summary.median.balance.value,
        "monte carlo finished"
    );
    Ok(summary)
}

/// Runs a batch and keeps only the summary.
pub fn monte_carlo_simulate(config: &HouseholdConfig, options: &MonteCarloConfig) -> Result<MonteCarloSummary> {
    monte_carlo_simulate_with(config, options, |_| Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HouseholdBuilder;
    use crate::entropy::EntropyStream;
    use crate::model::Economy;
    use crate::simulation_state::StateBuilder;
    use jiff::civil::date;

    fn stream() -> EntropyStream {
        EntropyStream::from_bytes((0..4096u32).map(|i| (i * 31 % 251) as u8).collect::<Vec<_>>())
    }

    #[test]
    fn test_run_ends_at_death() {
        let start = date(2025, 1, 1);
        let config = HouseholdBuilder::new("Pat", "1960-01-01")
            .cash(100_000.0)
            .monthly_living(1_000.0)
            .build();
        let state = StateBuilder::new(&config, start)
            .economy(Economy::flat(start, 0.0))
            .primary_death(date(2026, 1, 15))
            .build(0, stream().open(0).unwrap())
            .unwrap();
        let result = run(state);
        assert_eq!(result.balances.len(), 13, "Jan 2025 through Jan 2026");
        assert_eq!(result.balances.last().unwrap().date, date(2026, 1, 31));
        assert_eq!(result.market, 0.0);
        let last = result.events.iter().last().unwrap();
        assert_eq!((last.value.as_str(), last.date), (label::DEATH, date(2026, 1, 15)));
        assert!(result.events.has(label::RETIRE), "retired at 65 in 2025");
    }

    #[test]
    fn test_death_before_start_runs_no_months() {
        let start = date(2025, 1, 1);
        let config = HouseholdBuilder::new("Pat", "1960-01-01").cash(5_000.0).build();
        let state = StateBuilder::new(&config, start)
            .economy(Economy::flat(start, 8.0))
            .primary_death(start)
            .build(0, stream().open(0).unwrap())
            .unwrap();
        let result = run(state);
        assert!(result.balances.is_empty());
        assert_eq!(result.market, 0.0, "no months, no return");
        assert_eq!(result.balance, 5_000.0);
    }

    #[test]
    fn test_market_index_annualizes() {
        let start = date(2025, 1, 1);
        let config = HouseholdBuilder::new("Pat", "1960-01-01").build();
        let state = StateBuilder::new(&config, start)
            .economy(Economy::flat(start, 12.0))
            .primary_death(date(2035, 1, 1))
            .build(0, stream().open(0).unwrap())
            .unwrap();
        let result = run(state);
        // 1% a month compounds to about 12.68% a year.
        assert!((result.market - (1.01_f64.powi(12) - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_runs_is_an_error() {
        let config = HouseholdBuilder::new("Pat", "1960-01-01").build();
        let options = MonteCarloConfig::new(0).with_entropy(stream());
        assert!(matches!(
            monte_carlo_simulate(&config, &options),
            Err(SimulationError::NoRuns)
        ));
    }

    #[test]
    fn test_sink_sees_runs_in_order() {
        let config = HouseholdBuilder::new("Pat", "1960-01-01")
            .cash(50_000.0)
            .monthly_living(2_000.0)
            .build();
        let options = MonteCarloConfig::new(5)
            .with_start_date(date(2025, 1, 1))
            .with_entropy(stream());
        let mut seen = Vec::new();
        let summary = monte_carlo_simulate_with(&config, &options, |run| {
            seen.push(run.index);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, [0, 1, 2, 3, 4]);
        assert_eq!(summary.count, 5);
    }

    #[test]
    fn test_missing_entropy_file_fails_the_run() {
        let config = HouseholdBuilder::new("Pat", "1960-01-01").build();
        let options = MonteCarloConfig::new(2)
            .with_start_date(date(2025, 1, 1))
            .with_entropy_file("/nonexistent/entropy");
        let err = monte_carlo_simulate(&config, &options).unwrap_err();
        assert!(matches!(err, SimulationError::Run { index: 0, .. }));
    }
}
