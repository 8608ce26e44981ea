use crate::error::SimulationError;
use crate::model::{
    Headline, HeadlineRecord, IndexedValue, MonteCarloSummary, RunResult, label,
};

/// Positions of worst, 5th, 25th, 50th, 75th, 95th percentile and best in
/// an ascending list of `n` values.
pub fn percentile_indices(n: usize) -> [usize; 7] {
    let last = n.saturating_sub(1);
    [0, n / 20, n / 4, n / 2, 3 * n / 4, 19 * n / 20, last].map(|i| i.min(last))
}

/// Accumulates headlines and flags from finished runs.
#[derive(Debug, Clone, Default)]
pub struct SummaryBuilder {
    runs: Vec<Headline>,
    early_deaths: Vec<usize>,
    liquidity_crises: Vec<usize>,
    bankruptcies: Vec<usize>,
    start: Option<f64>,
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(runs: usize) -> Self {
        Self {
            runs: Vec::with_capacity(runs),
            ..Self::default()
        }
    }

    pub fn add(&mut self, run: &RunResult) {
        self.start.get_or_insert(run.start_balance);
        if run.age < run.retirement_age {
            self.early_deaths.push(run.index);
        }
        if run.events.has(label::LIQUIDITY_CRISIS) {
            self.liquidity_crises.push(run.index);
        }
        if run.events.has(label::BANKRUPTCY) {
            self.bankruptcies.push(run.index);
        }
        self.runs.push(run.headline());
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn finish(self) -> Result<MonteCarloSummary, SimulationError> {
        let count = self.runs.len();
        if count == 0 {
            return Err(SimulationError::NoRuns);
        }

        let n = count as f64;
        let mean = Headline {
            index: 0,
            age: self.runs.iter().map(|r| r.age).sum::<f64>() / n,
            balance: self.runs.iter().map(|r| r.balance).sum::<f64>() / n,
            market: self.runs.iter().map(|r| r.market).sum::<f64>() / n,
        };

        let ages = sorted(&self.runs, |r| r.age);
        let balances = sorted(&self.runs, |r| r.balance);
        let markets = sorted(&self.runs, |r| r.market);
        let [worst, p5, p25, median, p75, p95, best] = percentile_indices(count).map(|i| HeadlineRecord {
            age: ages[i],
            balance: balances[i],
            market: markets[i],
        });

        Ok(MonteCarloSummary {
            count,
            early_deaths: self.early_deaths,
            liquidity_crises: self.liquidity_crises,
            bankruptcies: self.bankruptcies,
            runs: self.runs,
            start: self.start.unwrap_or_default(),
            worst,
            p5,
            p25,
            median,
            p75,
            p95,
            best,
            mean,
        })
    }
}

fn sorted(runs: &[Headline], value: impl Fn(&Headline) -> f64) -> Vec<IndexedValue> {
    let mut values: Vec<IndexedValue> = runs
        .iter()
        .map(|r| IndexedValue {
            index: r.index,
            value: value(r),
        })
        .collect();
    values.sort_by(|a, b| a.value.total_cmp(&b.value));
    values
}
