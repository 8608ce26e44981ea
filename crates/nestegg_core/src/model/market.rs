//! Market regimes and the economy-wide monthly return series.
//!
//! The economy is a Markov chain of regimes starting from a recession. Each
//! regime samples its duration, mean annualized return and volatility once,
//! lazily draws one return per month, and picks its successor from its own
//! generator. Returns and inflation are annualized percentages.

use jiff::civil::Date;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::date_math::months_between;
use crate::entropy::EntropySource;
use crate::error::EntropyError;
use crate::sampling::{clamped_gauss, gauss, tangent_draw, uniform};

/// One hundred years of months.
pub const HORIZON_MONTHS: usize = 1200;

/// Months at the start of the horizon with a fixed inflation assumption.
const INFLATION_WARMUP: usize = 6;
const BASELINE_INFLATION: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeKind {
    Recovery,
    Expansion,
    Bubble,
    Recession,
    Depression,
    Stagnation,
}

#[derive(Debug, Clone, Copy)]
struct GaussianInputs {
    mean: f64,
    stddev: f64,
    min: f64,
    max: f64,
}

impl GaussianInputs {
    const fn new(mean: f64, stddev: f64, min: f64, max: f64) -> Self {
        Self {
            mean,
            stddev,
            min,
            max,
        }
    }

    const fn fixed(value: f64) -> Self {
        Self::new(value, 0.0, value, value)
    }

    fn draw(&self, rng: &mut SmallRng) -> f64 {
        clamped_gauss(rng, self.mean, self.stddev, self.min, self.max)
    }
}

struct RegimeParams {
    duration: GaussianInputs,
    mean_return: GaussianInputs,
    volatility: GaussianInputs,
}

impl RegimeKind {
    /// Sampling inputs for a regime of this kind. A positive
    /// `stagnation_months` pins a stagnation's duration.
    fn params(self, stagnation_months: Option<usize>) -> RegimeParams {
        use GaussianInputs as G;
        match self {
            RegimeKind::Recovery => RegimeParams {
                duration: G::new(12.0, 6.0, 6.0, 18.0),
                mean_return: G::new(12.0, 3.0, 5.0, f64::MAX),
                volatility: G::fixed(3.0),
            },
            RegimeKind::Expansion => RegimeParams {
                duration: G::new(72.0, 24.0, 48.0, 96.0),
                mean_return: G::fixed(10.0),
                volatility: G::fixed(2.0),
            },
            RegimeKind::Bubble => RegimeParams {
                duration: G::new(12.0, 6.0, 2.0, f64::MAX),
                mean_return: G::fixed(15.0),
                volatility: G::fixed(0.5),
            },
            RegimeKind::Recession => RegimeParams {
                duration: G::new(12.0, 6.0, 6.0, 24.0),
                mean_return: G::fixed(-5.0),
                volatility: G::fixed(2.0),
            },
            RegimeKind::Depression => RegimeParams {
                duration: G::new(12.0, 3.0, 6.0, 24.0),
                mean_return: G::new(-30.0, 5.0, -40.0, -20.0),
                volatility: G::fixed(5.0),
            },
            RegimeKind::Stagnation => RegimeParams {
                duration: match stagnation_months {
                    Some(months) if months > 0 => G::fixed(months as f64),
                    _ => G::new(24.0, 6.0, 12.0, 36.0),
                },
                mean_return: G::fixed(2.0),
                volatility: G::fixed(1.0),
            },
        }
    }
}

/// The regime that follows another, chosen by the predecessor's generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: RegimeKind,
    /// Only set for a stagnation following a depression.
    pub stagnation_months: Option<usize>,
}

impl Transition {
    fn to(kind: RegimeKind) -> Self {
        Self {
            kind,
            stagnation_months: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Regime {
    kind: RegimeKind,
    duration: usize,
    mean_return: f64,
    volatility: f64,
    rng: SmallRng,
    returns: Option<Vec<f64>>,
    next: Option<Transition>,
}

impl Regime {
    pub fn sample(kind: RegimeKind, stagnation_months: Option<usize>, mut rng: SmallRng) -> Self {
        let params = kind.params(stagnation_months);
        let duration = params.duration.draw(&mut rng) as usize;
        let mean_return = params.mean_return.draw(&mut rng);
        let volatility = params.volatility.draw(&mut rng);
        Self {
            kind,
            duration,
            mean_return,
            volatility,
            rng,
            returns: None,
            next: None,
        }
    }

    pub fn kind(&self) -> RegimeKind {
        self.kind
    }

    pub fn duration(&self) -> usize {
        self.duration
    }

    pub fn mean_return(&self) -> f64 {
        self.mean_return
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Monthly returns, drawn on first request.
    pub fn returns(&mut self) -> &[f64] {
        if self.returns.is_none() {
            let series = (0..self.duration)
                .map(|_| gauss(&mut self.rng, self.mean_return, self.volatility))
                .collect();
            self.returns = Some(series);
        }
        self.returns.as_deref().unwrap_or_default()
    }

    /// The successor regime, decided once. Returns are materialized first so
    /// the generator is always consumed in the same order.
    pub fn successor(&mut self) -> Transition {
        if let Some(next) = self.next {
            return next;
        }
        self.returns();
        let rng = &mut self.rng;
        let next = match self.kind {
            RegimeKind::Recovery => Transition::to(RegimeKind::Expansion),
            RegimeKind::Expansion => {
                if self.duration >= 30 && tangent_draw(rng, 0.3, 10.0, None, None) > 0.5 {
                    Transition::to(RegimeKind::Bubble)
                } else {
                    Transition::to(RegimeKind::Recession)
                }
            }
            RegimeKind::Bubble => {
                if tangent_draw(rng, 0.5, 10.0, None, None) > 0.75 {
                    Transition::to(RegimeKind::Depression)
                } else {
                    Transition::to(RegimeKind::Recession)
                }
            }
            RegimeKind::Recession => {
                if uniform(rng) > 0.8 {
                    Transition::to(RegimeKind::Stagnation)
                } else {
                    Transition::to(RegimeKind::Recovery)
                }
            }
            RegimeKind::Depression => Transition {
                kind: RegimeKind::Stagnation,
                stagnation_months: Some(clamped_gauss(rng, 48.0, 12.0, 36.0, 60.0) as usize),
            },
            RegimeKind::Stagnation => Transition::to(RegimeKind::Recovery),
        };
        self.next = Some(next);
        next
    }
}

#[derive(Debug, Clone)]
pub struct Economy {
    start: Date,
    regimes: Vec<Regime>,
    returns: Vec<f64>,
}

impl Economy {
    /// Seeds the root recession. The remaining regimes are drawn by
    /// [`Economy::fill_horizon`] once every other object has its generator.
    pub fn new(start: Date, source: &mut EntropySource) -> Result<Self, EntropyError> {
        let root = Regime::sample(RegimeKind::Recession, None, source.next_rng()?);
        Ok(Self {
            start,
            regimes: vec![root],
            returns: Vec::new(),
        })
    }

    /// An economy with a fixed monthly return series and no regimes.
    pub fn from_returns(start: Date, returns: Vec<f64>) -> Self {
        Self {
            start,
            regimes: Vec::new(),
            returns,
        }
    }

    pub fn flat(start: Date, annual_return: f64) -> Self {
        Self::from_returns(start, vec![annual_return; HORIZON_MONTHS])
    }

    /// Walks the regime chain until `horizon` months are covered. The last
    /// regime is truncated to fit.
    pub fn fill_horizon(
        &mut self,
        source: &mut EntropySource,
        horizon: usize,
    ) -> Result<(), EntropyError> {
        if self.regimes.is_empty() || self.returns.len() >= horizon {
            return Ok(());
        }
        let mut returns = Vec::with_capacity(horizon);
        let mut i = 0;
        loop {
            let regime = &mut self.regimes[i];
            let take = regime.duration().min(horizon - returns.len());
            returns.extend_from_slice(&regime.returns()[..take]);
            if returns.len() >= horizon {
                break;
            }
            let next = regime.successor();
            let rng = source.next_rng()?;
            self.regimes
                .push(Regime::sample(next.kind, next.stagnation_months, rng));
            i += 1;
        }
        tracing::trace!(regimes = self.regimes.len(), "economy horizon filled");
        self.returns = returns;
        Ok(())
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    fn month_index(&self, date: Date) -> Option<usize> {
        usize::try_from(months_between(self.start, date)).ok()
    }

    /// Annualized market return for the month containing `date`; 0 outside
    /// the horizon.
    pub fn market_return(&self, date: Date) -> f64 {
        self.month_index(date)
            .and_then(|d| self.returns.get(d).copied())
            .unwrap_or(0.0)
    }

    /// Step function of the trailing six-month average market return.
    pub fn inflation(&self, date: Date) -> f64 {
        let Some(d) = self.month_index(date) else {
            return 0.0;
        };
        if d < INFLATION_WARMUP || d >= self.returns.len() {
            return BASELINE_INFLATION;
        }
        let trailing: f64 = self.returns[d - INFLATION_WARMUP..d]
            .iter()
            .map(|r| r / INFLATION_WARMUP as f64)
            .sum();
        match trailing {
            s if s >= 10.0 => 3.0,
            s if s >= 7.5 => 2.5,
            s if s >= 4.0 => 2.0,
            s if s >= 0.0 => 1.0,
            s if s >= -4.0 => 0.5,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::EntropyStream;
    use jiff::civil::date;
    use rand::SeedableRng;

    fn source(offset: u64) -> EntropySource {
        let bytes: Vec<u8> = (0..8192u32).map(|i| (i * 131 % 257) as u8).collect();
        EntropyStream::from_bytes(bytes).open(offset).unwrap()
    }

    #[test]
    fn test_regime_returns_match_duration() {
        for kind in [
            RegimeKind::Recovery,
            RegimeKind::Expansion,
            RegimeKind::Bubble,
            RegimeKind::Recession,
            RegimeKind::Depression,
            RegimeKind::Stagnation,
        ] {
            let mut regime = Regime::sample(kind, None, SmallRng::seed_from_u64(3));
            let duration = regime.duration();
            assert!(duration > 0, "{kind:?} should last at least a month");
            assert_eq!(regime.returns().len(), duration, "{kind:?}");
        }
    }

    #[test]
    fn test_returns_are_memoized() {
        let mut regime = Regime::sample(RegimeKind::Recovery, None, SmallRng::seed_from_u64(11));
        let first = regime.returns().to_vec();
        assert_eq!(regime.returns(), first.as_slice());
        let next = regime.successor();
        assert_eq!(regime.successor(), next);
    }

    #[test]
    fn test_fixed_transitions() {
        let mut recovery = Regime::sample(RegimeKind::Recovery, None, SmallRng::seed_from_u64(1));
        assert_eq!(recovery.successor().kind, RegimeKind::Expansion);

        let mut stagnation =
            Regime::sample(RegimeKind::Stagnation, None, SmallRng::seed_from_u64(1));
        assert_eq!(stagnation.successor().kind, RegimeKind::Recovery);

        let mut depression =
            Regime::sample(RegimeKind::Depression, None, SmallRng::seed_from_u64(1));
        let next = depression.successor();
        assert_eq!(next.kind, RegimeKind::Stagnation);
        let months = next.stagnation_months.unwrap();
        assert!((36..=60).contains(&months));
    }

    #[test]
    fn test_pinned_stagnation_duration() {
        let regime = Regime::sample(RegimeKind::Stagnation, Some(40), SmallRng::seed_from_u64(5));
        assert_eq!(regime.duration(), 40);
    }

    #[test]
    fn test_fixed_parameters_are_not_drawn() {
        let regime = Regime::sample(RegimeKind::Expansion, None, SmallRng::seed_from_u64(9));
        assert_eq!(regime.mean_return(), 10.0);
        assert_eq!(regime.volatility(), 2.0);
        assert!((48..=96).contains(&regime.duration()));
    }

    #[test]
    fn test_horizon_filled_without_gaps() {
        let mut src = source(0);
        let mut economy = Economy::new(date(2025, 1, 1), &mut src).unwrap();
        economy.fill_horizon(&mut src, HORIZON_MONTHS).unwrap();

        assert_eq!(economy.returns().len(), HORIZON_MONTHS);
        assert_eq!(economy.regimes()[0].kind(), RegimeKind::Recession);

        let total: usize = economy.regimes().iter().map(Regime::duration).sum();
        let last = economy.regimes().last().unwrap().duration();
        assert!(total >= HORIZON_MONTHS, "chain must cover the horizon");
        assert!(total - last < HORIZON_MONTHS, "no regime past the horizon");

        let mut offset = 0;
        let mut regimes = economy.regimes().to_vec();
        for regime in &mut regimes {
            let series = regime.returns();
            let take = series.len().min(HORIZON_MONTHS - offset);
            assert_eq!(&economy.returns()[offset..offset + take], &series[..take]);
            offset += take;
        }
        assert_eq!(offset, HORIZON_MONTHS);
    }

    #[test]
    fn test_fill_is_deterministic() {
        let build = || {
            let mut src = source(1789);
            let mut economy = Economy::new(date(2025, 1, 1), &mut src).unwrap();
            economy.fill_horizon(&mut src, HORIZON_MONTHS).unwrap();
            economy.returns().to_vec()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_market_return_out_of_range_is_zero() {
        let economy = Economy::from_returns(date(2025, 1, 1), vec![5.0; 24]);
        assert_eq!(economy.market_return(date(2024, 6, 1)), 0.0);
        assert_eq!(economy.market_return(date(2025, 3, 1)), 5.0);
        assert_eq!(economy.market_return(date(2027, 1, 1)), 0.0);
    }

    #[test]
    fn test_inflation_steps() {
        let start = date(2025, 1, 1);
        let cases = [
            (12.0, 3.0),
            (8.0, 2.5),
            (5.0, 2.0),
            (0.0, 1.0),
            (-3.0, 0.5),
            (-10.0, 0.0),
        ];
        for (market, expected) in cases {
            let economy = Economy::from_returns(start, vec![market; 24]);
            assert_eq!(economy.inflation(date(2025, 3, 1)), 2.0, "warm-up");
            assert_eq!(
                economy.inflation(date(2026, 1, 1)),
                expected,
                "market {market}"
            );
        }
        let economy = Economy::flat(start, 0.0);
        assert_eq!(economy.inflation(date(2024, 1, 1)), 0.0);
        assert_eq!(economy.inflation(date(2200, 1, 1)), 2.0);
    }
}
