use jiff::civil::Date;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::sampling::gauss;

/// Risk multipliers by distance from retirement. A multiplier of 0.1 tracks
/// the market one for one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskProfile {
    /// More than 40 years out.
    pub speculative: f64,
    /// Within 40 years.
    pub aggressive: f64,
    /// Within 5 years.
    pub moderate: f64,
    /// At or after retirement.
    pub conservative: f64,
}

impl RiskProfile {
    pub fn target(&self, years_to_retirement: f64) -> f64 {
        if years_to_retirement <= 0.0 {
            self.conservative
        } else if years_to_retirement <= 5.0 {
            self.moderate
        } else if years_to_retirement <= 40.0 {
            self.aggressive
        } else {
            self.speculative
        }
    }
}

/// Maps the market to the household's account returns.
///
/// The first query for a date draws a fresh monthly return. Later queries on
/// the same date jitter the cached value so accounts move together.
#[derive(Debug, Clone)]
pub struct Portfolio {
    profile: RiskProfile,
    rng: SmallRng,
    last: Option<(Date, f64)>,
}

impl Portfolio {
    pub fn new(profile: RiskProfile, rng: SmallRng) -> Self {
        Self {
            profile,
            rng,
            last: None,
        }
    }

    pub fn profile(&self) -> &RiskProfile {
        &self.profile
    }

    /// Monthly return as a fraction. `market_return` is the annualized
    /// percentage for the month.
    pub fn monthly_return(&mut self, date: Date, years_to_retirement: f64, market_return: f64) -> f64 {
        let risk = self.profile.target(years_to_retirement);
        if let Some((cached_on, last)) = self.last
            && cached_on == date
        {
            return last * (1.0 + gauss(&mut self.rng, 0.0, risk * 0.05) / 12.0);
        }
        let mean = risk * market_return / 10.0;
        let ret = gauss(&mut self.rng, mean, risk * 0.25) / 12.0;
        self.last = Some((date, ret));
        ret
    }
}
