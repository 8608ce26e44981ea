//! Mortality model: samples a death date from a single-life hazard table.

use jiff::civil::Date;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::date_math::{DAYS_PER_YEAR, add_days, add_years, years_between};
use crate::sampling::uniform;

/// Annual probability of death by age. The final entry is certain death.
pub const BASE_HAZARD: [f64; 121] = [
    0.005313, 0.000346, 0.000221, 0.000162, 0.000131,
    0.000116, 0.000106, 0.000098, 0.000091, 0.000086,
    0.000084, 0.000087, 0.000100, 0.000124, 0.000157,
    0.000194, 0.000232, 0.000269, 0.000304, 0.000338,
    0.000373, 0.000409, 0.000442, 0.000471, 0.000497,
    0.000524, 0.000553, 0.000582, 0.000611, 0.000641,
    0.000673, 0.000710, 0.000753, 0.000805, 0.000864,
    0.000932, 0.001005, 0.001082, 0.001160, 0.001243,
    0.001336, 0.001442, 0.001562, 0.001698, 0.001849,
    0.002014, 0.002195, 0.002402, 0.002639, 0.002903,
    0.003189, 0.003488, 0.003795, 0.004105, 0.004423,
    0.004775, 0.005153, 0.005528, 0.005893, 0.006266,
    0.006688, 0.007176, 0.007724, 0.008339, 0.009034,
    0.009832, 0.010740, 0.011754, 0.012881, 0.014141,
    0.015612, 0.017275, 0.019047, 0.020909, 0.022939,
    0.025297, 0.028045, 0.031131, 0.034582, 0.038467,
    0.043008, 0.048175, 0.053772, 0.059770, 0.066367,
    0.073828, 0.082382, 0.092183, 0.103305, 0.115746,
    0.129475, 0.144443, 0.160590, 0.177853, 0.196165,
    0.214677, 0.233091, 0.251082, 0.268304, 0.284403,
    0.301467, 0.319555, 0.338728, 0.359052, 0.380595,
    0.403431, 0.427637, 0.453295, 0.480492, 0.509322,
    0.539881, 0.572274, 0.606611, 0.643007, 0.681588,
    0.722483, 0.761882, 0.799976, 0.839975, 0.881973,
    1.0,
];

/// Excess annual hazard for the `male` risk factor, by age.
const MALE_EXCESS_HAZARD: [f64; 121] = [
    0.001009, 0.000050, 0.000061, 0.000050, 0.000055,
    0.000046, 0.000038, 0.000031, 0.000023, 0.000014,
    0.000009, 0.000014, 0.000036, 0.000081, 0.000142,
    0.000207, 0.000273, 0.000351, 0.000443, 0.000541,
    0.000646, 0.000742, 0.000810, 0.000838, 0.000838,
    0.000825, 0.000816, 0.000809, 0.000811, 0.000818,
    0.000825, 0.000826, 0.000823, 0.000811, 0.000797,
    0.000784, 0.000777, 0.000772, 0.000771, 0.000775,
    0.000787, 0.000810, 0.000851, 0.000913, 0.000996,
    0.001095, 0.001207, 0.001334, 0.001475, 0.001630,
    0.001798, 0.001985, 0.002202, 0.002455, 0.002736,
    0.003028, 0.003327, 0.003642, 0.003970, 0.004306,
    0.004666, 0.005026, 0.005337, 0.005581, 0.005785,
    0.005994, 0.006246, 0.006541, 0.006895, 0.007307,
    0.007768, 0.008274, 0.008838, 0.009465, 0.010160,
    0.010957, 0.011837, 0.012748, 0.013674, 0.014656,
    0.015703, 0.016906, 0.018367, 0.020142, 0.022162,
    0.024320, 0.026520, 0.028703, 0.030844, 0.032953,
    0.035050, 0.037157, 0.039294, 0.041478, 0.043721,
    0.045592, 0.047018, 0.047931, 0.048274, 0.048003,
    0.047560, 0.046923, 0.046074, 0.044990, 0.043649,
    0.042025, 0.040092, 0.037821, 0.035179, 0.032133,
    0.028647, 0.024680, 0.020191, 0.015135, 0.009461,
    0.003119, 0.000000, 0.000000, 0.000000, 0.000000,
    0.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFactor {
    Male,
}

impl RiskFactor {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "male" => Some(RiskFactor::Male),
            _ => None,
        }
    }

    fn excess_hazard(self, age: usize) -> f64 {
        let table: &[f64] = match self {
            RiskFactor::Male => &MALE_EXCESS_HAZARD,
        };
        table.get(age).copied().unwrap_or(0.0)
    }
}

/// Birth and sampled death date of one person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifespan {
    pub birth_date: Date,
    pub death_date: Date,
}

impl Lifespan {
    /// Age in fractional years, frozen at the death date.
    pub fn age(&self, date: Date) -> f64 {
        years_between(self.birth_date, date.min(self.death_date))
    }

    pub fn death_age(&self) -> f64 {
        self.age(self.death_date)
    }

    pub fn is_alive(&self, date: Date) -> bool {
        date < self.death_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actuary {
    lifespan: Lifespan,
    risk_factors: Vec<RiskFactor>,
}

impl Actuary {
    /// Walks every birthday from `start` to the end of the table and dies on
    /// the first one whose draw falls under the hazard, at a uniformly random
    /// point in the following year.
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        birth_date: Date,
        risk_factors: Vec<RiskFactor>,
        start: Date,
    ) -> Self {
        let mut death_date = birth_date;
        for (age, base) in BASE_HAZARD.iter().enumerate() {
            death_date = add_years(birth_date, age as i32);
            if death_date < start {
                continue;
            }
            let hazard = base + risk_factors.iter().map(|f| f.excess_hazard(age)).sum::<f64>();
            if uniform(rng) <= hazard {
                let offset = (uniform(rng) * DAYS_PER_YEAR) as i32;
                death_date = add_days(death_date, offset);
                break;
            }
        }
        Self {
            lifespan: Lifespan {
                birth_date,
                death_date,
            },
            risk_factors,
        }
    }

    pub fn with_death_date(birth_date: Date, death_date: Date, risk_factors: Vec<RiskFactor>) -> Self {
        Self {
            lifespan: Lifespan {
                birth_date,
                death_date,
            },
            risk_factors,
        }
    }

    pub fn lifespan(&self) -> Lifespan {
        self.lifespan
    }

    pub fn birth_date(&self) -> Date {
        self.lifespan.birth_date
    }

    pub fn death_date(&self) -> Date {
        self.lifespan.death_date
    }

    pub fn age(&self, date: Date) -> f64 {
        self.lifespan.age(date)
    }

    pub fn death_age(&self) -> f64 {
        self.lifespan.death_age()
    }

    /// This year's hazard, base table plus risk factors.
    pub fn death_risk(&self, date: Date) -> f64 {
        let age = (self.age(date).max(0.0) as usize).min(BASE_HAZARD.len() - 1);
        BASE_HAZARD[age]
            + self
                .risk_factors
                .iter()
                .map(|f| f.excess_hazard(age))
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_table_ends_in_certainty() {
        assert_eq!(BASE_HAZARD.len(), 121);
        assert_eq!(BASE_HAZARD[BASE_HAZARD.len() - 1], 1.0);
        assert_eq!(MALE_EXCESS_HAZARD.len(), BASE_HAZARD.len());
    }

    #[test]
    fn test_death_falls_after_start_and_within_table() {
        let birth = date(1960, 5, 10);
        let start = date(2025, 1, 1);
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let actuary = Actuary::sample(&mut rng, birth, vec![RiskFactor::Male], start);
            assert!(actuary.death_date() >= start, "seed {seed} died before start");
            assert!(
                actuary.death_date() < add_years(birth, 121),
                "seed {seed} outlived the table"
            );
        }
    }

    #[test]
    fn test_age_clamps_at_death() {
        let actuary = Actuary::with_death_date(date(1950, 1, 1), date(2030, 1, 1), vec![]);
        let at_death = actuary.age(date(2030, 1, 1));
        assert_eq!(actuary.age(date(2040, 1, 1)), at_death);
        assert!((actuary.death_age() - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_death_risk_adds_risk_factors() {
        let birth = date(1950, 1, 1);
        let plain = Actuary::with_death_date(birth, date(2100, 1, 1), vec![]);
        let male = Actuary::with_death_date(birth, date(2100, 1, 1), vec![RiskFactor::Male]);
        let on = date(2020, 6, 1);
        assert_eq!(plain.death_risk(on), BASE_HAZARD[70]);
        assert!((male.death_risk(on) - (BASE_HAZARD[70] + MALE_EXCESS_HAZARD[70])).abs() < 1e-12);
    }

    #[test]
    fn test_risk_factor_tags() {
        assert_eq!(RiskFactor::from_tag("Male"), Some(RiskFactor::Male));
        assert_eq!(RiskFactor::from_tag("smoker"), None);
    }
}
