//! Household configuration
//!
//! `HouseholdConfig` mirrors the JSON a household is described with: the
//! people, their income and spending, assets, debts and an optional spouse of
//! the same shape. Every field has a default, so a partial document is valid.
//! Dates stay as `YYYY-MM-DD` strings until a simulation is built from the
//! config; a bad or missing date is replaced then rather than rejected here.
//!
//! Run options that are not part of the household live in [`MonteCarloConfig`].
//!
//! # Builder DSL
//!
//! Tests and benchmarks build households in code:
//!
//! ```ignore
//! use nestegg_core::config::HouseholdBuilder;
//!
//! let config = HouseholdBuilder::new("Pat", "1970-04-01")
//!     .retirement_age(65.0)
//!     .monthly_living(4_000.0)
//!     .cushion(20_000.0)
//!     .cash(50_000.0)
//!     .tax_deferred("Work 401k", 400_000.0)
//!     .build();
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{parse_date, start_of_month};
use crate::entropy::{DEFAULT_OFFSET_STRIDE, EntropyStream};
use crate::error::ConfigError;
use crate::model::{HORIZON_MONTHS, RiskProfile};

pub mod builder;

pub use builder::HouseholdBuilder;

fn default_retirement_age() -> f64 {
    65.0
}

fn default_social_security_age() -> f64 {
    67.0
}

fn default_runs() -> usize {
    1000
}

/// One person and, through `spouse`, their household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdConfig {
    pub name: String,
    pub birth_date: String,
    /// Tags such as `male` that add excess mortality hazard.
    pub risk_factors: Vec<String>,
    #[serde(default = "default_retirement_age")]
    pub retirement_age: f64,
    #[serde(default = "default_social_security_age")]
    pub social_security_age: f64,
    /// Monthly benefit when claimed at 62, at full retirement age and at 70.
    pub social_security_payouts: [f64; 3],
    pub health_care: HealthCareConfig,
    pub annual_salary: f64,
    pub monthly_living: f64,
    /// Cash reserve the household tries to keep on hand.
    pub cushion: f64,
    /// Monthly rent paid while no home is owned.
    pub rent: f64,
    /// Two-letter tax state code.
    pub state: String,
    pub children: BTreeMap<String, ChildConfig>,
    pub assets: AssetsConfig,
    pub risk_profile: RiskProfile,
    pub debts: BTreeMap<String, DebtConfig>,
    pub spouse: Option<Box<HouseholdConfig>>,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            birth_date: String::new(),
            risk_factors: Vec::new(),
            retirement_age: default_retirement_age(),
            social_security_age: default_social_security_age(),
            social_security_payouts: [0.0; 3],
            health_care: HealthCareConfig::default(),
            annual_salary: 0.0,
            monthly_living: 0.0,
            cushion: 0.0,
            rent: 0.0,
            state: String::new(),
            children: BTreeMap::new(),
            assets: AssetsConfig::default(),
            risk_profile: RiskProfile::default(),
            debts: BTreeMap::new(),
            spouse: None,
        }
    }
}

impl HouseholdConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCareConfig {
    pub assisted_living: AssistedLivingConfig,
    /// Monthly premium at the start date.
    pub premium: f64,
    /// Out-of-pocket maximum charged when a health issue strikes.
    pub out_of_pocket: f64,
    /// Annual health-care inflation, as a fraction.
    pub inflation: f64,
}

/// Monthly assisted-living rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistedLivingConfig {
    pub basic_rate: f64,
    pub terminal_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildConfig {
    pub birth_date: String,
    /// Annual tuition per grade-year, starting at age 0.
    pub tuition: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebtConfig {
    pub principal: f64,
    /// Annual interest rate, as a fraction.
    pub interest: f64,
    pub due_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub cash: f64,
    /// Taxable brokerage accounts by name.
    pub slush_fund: BTreeMap<String, f64>,
    /// Tax-deferred retirement accounts by name.
    #[serde(rename = "401k")]
    pub tax_deferred: BTreeMap<String, f64>,
    /// Inherited IRAs by name.
    pub ira: BTreeMap<String, IraConfig>,
    pub home: Option<HomeConfig>,
    pub car: Option<CarConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IraConfig {
    pub balance: f64,
    pub inherit_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    pub value: f64,
    /// Mortgage principal still owed.
    pub principal: f64,
    pub interest: f64,
    pub due_date: String,
    /// Annual property tax as a fraction of value.
    pub property_tax: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    pub purchase_date: String,
    pub price: f64,
    /// Car loan principal still owed.
    pub principal: f64,
    pub interest: f64,
    pub due_date: String,
}

/// Parses a configured date, substituting `fallback` when the value is
/// missing or malformed.
pub fn date_or(field: &str, value: &str, fallback: Date) -> Date {
    if value.trim().is_empty() {
        return fallback;
    }
    match parse_date(value) {
        Some(date) => date,
        None => {
            tracing::warn!(field, value, %fallback, "unparseable date, substituting");
            fallback
        }
    }
}

/// Options for a batch of runs.
#[derive(Debug, Clone)]
pub struct MonteCarloConfig {
    pub runs: usize,
    /// First simulated month. Defaults to the first of the current month.
    pub start_date: Option<Date>,
    pub entropy: EntropyStream,
    /// Byte offset between consecutive runs in the entropy stream.
    pub offset_stride: u64,
    pub horizon_months: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            start_date: None,
            entropy: EntropyStream::default(),
            offset_stride: DEFAULT_OFFSET_STRIDE,
            horizon_months: HORIZON_MONTHS,
        }
    }
}

impl MonteCarloConfig {
    #[must_use]
    pub fn new(runs: usize) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_start_date(mut self, date: Date) -> Self {
        self.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_entropy(mut self, entropy: EntropyStream) -> Self {
        self.entropy = entropy;
        self
    }

    #[must_use]
    pub fn with_entropy_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_entropy(EntropyStream::File(path.into()))
    }

    pub fn start(&self) -> Date {
        self.start_date
            .unwrap_or_else(|| start_of_month(jiff::Zoned::now().date()))
    }

    /// Byte offset of run `index` in the entropy stream.
    pub fn offset(&self, index: usize) -> u64 {
        index as u64 * self.offset_stride
    }
}
