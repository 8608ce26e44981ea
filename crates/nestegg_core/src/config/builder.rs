//! Household Builder
//!
//! A fluent API for assembling a [`HouseholdConfig`] in code, used by tests,
//! benchmarks and anyone embedding the engine without a JSON document.

use super::{
    AssistedLivingConfig, CarConfig, ChildConfig, DebtConfig, HealthCareConfig, HomeConfig,
    HouseholdConfig, IraConfig,
};
use crate::model::RiskProfile;

/// Builder for a household, starting from the primary person.
#[derive(Debug, Clone)]
pub struct HouseholdBuilder {
    config: HouseholdConfig,
}

impl HouseholdBuilder {
    #[must_use]
    pub fn new(name: &str, birth_date: &str) -> Self {
        Self {
            config: HouseholdConfig {
                name: name.to_string(),
                birth_date: birth_date.to_string(),
                ..HouseholdConfig::default()
            },
        }
    }

    // =========================================================================
    // Person
    // =========================================================================

    #[must_use]
    pub fn risk_factor(mut self, tag: &str) -> Self {
        self.config.risk_factors.push(tag.to_string());
        self
    }

    #[must_use]
    pub fn retirement_age(mut self, age: f64) -> Self {
        self.config.retirement_age = age;
        self
    }

    /// Claiming age plus the monthly benefit at 62, full age and 70.
    #[must_use]
    pub fn social_security(mut self, age: f64, payouts: [f64; 3]) -> Self {
        self.config.social_security_age = age;
        self.config.social_security_payouts = payouts;
        self
    }

    #[must_use]
    pub fn annual_salary(mut self, salary: f64) -> Self {
        self.config.annual_salary = salary;
        self
    }

    #[must_use]
    pub fn health_care(mut self, premium: f64, out_of_pocket: f64, inflation: f64) -> Self {
        let assisted_living = self.config.health_care.assisted_living;
        self.config.health_care = HealthCareConfig {
            assisted_living,
            premium,
            out_of_pocket,
            inflation,
        };
        self
    }

    #[must_use]
    pub fn assisted_living(mut self, basic_rate: f64, terminal_rate: f64) -> Self {
        self.config.health_care.assisted_living = AssistedLivingConfig {
            basic_rate,
            terminal_rate,
        };
        self
    }

    // =========================================================================
    // Household
    // =========================================================================

    #[must_use]
    pub fn monthly_living(mut self, amount: f64) -> Self {
        self.config.monthly_living = amount;
        self
    }

    #[must_use]
    pub fn cushion(mut self, amount: f64) -> Self {
        self.config.cushion = amount;
        self
    }

    #[must_use]
    pub fn rent(mut self, amount: f64) -> Self {
        self.config.rent = amount;
        self
    }

    #[must_use]
    pub fn state(mut self, code: &str) -> Self {
        self.config.state = code.to_string();
        self
    }

    #[must_use]
    pub fn risk_profile(mut self, profile: RiskProfile) -> Self {
        self.config.risk_profile = profile;
        self
    }

    #[must_use]
    pub fn child(mut self, name: &str, birth_date: &str, tuition: &[f64]) -> Self {
        self.config.children.insert(
            name.to_string(),
            ChildConfig {
                birth_date: birth_date.to_string(),
                tuition: tuition.to_vec(),
            },
        );
        self
    }

    #[must_use]
    pub fn debt(mut self, name: &str, principal: f64, interest: f64, due_date: &str) -> Self {
        self.config.debts.insert(
            name.to_string(),
            DebtConfig {
                principal,
                interest,
                due_date: due_date.to_string(),
            },
        );
        self
    }

    #[must_use]
    pub fn spouse(mut self, spouse: HouseholdBuilder) -> Self {
        self.config.spouse = Some(Box::new(spouse.build()));
        self
    }

    // =========================================================================
    // Assets
    // =========================================================================

    #[must_use]
    pub fn cash(mut self, amount: f64) -> Self {
        self.config.assets.cash = amount;
        self
    }

    /// A taxable brokerage account.
    #[must_use]
    pub fn slush_fund(mut self, name: &str, balance: f64) -> Self {
        self.config.assets.slush_fund.insert(name.to_string(), balance);
        self
    }

    #[must_use]
    pub fn tax_deferred(mut self, name: &str, balance: f64) -> Self {
        self.config.assets.tax_deferred.insert(name.to_string(), balance);
        self
    }

    #[must_use]
    pub fn inherited_ira(mut self, name: &str, balance: f64, inherit_date: &str) -> Self {
        self.config.assets.ira.insert(
            name.to_string(),
            IraConfig {
                balance,
                inherit_date: inherit_date.to_string(),
            },
        );
        self
    }

    #[must_use]
    pub fn home(mut self, home: HomeConfig) -> Self {
        self.config.assets.home = Some(home);
        self
    }

    #[must_use]
    pub fn car(mut self, car: CarConfig) -> Self {
        self.config.assets.car = Some(car);
        self
    }

    #[must_use]
    pub fn build(self) -> HouseholdConfig {
        self.config
    }
}
