//! Runtime state of one household run and the fixed order it is built in.
//!
//! Every stochastic object takes exactly one generator from the run's
//! [`EntropySource`] when it is constructed, so construction order decides
//! which seed each object gets. The order is:
//!
//! 1. the economy's root recession
//! 2. the portfolio
//! 3. the primary person's actuary, job, health care and car
//! 4. the spouse's actuary, job, health care and car
//! 5. the remaining economy regimes, until the horizon is covered
//!
//! Debts, the home, Social Security, assisted living and children are
//! deterministic and draw nothing.

use jiff::civil::Date;

use crate::config::{CarConfig, HomeConfig, HouseholdConfig, MonteCarloConfig, date_or};
use crate::date_math::add_fractional_years;
use crate::entropy::EntropySource;
use crate::error::EntropyError;
use crate::life::{AssistedLiving, Child, HealthCare, Job, SocialSecurity};
use crate::model::{
    Account, Actuary, BalanceSnapshot, Car, CashAccount, Debt, Economy, EventList, Home,
    InvestmentAccount, Lifespan, Portfolio, RiskFactor,
};
use crate::taxes::TaxMen;

/// One adult of the household and everything that belongs to them alone.
#[derive(Debug, Clone)]
pub struct Person {
    pub name: String,
    pub retirement_age: f64,
    pub actuary: Actuary,
    pub taxes: TaxMen,
    pub job: Job,
    pub social_security: SocialSecurity,
    pub health_care: HealthCare,
    pub car: Car,
}

impl Person {
    /// Draws four generators, in order: actuary, job, health care, car.
    fn build(
        config: &HouseholdConfig,
        tax_state: &str,
        start: Date,
        death_date: Option<Date>,
        source: &mut EntropySource,
    ) -> Result<Self, EntropyError> {
        let birth_date = date_or("birth_date", &config.birth_date, start);
        let risk_factors = risk_factors(&config.risk_factors);
        let mut rng = source.next_rng()?;
        let sampled = Actuary::sample(&mut rng, birth_date, risk_factors.clone(), start);
        let actuary = match death_date {
            Some(death) => Actuary::with_death_date(birth_date, death, risk_factors),
            None => sampled,
        };
        let lifespan = actuary.lifespan();

        let job = Job::new(
            &config.name,
            lifespan,
            config.retirement_age,
            config.annual_salary,
            source.next_rng()?,
        );
        let social_security = SocialSecurity::from_tiers(
            lifespan,
            config.social_security_age,
            config.social_security_payouts,
        );
        let health = &config.health_care;
        let health_care = HealthCare::new(
            start,
            health.premium,
            health.out_of_pocket,
            health.inflation,
            source.next_rng()?,
        );
        let car = build_car(
            &config.name,
            lifespan,
            config.assets.car.as_ref(),
            start,
            source,
        )?;

        Ok(Self {
            name: config.name.clone(),
            retirement_age: config.retirement_age,
            actuary,
            taxes: TaxMen::new(tax_state),
            job,
            social_security,
            health_care,
            car,
        })
    }

    pub fn lifespan(&self) -> Lifespan {
        self.actuary.lifespan()
    }

    pub fn death_date(&self) -> Date {
        self.actuary.death_date()
    }

    pub fn is_alive(&self, date: Date) -> bool {
        self.lifespan().is_alive(date)
    }

    pub fn age(&self, date: Date) -> f64 {
        self.actuary.age(date)
    }

    pub fn years_to_retirement(&self, date: Date) -> f64 {
        self.retirement_age - self.age(date)
    }

    pub fn retirement_date(&self) -> Date {
        add_fractional_years(self.actuary.birth_date(), self.retirement_age)
    }

    /// Car value net of its loan, halved when positive for resale friction.
    pub fn car_equity(&self) -> f64 {
        let balance = self.car.balance();
        if balance > 0.0 { balance / 2.0 } else { balance }
    }
}

fn risk_factors(tags: &[String]) -> Vec<RiskFactor> {
    tags.iter()
        .filter_map(|tag| {
            let factor = RiskFactor::from_tag(tag);
            if factor.is_none() {
                tracing::warn!(tag = %tag, "unknown risk factor ignored");
            }
            factor
        })
        .collect()
}

fn build_car(
    owner_name: &str,
    owner: Lifespan,
    config: Option<&CarConfig>,
    start: Date,
    source: &mut EntropySource,
) -> Result<Car, EntropyError> {
    let rng = source.next_rng()?;
    let Some(config) = config else {
        let loan = Debt::imaginary("Imaginary Car Loan", start);
        return Ok(Car::new(owner_name, owner, 0.0, start, loan, start, rng));
    };
    let loan = loan_or_imaginary(
        "Car Loan",
        "Imaginary Car Loan",
        config.principal,
        config.interest,
        &config.due_date,
        start,
    );
    let purchase_date = date_or("car.purchase_date", &config.purchase_date, start);
    Ok(Car::new(owner_name, owner, config.price, purchase_date, loan, start, rng))
}

/// A real loan needs a principal and a due date; anything less becomes a
/// never-due placeholder.
fn loan_or_imaginary(
    name: &str,
    placeholder: &str,
    principal: f64,
    interest: f64,
    due_date: &str,
    start: Date,
) -> Debt {
    if principal <= 0.0 {
        return Debt::imaginary(placeholder, start);
    }
    if due_date.trim().is_empty() {
        tracing::warn!(loan = name, principal, "loan has no due date, treating it as imaginary");
        return Debt::imaginary(placeholder, start);
    }
    let due = date_or("due_date", due_date, start);
    Debt::open(name, principal, interest, due, start)
}

fn build_home(config: Option<&HomeConfig>, rent: f64, start: Date) -> Home {
    let Some(config) = config else {
        return Home::rented(rent, start);
    };
    let mortgage = if config.principal <= 0.0 {
        Debt::imaginary("Imaginary Mortgage", start)
    } else if config.due_date.trim().is_empty() {
        tracing::warn!(
            principal = config.principal,
            "mortgage has no due date, treating it as imaginary"
        );
        Debt::imaginary("Imaginary Mortgage", start)
    } else {
        let due = date_or("home.due_date", &config.due_date, start);
        Debt::mortgage("Home", config.principal, config.interest, due, start)
    };
    Home::new(config.value, mortgage, config.property_tax, rent, start)
}

/// Slush funds, then tax-deferred accounts, then inherited IRAs, each in
/// name order.
fn build_investments(config: &HouseholdConfig, owner: Lifespan, start: Date) -> Vec<InvestmentAccount> {
    let assets = &config.assets;
    let slush = assets
        .slush_fund
        .iter()
        .map(|(name, &balance)| InvestmentAccount::brokerage(name, balance, start, owner));
    let deferred = assets
        .tax_deferred
        .iter()
        .map(|(name, &balance)| InvestmentAccount::tax_deferred(name, balance, start, owner));
    let inherited = assets.ira.iter().map(|(name, ira)| {
        let inherited_on = date_or("ira.inherit_date", &ira.inherit_date, owner.birth_date);
        InvestmentAccount::inherited(name, ira.balance, start, inherited_on, owner)
    });
    slush.chain(deferred).chain(inherited).collect()
}

fn build_debts(config: &HouseholdConfig, start: Date) -> Vec<Debt> {
    config
        .debts
        .iter()
        .map(|(name, debt)| {
            let due = date_or("debt.due_date", &debt.due_date, start);
            Debt::open(name, debt.principal, debt.interest, due, start)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct SimTimeline {
    pub start_date: Date,
    pub current_date: Date,
    pub months: u32,
}

#[derive(Debug, Clone)]
pub struct SimMarket {
    pub economy: Economy,
    pub portfolio: Portfolio,
    /// Growth of one dollar invested in the market since the start date.
    pub index: f64,
}

/// Everything the household shares.
#[derive(Debug, Clone)]
pub struct SimHousehold {
    pub cash: CashAccount,
    pub events: EventList,
    pub home: Home,
    pub debts: Vec<Debt>,
    pub investments: Vec<InvestmentAccount>,
    pub children: Vec<Child>,
    pub assisted_living: AssistedLiving,
    pub monthly_living: f64,
    pub cushion: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SimHistory {
    pub balances: Vec<BalanceSnapshot>,
    /// Set once the first bankruptcy has been logged.
    pub bankrupt: bool,
    /// Net cash gain carried toward the next anniversary sweep.
    pub surplus: f64,
}

/// Runtime state for one run, mutated month by month.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub index: usize,
    pub timeline: SimTimeline,
    pub market: SimMarket,
    pub household: SimHousehold,
    pub primary: Person,
    pub spouse: Option<Person>,
    pub history: SimHistory,
}

/// Construction knobs for tests and callers that pin parts of the run.
/// Pinned pieces still consume their seeds, so the remaining objects draw
/// the same randomness they would have otherwise.
#[derive(Debug, Clone)]
pub struct StateBuilder<'a> {
    config: &'a HouseholdConfig,
    start: Date,
    horizon_months: usize,
    economy: Option<Economy>,
    primary_death: Option<Date>,
    spouse_death: Option<Date>,
}

impl<'a> StateBuilder<'a> {
    pub fn new(config: &'a HouseholdConfig, start: Date) -> Self {
        Self {
            config,
            start,
            horizon_months: crate::model::HORIZON_MONTHS,
            economy: None,
            primary_death: None,
            spouse_death: None,
        }
    }

    #[must_use]
    pub fn horizon_months(mut self, months: usize) -> Self {
        self.horizon_months = months;
        self
    }

    /// Replaces the sampled regime chain.
    #[must_use]
    pub fn economy(mut self, economy: Economy) -> Self {
        self.economy = Some(economy);
        self
    }

    #[must_use]
    pub fn primary_death(mut self, date: Date) -> Self {
        self.primary_death = Some(date);
        self
    }

    #[must_use]
    pub fn spouse_death(mut self, date: Date) -> Self {
        self.spouse_death = Some(date);
        self
    }

    pub fn build(self, index: usize, mut source: EntropySource) -> Result<SimulationState, EntropyError> {
        let config = self.config;
        let start = self.start;

        let mut economy = Economy::new(start, &mut source)?;
        let portfolio = Portfolio::new(config.risk_profile, source.next_rng()?);
        let cash = CashAccount::open(config.assets.cash, start);

        let primary = Person::build(config, &config.state, start, self.primary_death, &mut source)?;
        let owner = primary.lifespan();
        let health = &config.health_care.assisted_living;
        let assisted_living = AssistedLiving::new(owner, health.basic_rate, health.terminal_rate);
        let home = build_home(config.assets.home.as_ref(), config.rent, start);
        let debts = build_debts(config, start);
        let investments = build_investments(config, owner, start);
        let children = config
            .children
            .iter()
            .map(|(name, child)| {
                let birth = date_or("child.birth_date", &child.birth_date, start);
                Child::new(name, birth, child.tuition.clone())
            })
            .collect();

        // Spouses pay tax in the primary's state.
        let spouse = config
            .spouse
            .as_deref()
            .map(|spouse| Person::build(spouse, &config.state, start, self.spouse_death, &mut source))
            .transpose()?;

        match self.economy {
            Some(pinned) => economy = pinned,
            None => economy.fill_horizon(&mut source, self.horizon_months)?,
        }

        tracing::trace!(
            index,
            seeds = source.seeds_drawn(),
            death = %primary.death_date(),
            "household built"
        );

        Ok(SimulationState {
            index,
            timeline: SimTimeline {
                start_date: start,
                current_date: start,
                months: 0,
            },
            market: SimMarket {
                economy,
                portfolio,
                index: 1.0,
            },
            household: SimHousehold {
                cash,
                events: EventList::new(),
                home,
                debts,
                investments,
                children,
                assisted_living,
                monthly_living: config.monthly_living,
                cushion: config.cushion,
            },
            primary,
            spouse,
            history: SimHistory::default(),
        })
    }
}

impl SimulationState {
    /// Builds run `index` of a batch, reading its seeds from the run's own
    /// offset in the entropy stream.
    pub fn from_config(
        config: &HouseholdConfig,
        index: usize,
        options: &MonteCarloConfig,
    ) -> Result<Self, EntropyError> {
        let source = options.entropy.open(options.offset(index))?;
        StateBuilder::new(config, options.start())
            .horizon_months(options.horizon_months)
            .build(index, source)
    }

    /// Household net worth: home equity, car equity, debts, investments
    /// and cash.
    pub fn net_worth(&self) -> f64 {
        let household = &self.household;
        let cars: f64 = self.people().map(Person::car_equity).sum();
        let debts: f64 = household.debts.iter().map(Account::balance).sum();
        let investments: f64 = household.investments.iter().map(Account::balance).sum();
        household.home.balance() + cars + debts + investments + household.cash.balance()
    }

    /// Tuition still owed for every child from `date` on.
    pub fn liabilities(&self, date: Date) -> f64 {
        self.household.children.iter().map(|c| c.remaining(date)).sum()
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        std::iter::once(&self.primary).chain(self.spouse.as_ref())
    }

    /// Named balances at the end of the month containing `date`.
    pub fn snapshot(&self, date: Date) -> BalanceSnapshot {
        let household = &self.household;
        let mut snapshot = BalanceSnapshot::new(crate::date_math::end_of_month(date));

        snapshot.insert_nonzero("Home", household.home.balance());
        let mortgage = household.home.mortgage();
        snapshot.insert_nonzero(mortgage.name(), mortgage.balance());
        for person in self.people() {
            snapshot.insert_nonzero(format!("{}'s Car", person.name), person.car.balance());
            snapshot.insert_nonzero(
                format!("{}'s Car Loan", person.name),
                person.car.loan().balance(),
            );
        }
        for (i, debt) in household.debts.iter().enumerate() {
            snapshot.insert_nonzero(format!("Debt {i} - {}", debt.name()), debt.balance());
        }
        for (i, account) in household.investments.iter().enumerate() {
            snapshot.insert_nonzero(format!("Acct {i} - {}", account.name()), account.balance());
        }
        snapshot.insert("Cash", household.cash.balance());
        snapshot.insert("Total", self.net_worth());
        snapshot
    }
}
