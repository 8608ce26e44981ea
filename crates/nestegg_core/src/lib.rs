//! Household retirement simulation library
//!
//! This crate projects a household's finances one month at a time from today
//! until death, under sampled mortality and a Markov chain of market regimes,
//! then repeats the projection many times to build a distribution of
//! outcomes. It models:
//! - Cash, brokerage, tax-deferred and inherited IRA accounts with RMDs
//! - Progressive federal, state, Social Security and Medicare withholding
//! - Jobs, Social Security, health care, assisted living and tuition
//! - A home with its mortgage, cars with loans, and other debts
//! - A cash cushion kept topped up from investments
//!
//! Randomness is reproducible: each run reads its seeds from its own offset
//! in an external byte stream.
//!
//! # Example
//!
//! ```ignore
//! use nestegg_core::config::{HouseholdBuilder, MonteCarloConfig};
//! use nestegg_core::simulation::monte_carlo_simulate;
//!
//! let config = HouseholdBuilder::new("Pat", "1970-04-01")
//!     .retirement_age(65.0)
//!     .annual_salary(120_000.0)
//!     .monthly_living(5_000.0)
//!     .cushion(30_000.0)
//!     .cash(40_000.0)
//!     .tax_deferred("Work", 500_000.0)
//!     .build();
//!
//! let summary = monte_carlo_simulate(&config, &MonteCarloConfig::new(1000))?;
//! println!("median terminal balance {}", summary.median.balance.value);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod date_math;
pub mod entropy;
pub mod error;
pub mod ledger;
pub mod liquidation;
pub mod sampling;
pub mod simulation;
pub mod simulation_state;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod life;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{HouseholdBuilder, HouseholdConfig, MonteCarloConfig};
pub use entropy::EntropyStream;
pub use error::{Result, SimulationError};
pub use model::{MonteCarloSummary, RunResult};
pub use simulation::{monte_carlo_simulate, monte_carlo_simulate_with, simulate};
