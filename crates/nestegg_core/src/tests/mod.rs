//! Integration tests for the household simulation engine
//!
//! Tests are organized by topic:
//! - `cash_drawdown` - Cash-only households spending down under a flat market
//! - `rmd` - December required distributions through the monthly loop
//! - `mortgage` - Home loans amortizing to zero inside full runs
//! - `liquidity` - Cushion top-offs, crisis home sales and reinvestment
//! - `determinism` - Reproducibility and the seed construction order
//! - `economy` - Regime chain coverage and transition rules
//! - `summary` - Monte Carlo aggregation over real runs

mod cash_drawdown;
mod fixtures;
mod liquidity;
