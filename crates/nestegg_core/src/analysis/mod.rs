//! Reduction of many runs into percentile bands.
//!
//! Runs are fed to a [`SummaryBuilder`] one at a time as they finish, so the
//! harness never has to keep every balance history in memory:
//!
//! ```ignore
//! let mut builder = SummaryBuilder::new();
//! for run in &runs {
//!     builder.add(run);
//! }
//! let summary = builder.finish()?;
//! println!("median balance {}", summary.median.balance.value);
//! ```

mod summary;

pub use summary::{SummaryBuilder, percentile_indices};
