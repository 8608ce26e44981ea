//! Shared test inputs.

use jiff::civil::Date;

use crate::config::HouseholdConfig;
use crate::entropy::EntropyStream;
use crate::model::Economy;
use crate::simulation_state::{SimulationState, StateBuilder};

/// A few kilobytes of fixed, non-repeating-looking bytes.
pub fn stream() -> EntropyStream {
    let bytes: Vec<u8> = (0..16_384u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
        .collect();
    EntropyStream::from_bytes(bytes)
}

/// Run 0 with a flat economy and a pinned death date.
pub fn pinned_state(
    config: &HouseholdConfig,
    start: Date,
    annual_return: f64,
    death: Date,
) -> SimulationState {
    StateBuilder::new(config, start)
        .economy(Economy::flat(start, annual_return))
        .primary_death(death)
        .build(0, stream().open(0).unwrap())
        .unwrap()
}
