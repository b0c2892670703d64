//! Returns providers
//!
//! A provider yields one period's asset-class returns at a time. All three
//! variants are built up front from the plan and configuration, and reject bad
//! parameters at construction, never mid-run.

mod fixed;
mod historical;
mod stochastic;

pub use fixed::FixedReturns;
pub use historical::{HistoricalReturns, SequenceRestart};
pub use stochastic::{DEFAULT_CORRELATION, StochasticReturns, cholesky};

use crate::config::SimulationConfig;
use crate::error::FireplanResult;
use crate::model::{HistoricalRange, HistoricalTable, PeriodReturns, Plan, ReturnsMode};

/// Source of per-period returns for one run
pub trait ReturnsProvider {
    /// Returns for `period` (0 = first simulated year). Called once per
    /// period, in order.
    fn next_returns(&mut self, period: u32) -> PeriodReturns;

    /// Historical year ranges drawn so far
    fn historical_ranges(&self) -> &[HistoricalRange] {
        &[]
    }
}

impl<P: ReturnsProvider + ?Sized> ReturnsProvider for Box<P> {
    fn next_returns(&mut self, period: u32) -> PeriodReturns {
        (**self).next_returns(period)
    }

    fn historical_ranges(&self) -> &[HistoricalRange] {
        (**self).historical_ranges()
    }
}

/// Build the provider for one run of `plan`
pub fn build_provider(
    mode: ReturnsMode,
    plan: &Plan,
    config: &SimulationConfig,
    seed: u64,
) -> FireplanResult<Box<dyn ReturnsProvider + Send>> {
    Ok(match mode {
        ReturnsMode::Fixed => Box::new(FixedReturns::new(&plan.market)?),
        ReturnsMode::Stochastic => Box::new(StochasticReturns::new(
            &plan.market,
            &config.volatility,
            seed,
        )?),
        ReturnsMode::Historical => {
            Box::new(HistoricalReturns::random_start(HistoricalTable::nyu_stern(), seed)?)
        }
    })
}
