//! FIRE / retirement analysis
//!
//! Closed-form projections that need no simulation, plus reductions of one or
//! many simulation results into decision metrics.
//!
//! ```ignore
//! use fireplan_core::analysis::{required_portfolio, years_to_fire, summarize_multi};
//!
//! let plan = inputs.validate()?;
//! let target = required_portfolio(&plan);
//! let projection = years_to_fire(&plan);
//!
//! let batch = monte_carlo_simulate(&plan, &config, None)?;
//! let summary = summarize_multi(&batch);
//! println!("success rate: {:.1}%", summary.success_rate * 100.0);
//! ```

mod fire;
mod percentiles;
mod summary;

pub use fire::{
    FireOutcome, MAX_PROJECTION_YEARS, future_portfolio_value, gross_required_portfolio,
    portfolio_return_nominal, portfolio_return_real, required_portfolio, retirement_target,
    years_to_fire, yearly_contribution,
};
pub use percentiles::{
    PERCENTILES, fire_age_percentiles, percentile_index, percentile_of_sorted, percentile_set,
};
pub use summary::{
    MultiRunSummary, RunSummary, aggregate_runs, max_drawdown, progress_to_retirement,
    summarize_multi, summarize_run,
};
