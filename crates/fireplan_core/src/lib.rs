//! FIRE and retirement projection engine
//!
//! Given a household's financial assumptions this crate projects a
//! year-by-year portfolio trajectory and decides whether, and when, the plan
//! reaches financial independence. It supports:
//! - Fixed, Monte Carlo and historical returns
//! - Accounts by tax treatment (taxable, tax-deferred, tax-free, cash savings)
//! - Progressive ordinary and capital gains tax with loss carryforward
//! - Early withdrawal penalties and required minimum distributions
//! - Seeded, reproducible multi-run batches with percentile aggregates
//!
//! # Example
//!
//! ```ignore
//! use fireplan_core::{QuickPlanInputs, ReturnsMode, run_multi_simulation};
//! use fireplan_core::analysis::summarize_multi;
//!
//! let inputs = QuickPlanInputs::default();
//! let batch = run_multi_simulation(&inputs, ReturnsMode::Stochastic, 500)?;
//! let summary = summarize_multi(&batch);
//! println!("{:.0}% of runs never ran out of money", summary.success_rate * 100.0);
//! ```
//!
//! The engine performs no I/O and installs no tracing subscriber; hosts do.

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod error;
pub mod portfolio;
pub mod returns;
pub mod rng;
pub mod simulation;
pub mod taxes;
pub mod validation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{ProjectionBasis, SimulationConfig, TaxMode};
pub use error::{FireplanError, FireplanResult};
pub use model::{
    MultiSimulationResult, PeriodSnapshot, Phase, Plan, QuickPlanInputs, ReturnsMode,
    SimulationResult,
};
pub use simulation::{
    SimulationProgress, historical_backtest, monte_carlo_simulate, run_multi_simulation,
    run_single_simulation, simulate,
};
