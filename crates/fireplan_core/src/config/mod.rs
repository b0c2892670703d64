//! Simulation configuration
//!
//! `SimulationConfig` holds everything about *how* a plan is projected, as
//! opposed to the plan itself: the returns mode, seeds, the projection basis,
//! the tax model and the volatility assumptions used by Monte Carlo runs.
//!
//! ```ignore
//! use fireplan_core::config::{SimulationConfig, ProjectionBasis};
//! use fireplan_core::model::ReturnsMode;
//!
//! let config = SimulationConfig {
//!     basis: ProjectionBasis::Nominal,
//!     seed_count: 1_000,
//!     ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::model::{Percentage, Plan, ReturnsMode};

/// Seed used when a seeded mode is run without an explicit seed
pub const DEFAULT_SEED: u64 = 9521;

/// Distance between consecutive run seeds in a batch
pub const SEED_STRIDE: u64 = 1009;

fn default_seed_count() -> usize {
    500
}

fn default_base_seed() -> u64 {
    DEFAULT_SEED
}

fn default_true() -> bool {
    true
}

/// Whether money amounts are expressed in today's dollars or future dollars
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectionBasis {
    /// Inflation-adjusted: returns and growth rates deflated, spending constant
    #[default]
    Real,
    /// Nominal: returns as drawn, spending and tax brackets inflate
    Nominal,
}

/// How taxes are computed each period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxMode {
    /// Progressive ordinary and capital-gains brackets
    #[default]
    Progressive,
    /// The plan's flat effective tax rate
    Effective,
}

/// Annual standard deviation of each stochastic series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityAssumptions {
    pub stocks: Percentage,
    pub bonds: Percentage,
    pub cash: Percentage,
    pub inflation: Percentage,
}

impl Default for VolatilityAssumptions {
    fn default() -> Self {
        Self {
            stocks: Percentage::new(22.0),
            bonds: Percentage::new(6.0),
            cash: Percentage::new(1.0),
            inflation: Percentage::new(3.0),
        }
    }
}

/// Complete description of how to project a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Returns mode; `None` uses the plan's own simulation mode
    #[serde(default)]
    pub mode: Option<ReturnsMode>,

    /// Seed for single runs in seeded modes
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of runs in a multi-run batch
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,

    /// Seed of the first run in a batch
    #[serde(default = "default_base_seed")]
    pub base_seed: u64,

    #[serde(default)]
    pub basis: ProjectionBasis,

    #[serde(default)]
    pub tax_mode: TaxMode,

    /// Rebalance every account to its target allocation once a year
    #[serde(default = "default_true")]
    pub rebalance: bool,

    #[serde(default)]
    pub volatility: VolatilityAssumptions,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mode: None,
            seed: None,
            seed_count: default_seed_count(),
            base_seed: DEFAULT_SEED,
            basis: ProjectionBasis::default(),
            tax_mode: TaxMode::default(),
            rebalance: true,
            volatility: VolatilityAssumptions::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_mode(mode: ReturnsMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    /// Mode to run `plan` with
    pub fn resolve_mode(&self, plan: &Plan) -> ReturnsMode {
        self.mode.unwrap_or(plan.preferred_mode)
    }

    /// Seed for a single run
    pub fn single_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Seed of run `index` within a batch
    pub fn run_seed(&self, index: usize) -> u64 {
        self.base_seed
            .wrapping_add((index as u64).wrapping_mul(SEED_STRIDE))
    }
}
