//! Simulation output types
//!
//! A run produces an append-only sequence of [`PeriodSnapshot`]s, one for the
//! starting state and one per simulated year. Nothing here is mutated after
//! the engine hands it back.

use serde::{Deserialize, Serialize};

use super::{AccountSnapshot, AssetBalances, PeriodReturns, ReturnsMode, TaxTreatment};
use crate::config::ProjectionBasis;

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Working and saving the surplus
    Accumulation,
    /// Living off the portfolio
    Retirement,
    /// Terminal: a required withdrawal could not be funded
    Bankrupt,
}

/// Portfolio value grouped by tax treatment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentBalances {
    pub taxable: f64,
    pub tax_deferred: f64,
    pub tax_free: f64,
    pub cash_savings: f64,
}

impl TreatmentBalances {
    pub fn get(&self, treatment: TaxTreatment) -> f64 {
        match treatment {
            TaxTreatment::Taxable => self.taxable,
            TaxTreatment::TaxDeferred => self.tax_deferred,
            TaxTreatment::TaxFree => self.tax_free,
            TaxTreatment::CashSavings => self.cash_savings,
        }
    }

    pub fn add(&mut self, treatment: TaxTreatment, amount: f64) {
        match treatment {
            TaxTreatment::Taxable => self.taxable += amount,
            TaxTreatment::TaxDeferred => self.tax_deferred += amount,
            TaxTreatment::TaxFree => self.tax_free += amount,
            TaxTreatment::CashSavings => self.cash_savings += amount,
        }
    }

    pub fn total(&self) -> f64 {
        self.taxable + self.tax_deferred + self.tax_free + self.cash_savings
    }
}

/// Taxes assessed for one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub taxable_ordinary_income: f64,
    pub taxable_capital_gains: f64,
    pub ordinary_income_tax: f64,
    pub capital_gains_tax: f64,
    /// Surtax on early distributions, kept apart from income tax
    pub early_withdrawal_penalty: f64,
    /// Net capital loss applied against ordinary income this period
    pub capital_loss_deduction: f64,
    /// Unused capital loss carried into the next period
    pub capital_loss_carryforward: f64,
}

impl TaxBreakdown {
    pub fn total(&self) -> f64 {
        self.ordinary_income_tax + self.capital_gains_tax + self.early_withdrawal_penalty
    }
}

/// One year's recorded outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSnapshot {
    pub age: u32,
    /// Years since the start of the run (0 for the opening snapshot)
    pub year: u32,
    pub phase: Phase,
    pub accounts: Vec<AccountSnapshot>,
    pub by_asset_class: AssetBalances,
    pub by_tax_treatment: TreatmentBalances,
    pub total_portfolio: f64,
    pub gross_income: f64,
    pub total_expenses: f64,
    /// Income minus expenses minus taxes
    pub net_cash_flow: f64,
    pub taxes: TaxBreakdown,
    pub contributions: f64,
    pub withdrawals: f64,
    pub required_distributions: f64,
    /// Growth from returns during the period
    pub investment_gains: f64,
    /// Part of a required withdrawal the portfolio could not fund
    pub shortfall: f64,
    /// `None` for the opening snapshot
    pub returns: Option<PeriodReturns>,
}

/// Contiguous run of historical years a run drew from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRange {
    pub start_year: i16,
    pub end_year: i16,
}

/// Fixed facts about how a run was produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub mode: ReturnsMode,
    /// `None` for fixed-return runs
    pub seed: Option<u64>,
    pub basis: ProjectionBasis,
    pub start_age: u32,
    pub life_expectancy: u32,
    pub required_portfolio: f64,
}

/// A completed single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub context: RunContext,
    pub snapshots: Vec<PeriodSnapshot>,
    pub final_portfolio: f64,
    /// First age the portfolio met the retirement target, or the planned
    /// retirement age when the plan sets one
    pub retirement_age: Option<u32>,
    /// Age the run went bankrupt
    pub bankruptcy_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub historical_ranges: Vec<HistoricalRange>,
}

impl SimulationResult {
    pub fn is_bankrupt(&self) -> bool {
        self.bankruptcy_age.is_some()
    }

    pub fn final_snapshot(&self) -> Option<&PeriodSnapshot> {
        self.snapshots.last()
    }

    pub fn snapshot_at_age(&self, age: u32) -> Option<&PeriodSnapshot> {
        self.snapshots.iter().find(|s| s.age == age)
    }

    /// Portfolio value at `age`; zero once a bankrupt run has halted
    pub fn portfolio_at_age(&self, age: u32) -> f64 {
        match self.snapshot_at_age(age) {
            Some(snapshot) => snapshot.total_portfolio,
            None if self.is_bankrupt() && age > self.context.start_age => 0.0,
            None => self.final_portfolio,
        }
    }

    /// First age at which the portfolio met the required portfolio
    pub fn fire_age(&self) -> Option<u32> {
        self.snapshots
            .iter()
            .find(|s| s.total_portfolio >= self.context.required_portfolio)
            .map(|s| s.age)
    }

    pub fn total_taxes(&self) -> f64 {
        self.snapshots.iter().map(|s| s.taxes.total()).sum()
    }
}

/// One run of a batch, tagged by its seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededRun {
    pub seed: u64,
    pub result: SimulationResult,
}

/// p10/p25/p50/p75/p90 of a set of values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Portfolio percentiles across runs at one age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgePercentiles {
    pub age: u32,
    pub portfolio: PercentileSet,
}

/// FIRE-age percentiles; `None` means the percentile run never reached FIRE
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireAgePercentiles {
    pub p10: Option<u32>,
    pub p25: Option<u32>,
    pub p50: Option<u32>,
    pub p75: Option<u32>,
    pub p90: Option<u32>,
}

/// A batch of independently seeded runs plus aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSimulationResult {
    pub mode: ReturnsMode,
    pub runs: Vec<SeededRun>,
    /// Fraction of runs that never went bankrupt
    pub success_rate: f64,
    pub portfolio_percentiles: Vec<AgePercentiles>,
    pub final_portfolio_percentiles: PercentileSet,
    pub fire_age_percentiles: FireAgePercentiles,
}

impl MultiSimulationResult {
    pub fn run(&self, seed: u64) -> Option<&SimulationResult> {
        self.runs.iter().find(|r| r.seed == seed).map(|r| &r.result)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
