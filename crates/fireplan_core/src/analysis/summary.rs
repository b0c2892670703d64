//! Run and batch summaries

use serde::{Deserialize, Serialize};

use super::percentiles::{fire_age_percentiles, percentile_set};
use crate::model::{
    AgePercentiles, FireAgePercentiles, MultiSimulationResult, PercentileSet, ReturnsMode,
    SeededRun, SimulationResult,
};

/// Decision metrics for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub required_portfolio: f64,
    pub starting_portfolio: f64,
    /// `starting_portfolio / required_portfolio`, unclamped
    pub progress_to_retirement: f64,
    /// First age the portfolio met the required portfolio
    pub fire_age: Option<u32>,
    pub years_to_fire: Option<u32>,
    /// Age the run met its retirement target or reached the planned age
    pub retirement_age: Option<u32>,
    pub years_to_retirement: Option<u32>,
    pub bankruptcy_age: Option<u32>,
    pub final_portfolio: f64,
    pub peak_portfolio: f64,
    /// Largest peak-to-trough decline, as a fraction of the peak
    pub max_drawdown: f64,
    pub total_taxes: f64,
}

/// Decision metrics for a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiRunSummary {
    pub mode: ReturnsMode,
    pub runs: usize,
    pub bankrupt_runs: usize,
    pub success_rate: f64,
    pub fire_age_percentiles: FireAgePercentiles,
    pub final_portfolio_percentiles: PercentileSet,
    /// Mean final portfolio across runs
    pub mean_final_portfolio: f64,
}

/// Current portfolio as a share of the required portfolio
pub fn progress_to_retirement(current_portfolio: f64, required_portfolio: f64) -> f64 {
    if required_portfolio > 0.0 {
        current_portfolio / required_portfolio
    } else {
        0.0
    }
}

/// Largest fractional decline from a running peak
pub fn max_drawdown(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for value in values {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak);
        }
    }
    worst
}

pub fn summarize_run(result: &SimulationResult) -> RunSummary {
    let context = &result.context;
    let starting_portfolio = result.snapshots.first().map_or(0.0, |s| s.total_portfolio);
    let fire_age = result.fire_age();
    let totals = || result.snapshots.iter().map(|s| s.total_portfolio);

    RunSummary {
        required_portfolio: context.required_portfolio,
        starting_portfolio,
        progress_to_retirement: progress_to_retirement(
            starting_portfolio,
            context.required_portfolio,
        ),
        fire_age,
        years_to_fire: fire_age.map(|age| age.saturating_sub(context.start_age)),
        retirement_age: result.retirement_age,
        years_to_retirement: result
            .retirement_age
            .map(|age| age.saturating_sub(context.start_age)),
        bankruptcy_age: result.bankruptcy_age,
        final_portfolio: result.final_portfolio,
        peak_portfolio: totals().fold(0.0, f64::max),
        max_drawdown: max_drawdown(totals()),
        total_taxes: result.total_taxes(),
    }
}

pub fn summarize_multi(result: &MultiSimulationResult) -> MultiRunSummary {
    let runs = result.runs.len();
    let bankrupt_runs = result.runs.iter().filter(|r| r.result.is_bankrupt()).count();
    let mean_final_portfolio = if runs == 0 {
        0.0
    } else {
        result
            .runs
            .iter()
            .map(|r| r.result.final_portfolio)
            .sum::<f64>()
            / runs as f64
    };

    MultiRunSummary {
        mode: result.mode,
        runs,
        bankrupt_runs,
        success_rate: result.success_rate,
        fire_age_percentiles: result.fire_age_percentiles,
        final_portfolio_percentiles: result.final_portfolio_percentiles,
        mean_final_portfolio,
    }
}

/// Attach success rate and percentile series to a batch of runs
pub fn aggregate_runs(mode: ReturnsMode, runs: Vec<SeededRun>) -> MultiSimulationResult {
    let n = runs.len();
    let successes = runs.iter().filter(|r| !r.result.is_bankrupt()).count();
    let success_rate = if n == 0 {
        0.0
    } else {
        successes as f64 / n as f64
    };

    let portfolio_percentiles = match runs.first() {
        Some(first) => {
            let context = &first.result.context;
            (context.start_age..=context.life_expectancy)
                .map(|age| {
                    let values: Vec<f64> =
                        runs.iter().map(|r| r.result.portfolio_at_age(age)).collect();
                    AgePercentiles {
                        age,
                        portfolio: percentile_set(&values),
                    }
                })
                .collect()
        }
        None => Vec::new(),
    };

    let finals: Vec<f64> = runs.iter().map(|r| r.result.final_portfolio).collect();
    let fire_ages: Vec<Option<u32>> = runs.iter().map(|r| r.result.fire_age()).collect();

    MultiSimulationResult {
        mode,
        success_rate,
        portfolio_percentiles,
        final_portfolio_percentiles: percentile_set(&finals),
        fire_age_percentiles: fire_age_percentiles(&fire_ages),
        runs,
    }
}
