//! Multi-run batches and their aggregates

use proptest::prelude::{any, prop_assert, proptest};

use crate::analysis::summarize_multi;
use crate::config::SimulationConfig;
use crate::error::FireplanError;
use crate::model::{MultiSimulationResult, Plan, QuickPlanInputs, ReturnsMode};
use crate::simulation::{SimulationProgress, monte_carlo_simulate, simulate};

fn plan() -> Plan {
    QuickPlanInputs::default().validate().unwrap()
}

fn batch(mode: ReturnsMode, base_seed: u64, seed_count: usize) -> MultiSimulationResult {
    let config = SimulationConfig {
        base_seed,
        seed_count,
        ..SimulationConfig::with_mode(mode)
    };
    monte_carlo_simulate(&plan(), &config, None).unwrap()
}

fn never_last(age: Option<u32>) -> u32 {
    age.unwrap_or(u32::MAX)
}

// ============================================================================
// Ordering and reproducibility
// ============================================================================

#[test]
fn test_batch_matches_runs_simulated_one_by_one() {
    let plan = plan();
    let config = SimulationConfig {
        seed_count: 12,
        ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
    };
    let result = monte_carlo_simulate(&plan, &config, None).unwrap();

    for (index, run) in result.runs.iter().enumerate() {
        assert_eq!(run.seed, config.run_seed(index));
        let alone = simulate(&plan, &config, ReturnsMode::Stochastic, run.seed, None).unwrap();
        assert_eq!(run.result, alone, "Run {} differs", index);
    }
}

#[test]
fn test_success_rate_counts_bankrupt_runs() {
    let result = batch(ReturnsMode::Stochastic, 7, 40);
    let bankrupt = result.runs.iter().filter(|r| r.result.is_bankrupt()).count();
    let expected = (40 - bankrupt) as f64 / 40.0;
    assert!((result.success_rate - expected).abs() < 1e-12);

    let summary = summarize_multi(&result);
    assert_eq!(summary.runs, 40);
    assert_eq!(summary.bankrupt_runs, bankrupt);
}

#[test]
fn test_percentile_series_covers_every_age() {
    let result = batch(ReturnsMode::Historical, 42, 25);
    let ages: Vec<u32> = result.portfolio_percentiles.iter().map(|p| p.age).collect();
    assert_eq!(ages.first(), Some(&30));
    assert_eq!(ages.last(), Some(&90));
    assert_eq!(ages.len(), 61);
}

#[test]
fn test_cancelled_batch_has_no_partial_results() {
    let config = SimulationConfig {
        seed_count: 50,
        ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
    };
    let progress = SimulationProgress::default();
    progress.cancel();

    let result = monte_carlo_simulate(&plan(), &config, Some(&progress));
    assert_eq!(result, Err(FireplanError::Cancelled));
    assert_eq!(progress.completed(), 0);
}

// ============================================================================
// Percentile ordering
// ============================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(12))]

    #[test]
    fn prop_percentiles_are_ordered(base_seed in any::<u64>(), historical in any::<bool>()) {
        let mode = if historical { ReturnsMode::Historical } else { ReturnsMode::Stochastic };
        let result = batch(mode, base_seed, 20);

        let fire = result.fire_age_percentiles;
        prop_assert!(never_last(fire.p10) <= never_last(fire.p25));
        prop_assert!(never_last(fire.p25) <= never_last(fire.p50));
        prop_assert!(never_last(fire.p50) <= never_last(fire.p75));
        prop_assert!(never_last(fire.p75) <= never_last(fire.p90));

        for age in &result.portfolio_percentiles {
            let p = age.portfolio;
            prop_assert!(p.p10 <= p.p25 && p.p25 <= p.p50, "age {}: {:?}", age.age, p);
            prop_assert!(p.p50 <= p.p75 && p.p75 <= p.p90, "age {}: {:?}", age.age, p);
        }

        let finals = result.final_portfolio_percentiles;
        prop_assert!(finals.p10 <= finals.p50 && finals.p50 <= finals.p90);
        prop_assert!((0.0..=1.0).contains(&result.success_rate));
    }
}
