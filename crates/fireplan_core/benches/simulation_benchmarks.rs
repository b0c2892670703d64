//! Criterion benchmarks for fireplan_core simulation
//!
//! Run with: cargo bench -p fireplan_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fireplan_core::config::{ProjectionBasis, SimulationConfig};
use fireplan_core::model::{AccountInputs, AccountKind, Plan, QuickPlanInputs, ReturnsMode};
use fireplan_core::simulation::{historical_backtest, monte_carlo_simulate, simulate};

fn create_basic_plan() -> Plan {
    QuickPlanInputs::default()
        .validate()
        .expect("default inputs are valid")
}

fn create_multi_account_plan() -> Plan {
    let account = |name: &str, kind, balance, contribution_limit| AccountInputs {
        name: name.to_string(),
        kind,
        balance,
        basis: None,
        allocation: None,
        contribution_limit,
        contribution_priority: None,
    };

    let mut inputs = QuickPlanInputs::default();
    inputs.basics.current_age = Some(45);
    inputs.accounts = vec![
        account("Savings", AccountKind::Savings, 20_000.0, None),
        account("Brokerage", AccountKind::Taxable, 150_000.0, None),
        account("401k", AccountKind::Traditional401k, 300_000.0, Some(23_500.0)),
        account("Roth IRA", AccountKind::RothIra, 80_000.0, Some(7_000.0)),
        account("HSA", AccountKind::Hsa, 15_000.0, Some(4_300.0)),
    ];
    inputs.validate().expect("multi-account inputs are valid")
}

fn bench_single_run(c: &mut Criterion) {
    let plan = create_basic_plan();
    let mut group = c.benchmark_group("single_run");

    for mode in [
        ReturnsMode::Fixed,
        ReturnsMode::Stochastic,
        ReturnsMode::Historical,
    ] {
        let config = SimulationConfig::with_mode(mode);
        group.bench_with_input(BenchmarkId::new("mode", format!("{mode:?}")), &mode, |b, &mode| {
            b.iter(|| simulate(black_box(&plan), black_box(&config), mode, black_box(42), None))
        });
    }

    group.finish();
}

fn bench_multi_account_run(c: &mut Criterion) {
    let plan = create_multi_account_plan();
    let config = SimulationConfig {
        basis: ProjectionBasis::Nominal,
        ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
    };

    c.bench_function("multi_account_nominal", |b| {
        b.iter(|| {
            simulate(
                black_box(&plan),
                black_box(&config),
                ReturnsMode::Stochastic,
                black_box(42),
                None,
            )
        })
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(10);
    let plan = create_basic_plan();

    for seed_count in [100, 500, 1000].iter() {
        let config = SimulationConfig {
            seed_count: *seed_count,
            ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
        };

        group.bench_with_input(
            BenchmarkId::new("runs", seed_count),
            seed_count,
            |b, _| b.iter(|| monte_carlo_simulate(black_box(&plan), black_box(&config), None)),
        );
    }

    group.finish();
}

fn bench_historical_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("historical");
    group.sample_size(10);
    let plan = create_basic_plan();
    let config = SimulationConfig::with_mode(ReturnsMode::Historical);

    group.bench_function("backtest_every_start_year", |b| {
        b.iter(|| historical_backtest(black_box(&plan), black_box(&config), None))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_run,
    bench_multi_account_run,
    bench_monte_carlo,
    bench_historical_backtest,
);
criterion_main!(benches);
