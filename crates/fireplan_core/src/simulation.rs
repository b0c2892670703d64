//! Year-by-year projection engine
//!
//! One run walks the ages from the plan's current age to its life expectancy.
//! Every year it grows the portfolio, works out the year's cash flow and taxes,
//! contributes any surplus or withdraws to cover the gap, and records a
//! [`PeriodSnapshot`]. A withdrawal that cannot be funded ends the run in the
//! Bankrupt phase.
//!
//! Batches run many independent seeds; with the `parallel` feature they are
//! spread over the rayon pool. Results are collected in seed order, so a batch
//! is reproducible regardless of scheduling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, trace};

use crate::analysis::{aggregate_runs, required_portfolio, retirement_target};
use crate::config::{ProjectionBasis, SimulationConfig};
use crate::error::{FireplanError, FireplanResult};
use crate::model::{
    HistoricalTable, MultiSimulationResult, PeriodReturns, PeriodSnapshot, Phase, Plan,
    QuickPlanInputs, RMD_START_AGE, ReturnsMode, RmdTable, RunContext, SeededRun,
    SimulationResult, TaxBreakdown,
};
use crate::portfolio::{Portfolio, WithdrawalOutcome};
use crate::returns::{HistoricalReturns, ReturnsProvider, build_provider};
use crate::taxes::{TaxCalculator, TaxTables, TaxableIncome};

/// Age from which `retirementIncome` (pension, social security) is paid
pub const RETIREMENT_INCOME_AGE: u32 = 62;

/// Upper bound on withdrawal gross-up passes per year
const MAX_GROSS_UP_ITERATIONS: usize = 32;

/// Deficits below one cent count as covered
const CENT: f64 = 0.01;

/// Progress tracking for simulation batches.
///
/// Cloning shares the underlying counters, so a host can keep one handle
/// for polling and cancelling while a worker runs the batch with another.
#[derive(Debug, Clone)]
pub struct SimulationProgress {
    /// Completed runs counter
    completed: Arc<AtomicUsize>,
    /// Total runs
    total: Arc<AtomicUsize>,
    /// Cancellation flag
    cancelled: Arc<AtomicBool>,
}

impl SimulationProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Completed share of the batch in `[0, 1]`
    #[must_use]
    pub fn fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.completed() as f64 / total as f64).min(1.0),
        }
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Ask in-flight runs to stop at their next year boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Allow new runs after a cancellation
    pub fn clear_cancellation(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for SimulationProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Validate `inputs` and run them once.
///
/// `seed` only matters for seeded modes; it defaults to
/// [`DEFAULT_SEED`](crate::config::DEFAULT_SEED).
pub fn run_single_simulation(
    inputs: &QuickPlanInputs,
    mode: ReturnsMode,
    seed: Option<u64>,
) -> FireplanResult<SimulationResult> {
    let plan = inputs.validate()?;
    let config = SimulationConfig {
        seed,
        ..SimulationConfig::with_mode(mode)
    };
    simulate(&plan, &config, mode, config.single_seed(), None)
}

/// Validate `inputs` and run `seed_count` independently seeded runs
pub fn run_multi_simulation(
    inputs: &QuickPlanInputs,
    mode: ReturnsMode,
    seed_count: usize,
) -> FireplanResult<MultiSimulationResult> {
    let plan = inputs.validate()?;
    let config = SimulationConfig {
        seed_count,
        ..SimulationConfig::with_mode(mode)
    };
    monte_carlo_simulate(&plan, &config, None)
}

/// Run `config.seed_count` runs seeded `base_seed + i * 1009`
pub fn monte_carlo_simulate(
    plan: &Plan,
    config: &SimulationConfig,
    progress: Option<&SimulationProgress>,
) -> FireplanResult<MultiSimulationResult> {
    let mode = config.resolve_mode(plan);
    let seeds: Vec<u64> = (0..config.seed_count).map(|i| config.run_seed(i)).collect();

    info!(?mode, runs = seeds.len(), base_seed = config.base_seed, "Starting simulation batch");
    let runs = run_batch(&seeds, progress, |&seed| {
        simulate(plan, config, mode, seed, progress)
    })?;

    Ok(aggregate_runs(mode, runs))
}

/// One run per historical start year, wrapping to the first year when the
/// data runs out. Each run is tagged with its start year as the seed.
pub fn historical_backtest(
    plan: &Plan,
    config: &SimulationConfig,
    progress: Option<&SimulationProgress>,
) -> FireplanResult<MultiSimulationResult> {
    let table = HistoricalTable::nyu_stern();
    let start_years: Vec<u64> = (table.start_year..=table.end_year())
        .map(|year| year as u64)
        .collect();

    info!(
        runs = start_years.len(),
        first = table.start_year,
        last = table.end_year(),
        "Starting historical backtest"
    );
    let runs = run_batch(&start_years, progress, |&year| {
        let provider = HistoricalReturns::from_start_year(table.clone(), year as i16)?;
        simulate_with_provider(
            plan,
            config,
            ReturnsMode::Historical,
            Some(year),
            provider,
            progress,
        )
    })?;

    Ok(aggregate_runs(ReturnsMode::Historical, runs))
}

/// Run every seed through `run`, in parallel when the `parallel` feature is on
fn run_batch<F>(
    seeds: &[u64],
    progress: Option<&SimulationProgress>,
    run: F,
) -> FireplanResult<Vec<SeededRun>>
where
    F: Fn(&u64) -> FireplanResult<SimulationResult> + Sync + Send,
{
    if seeds.is_empty() {
        return Err(FireplanError::EmptyBatch);
    }
    if let Some(progress) = progress {
        progress.reset(seeds.len());
    }

    let tagged = |seed: &u64| -> FireplanResult<SeededRun> {
        let result = run(seed)?;
        if let Some(progress) = progress {
            progress.increment();
        }
        Ok(SeededRun {
            seed: *seed,
            result,
        })
    };

    #[cfg(feature = "parallel")]
    let runs: FireplanResult<Vec<SeededRun>> = seeds.par_iter().map(tagged).collect();

    #[cfg(not(feature = "parallel"))]
    let runs: FireplanResult<Vec<SeededRun>> = seeds.iter().map(tagged).collect();

    match &runs {
        Ok(runs) => info!(runs = runs.len(), "Simulation batch complete"),
        Err(FireplanError::Cancelled) => info!("Simulation batch cancelled"),
        Err(e) => debug!(error = %e, "Simulation batch failed"),
    }
    runs
}

/// Run `plan` once with a freshly built returns provider
pub fn simulate(
    plan: &Plan,
    config: &SimulationConfig,
    mode: ReturnsMode,
    seed: u64,
    progress: Option<&SimulationProgress>,
) -> FireplanResult<SimulationResult> {
    let provider = build_provider(mode, plan, config, seed)?;
    let seed = mode.is_seeded().then_some(seed);
    simulate_with_provider(plan, config, mode, seed, provider, progress)
}

/// Run `plan` once against an arbitrary returns provider
pub fn simulate_with_provider<P: ReturnsProvider>(
    plan: &Plan,
    config: &SimulationConfig,
    mode: ReturnsMode,
    seed: Option<u64>,
    mut provider: P,
    progress: Option<&SimulationProgress>,
) -> FireplanResult<SimulationResult> {
    let context = RunContext {
        mode,
        seed,
        basis: config.basis,
        start_age: plan.current_age,
        life_expectancy: plan.life_expectancy,
        required_portfolio: required_portfolio(plan),
    };
    debug!(?mode, ?seed, basis = ?config.basis, "Starting run");

    let mut engine = Engine::new(plan, config);
    let mut snapshots = Vec::with_capacity(plan.horizon_years() as usize + 1);
    snapshots.push(engine.opening_snapshot());

    for year in 1..=plan.horizon_years() {
        if progress.is_some_and(SimulationProgress::is_cancelled) {
            return Err(FireplanError::Cancelled);
        }

        let returns = provider.next_returns(year - 1);
        let snapshot = engine.step(year, returns);
        let bankrupt = snapshot.phase == Phase::Bankrupt;
        snapshots.push(snapshot);
        if bankrupt {
            break;
        }
    }

    let final_portfolio = snapshots.last().map_or(0.0, |s| s.total_portfolio);
    debug!(
        final_portfolio,
        retirement_age = ?engine.retirement_age,
        bankruptcy_age = ?engine.bankruptcy_age,
        "Run complete"
    );

    Ok(SimulationResult {
        context,
        snapshots,
        final_portfolio,
        retirement_age: engine.retirement_age,
        bankruptcy_age: engine.bankruptcy_age,
        historical_ranges: provider.historical_ranges().to_vec(),
    })
}

// ============================================================================
// Engine
// ============================================================================

/// Cash flowing in and out of the household in one year, before taxes
#[derive(Debug, Clone, Copy, Default)]
struct CashFlow {
    /// Part-time and retirement income
    taxable_income: f64,
    /// Take-home pay while working
    untaxed_income: f64,
    expenses: f64,
}

impl CashFlow {
    fn income(&self) -> f64 {
        self.taxable_income + self.untaxed_income
    }
}

/// How the year's cash flow was settled against the portfolio
#[derive(Debug, Clone, Copy, Default)]
struct Settlement {
    taxes: TaxBreakdown,
    withdrawal: WithdrawalOutcome,
    contributions: f64,
    shortfall: f64,
}

struct Engine<'a> {
    plan: &'a Plan,
    config: &'a SimulationConfig,
    portfolio: Portfolio,
    taxes: TaxCalculator,
    rmd_table: RmdTable,
    phase: Phase,
    /// Cumulative inflation since the start; stays 1 in real basis
    price_level: f64,
    /// Portfolio that triggers retirement, today's dollars
    retirement_target: f64,
    retirement_age: Option<u32>,
    bankruptcy_age: Option<u32>,
}

impl<'a> Engine<'a> {
    fn new(plan: &'a Plan, config: &'a SimulationConfig) -> Self {
        let portfolio = Portfolio::new(plan.accounts.clone());
        let target = retirement_target(plan, config.tax_mode);
        let already_retired = match plan.target_retirement_age {
            Some(age) => plan.current_age >= age,
            None => portfolio.total_value() >= target,
        };

        Self {
            plan,
            config,
            portfolio,
            taxes: TaxCalculator::new(
                config.tax_mode,
                TaxTables::single_filer_2025(),
                plan.effective_tax_rate.as_decimal(),
            ),
            rmd_table: RmdTable::default(),
            phase: if already_retired {
                Phase::Retirement
            } else {
                Phase::Accumulation
            },
            price_level: 1.0,
            retirement_target: target,
            retirement_age: already_retired.then_some(plan.current_age),
            bankruptcy_age: None,
        }
    }

    fn opening_snapshot(&self) -> PeriodSnapshot {
        self.snapshot(self.plan.current_age, 0, CashFlow::default(), &Settlement::default())
    }

    /// A planned retirement age starts retirement in that year
    fn reached_target_age(&self, age: u32) -> bool {
        self.phase == Phase::Accumulation
            && self.plan.target_retirement_age.is_some_and(|target| age >= target)
    }

    /// Without a planned age, the year-end portfolio meeting the target
    /// starts retirement the following year
    fn reached_target_portfolio(&self) -> bool {
        self.phase == Phase::Accumulation
            && self.plan.target_retirement_age.is_none()
            && self.portfolio.total_value() >= self.retirement_target * self.price_level
    }

    fn retire(&mut self, age: u32) {
        self.phase = Phase::Retirement;
        self.retirement_age = Some(age);
        debug!(age, portfolio = self.portfolio.total_value(), "Entering retirement");
    }

    /// Simulate year `year` (1 = first year after the start)
    fn step(&mut self, year: u32, returns: PeriodReturns) -> PeriodSnapshot {
        let age = self.plan.current_age + year;

        if self.reached_target_age(age) {
            self.retire(age);
        }

        let rates = match self.config.basis {
            ProjectionBasis::Real => returns.real,
            ProjectionBasis::Nominal => {
                self.price_level *= 1.0 + returns.inflation;
                returns.nominal
            }
        };
        let investment_gains = self.portfolio.apply_returns(&rates);

        let flow = self.cash_flow(year, age);
        let required_distributions = if age >= RMD_START_AGE {
            self.portfolio
                .take_required_distributions(age, &self.rmd_table)
        } else {
            0.0
        };
        let settlement = self.settle(age, flow, required_distributions);

        if settlement.shortfall > 0.0 {
            self.phase = Phase::Bankrupt;
            self.bankruptcy_age = Some(age);
            debug!(age, shortfall = settlement.shortfall, "Portfolio exhausted");
        } else if self.config.rebalance {
            self.portfolio.rebalance();
        }
        self.portfolio.close_year();

        let mut snapshot = self.snapshot(age, year, flow, &settlement);
        snapshot.investment_gains = investment_gains;
        snapshot.required_distributions = required_distributions;
        snapshot.returns = Some(returns);
        trace!(age, total = snapshot.total_portfolio, phase = ?snapshot.phase, "Year complete");

        if self.reached_target_portfolio() {
            self.retire(age);
        }
        snapshot
    }

    fn cash_flow(&self, year: u32, age: u32) -> CashFlow {
        let plan = self.plan;
        match self.phase {
            Phase::Accumulation => {
                let n = year as i32;
                CashFlow {
                    taxable_income: 0.0,
                    untaxed_income: plan.annual_income
                        * (1.0 + plan.income_growth_rate.as_decimal()).powi(n),
                    expenses: plan.annual_expenses
                        * (1.0 + plan.expense_growth_rate.as_decimal()).powi(n),
                }
            }
            Phase::Retirement | Phase::Bankrupt => {
                let pension = if age >= RETIREMENT_INCOME_AGE {
                    plan.retirement_income
                } else {
                    0.0
                };
                CashFlow {
                    taxable_income: (plan.part_time_income + pension) * self.price_level,
                    untaxed_income: 0.0,
                    expenses: plan.retirement_expenses * self.price_level,
                }
            }
        }
    }

    /// Cover the year's expenses and taxes, withdrawing and grossing up as needed.
    ///
    /// Each pass withdraws from a copy of the portfolio, prices the taxes the
    /// withdrawal triggers, and raises the request by whatever is still
    /// uncovered. The copy replaces the portfolio once the gap closes or the
    /// portfolio runs dry.
    fn settle(&mut self, age: u32, flow: CashFlow, required_distributions: f64) -> Settlement {
        let cash_in = flow.income() + required_distributions;
        let base = TaxableIncome {
            ordinary_income: flow.taxable_income + required_distributions,
            ..Default::default()
        };

        let mut withdrawal = WithdrawalOutcome::default();
        let mut drawn: Option<Portfolio> = None;
        let mut taxes = self.taxes.assess(&base, self.price_level);
        let mut requested = 0.0;

        for _ in 0..MAX_GROSS_UP_ITERATIONS {
            let deficit = flow.expenses + taxes.total() - cash_in - withdrawal.gross;
            if deficit <= CENT || withdrawal.shortfall > 0.0 {
                break;
            }
            requested += deficit;
            let mut trial = self.portfolio.clone();
            withdrawal = trial.withdraw(requested, age);
            taxes = self
                .taxes
                .assess(&base.combine(&withdrawal.taxable), self.price_level);
            drawn = Some(trial);
        }

        if let Some(portfolio) = drawn {
            self.portfolio = portfolio;
        }
        let taxes = self
            .taxes
            .settle(&base.combine(&withdrawal.taxable), self.price_level);

        let balance = cash_in + withdrawal.gross - flow.expenses - taxes.total();
        let shortfall = if balance < -CENT { -balance } else { 0.0 };

        let mut contributions = 0.0;
        if balance > CENT {
            // Unspent RMD money goes back to a taxable account
            let reinvested = balance.min(required_distributions);
            self.portfolio.reinvest(reinvested);
            contributions = reinvested + self.portfolio.contribute(balance - reinvested);
        }

        Settlement {
            taxes,
            withdrawal,
            contributions,
            shortfall,
        }
    }

    fn snapshot(&self, age: u32, year: u32, flow: CashFlow, settlement: &Settlement) -> PeriodSnapshot {
        let gross_income = flow.income();
        PeriodSnapshot {
            age,
            year,
            phase: self.phase,
            accounts: self.portfolio.snapshots(),
            by_asset_class: self.portfolio.by_asset_class(),
            by_tax_treatment: self.portfolio.by_tax_treatment(),
            total_portfolio: self.portfolio.total_value(),
            gross_income,
            total_expenses: flow.expenses,
            net_cash_flow: gross_income - flow.expenses - settlement.taxes.total(),
            taxes: settlement.taxes,
            contributions: settlement.contributions,
            withdrawals: settlement.withdrawal.gross,
            required_distributions: 0.0,
            investment_gains: 0.0,
            shortfall: settlement.shortfall,
            returns: None,
        }
    }
}
