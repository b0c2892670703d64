//! Plain-text reports printed after a run

use fireplan_core::analysis::{
    FireOutcome, gross_required_portfolio, portfolio_return_nominal, portfolio_return_real,
    progress_to_retirement, required_portfolio, summarize_multi, summarize_run, yearly_contribution,
    years_to_fire,
};
use fireplan_core::model::{HistoricalStatistics, MultiSimulationResult, Phase, Plan, SimulationResult};

use crate::util::format::{
    format_age, format_compact_currency, format_currency, format_percentage,
};

/// Ages between rows of the percentile table
const PERCENTILE_ROW_STEP: u32 = 5;

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Accumulation => "working",
        Phase::Retirement => "retired",
        Phase::Bankrupt => "BANKRUPT",
    }
}

fn row(label: &str, value: impl AsRef<str>) -> String {
    format!("  {:<28}{}", label, value.as_ref())
}

/// Deterministic projection of the plan's expected returns
pub fn render_analysis(plan: &Plan) -> String {
    let required = required_portfolio(plan);
    let mut lines = vec![
        "FIRE analysis".to_string(),
        row("Required portfolio", format_currency(required)),
        row(
            "Required before taxes",
            format_currency(gross_required_portfolio(plan)),
        ),
        row("Current portfolio", format_currency(plan.invested_assets)),
        row(
            "Progress",
            format_percentage(progress_to_retirement(plan.invested_assets, required)),
        ),
        row(
            "Expected return",
            format!(
                "{} nominal, {} real",
                format_percentage(portfolio_return_nominal(plan)),
                format_percentage(portfolio_return_real(plan))
            ),
        ),
        row(
            "First-year savings",
            format_currency(yearly_contribution(plan, 1)),
        ),
    ];

    lines.push(match years_to_fire(plan) {
        FireOutcome::Reached { years, age, portfolio } => row(
            "FIRE",
            format!(
                "age {age} in {years} years with {}",
                format_compact_currency(portfolio)
            ),
        ),
        FireOutcome::Unreachable => row("FIRE", "not reachable within 100 years"),
    });
    lines.join("\n")
}

/// Summary of one run, optionally followed by a row per year
pub fn render_single(result: &SimulationResult, yearly: bool) -> String {
    let summary = summarize_run(result);
    let context = &result.context;
    let seed = context
        .seed
        .map_or_else(|| "-".to_string(), |seed| seed.to_string());

    let mut lines = vec![
        format!(
            "Single run ({:?} returns, {:?} dollars, seed {seed})",
            context.mode, context.basis
        ),
        row("Required portfolio", format_currency(summary.required_portfolio)),
        row("Starting portfolio", format_currency(summary.starting_portfolio)),
        row("FIRE age", format_age(summary.fire_age)),
        row("Retirement age", format_age(summary.retirement_age)),
        row("Bankrupt at", format_age(summary.bankruptcy_age)),
        row("Final portfolio", format_currency(summary.final_portfolio)),
        row("Peak portfolio", format_currency(summary.peak_portfolio)),
        row("Max drawdown", format_percentage(summary.max_drawdown)),
        row("Lifetime taxes", format_currency(summary.total_taxes)),
    ];

    for range in &result.historical_ranges {
        lines.push(row(
            "Historical years",
            format!("{}-{}", range.start_year, range.end_year),
        ));
    }

    if yearly {
        lines.push(String::new());
        lines.push(format!(
            "  {:>4}  {:<9}{:>12}{:>12}{:>12}{:>10}{:>12}",
            "Age", "Phase", "Portfolio", "Income", "Expenses", "Taxes", "Withdrawn"
        ));
        for snapshot in &result.snapshots {
            lines.push(format!(
                "  {:>4}  {:<9}{:>12}{:>12}{:>12}{:>10}{:>12}",
                snapshot.age,
                phase_label(snapshot.phase),
                format_compact_currency(snapshot.total_portfolio),
                format_compact_currency(snapshot.gross_income),
                format_compact_currency(snapshot.total_expenses),
                format_compact_currency(snapshot.taxes.total()),
                format_compact_currency(snapshot.withdrawals),
            ));
        }
    }

    lines.join("\n")
}

/// Success rate and percentile series of a batch
pub fn render_multi(result: &MultiSimulationResult) -> String {
    let summary = summarize_multi(result);
    let fire = summary.fire_age_percentiles;
    let finals = summary.final_portfolio_percentiles;

    let mut lines = vec![
        format!("{} runs ({:?} returns)", summary.runs, summary.mode),
        row("Success rate", format_percentage(summary.success_rate)),
        row("Bankrupt runs", summary.bankrupt_runs.to_string()),
        row(
            "FIRE age p10/p50/p90",
            format!(
                "{} / {} / {}",
                format_age(fire.p10),
                format_age(fire.p50),
                format_age(fire.p90)
            ),
        ),
        row(
            "Final p10/p50/p90",
            format!(
                "{} / {} / {}",
                format_compact_currency(finals.p10),
                format_compact_currency(finals.p50),
                format_compact_currency(finals.p90)
            ),
        ),
        row(
            "Mean final portfolio",
            format_currency(summary.mean_final_portfolio),
        ),
        String::new(),
        format!(
            "  {:>4}{:>10}{:>10}{:>10}{:>10}{:>10}",
            "Age", "p10", "p25", "p50", "p75", "p90"
        ),
    ];

    let last_age = result.portfolio_percentiles.last().map(|p| p.age);
    let first_age = result.portfolio_percentiles.first().map_or(0, |p| p.age);
    for entry in result.portfolio_percentiles.iter().filter(|p| {
        (p.age - first_age) % PERCENTILE_ROW_STEP == 0 || Some(p.age) == last_age
    }) {
        let p = entry.portfolio;
        lines.push(format!(
            "  {:>4}{:>10}{:>10}{:>10}{:>10}{:>10}",
            entry.age,
            format_compact_currency(p.p10),
            format_compact_currency(p.p25),
            format_compact_currency(p.p50),
            format_compact_currency(p.p75),
            format_compact_currency(p.p90),
        ));
    }

    lines.join("\n")
}

/// Mean, spread and range of each historical series
pub fn render_history(statistics: &HistoricalStatistics, first_year: i16, last_year: i16) -> String {
    let mut lines = vec![
        format!("Historical real returns {first_year}-{last_year}"),
        format!(
            "  {:<12}{:>10}{:>10}{:>10}{:>10}{:>10}",
            "Series", "Mean", "Geo mean", "Std dev", "Min", "Max"
        ),
    ];
    for (name, series) in [
        ("Stocks", statistics.stocks),
        ("Bonds", statistics.bonds),
        ("Cash", statistics.cash),
        ("Inflation", statistics.inflation),
    ] {
        lines.push(format!(
            "  {:<12}{:>10}{:>10}{:>10}{:>10}{:>10}",
            name,
            format_percentage(series.arithmetic_mean),
            format_percentage(series.geometric_mean),
            format_percentage(series.std_dev),
            format_percentage(series.min),
            format_percentage(series.max),
        ));
    }
    lines.join("\n")
}
