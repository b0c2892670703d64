use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result, bail, eyre};
use fireplan::document::DEFAULT_PLAN_FILE;
use fireplan::report::{render_analysis, render_history, render_multi, render_single};
use fireplan::util::io::atomic_write;
use fireplan::{
    Cli, Command, PlanDocument, RunArgs, RunKind, SimulationRequest, SimulationResponse,
    SimulationWorker, init_logging,
};
use fireplan_core::model::HistoricalTable;

/// How often the main thread checks on a running simulation
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn default_plan_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fireplan")
        .join(DEFAULT_PLAN_FILE)
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Command::Run(args) => run(&args),
        Command::Analyze { plan } => analyze(&plan),
        Command::Init { path, force } => init(path.unwrap_or_else(default_plan_path), force),
        Command::History => history(),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let document = PlanDocument::load(&args.plan)?;
    let plan = Box::new(document.plan.validate()?);
    let config = args.apply(document.simulation);

    let request = match args.kind() {
        RunKind::Single => SimulationRequest::Single { plan, config },
        RunKind::Batch => SimulationRequest::MonteCarlo { plan, config },
        RunKind::Backtest => SimulationRequest::Backtest { plan, config },
    };

    let worker = SimulationWorker::new();
    let json = match worker.run_to_completion(request, args.timeout(), POLL_INTERVAL) {
        SimulationResponse::SingleComplete(result) => {
            println!("{}", render_single(&result, args.yearly));
            args.output
                .as_ref()
                .map(|_| serde_json::to_string_pretty(&result))
                .transpose()?
        }
        SimulationResponse::BatchComplete(result) => {
            println!("{}", render_multi(&result));
            args.output
                .as_ref()
                .map(|_| serde_json::to_string_pretty(&result))
                .transpose()?
        }
        SimulationResponse::Cancelled => bail!("Simulation cancelled before it finished"),
        SimulationResponse::Error(e) => return Err(eyre!(e).wrap_err("Simulation failed")),
    };

    if let (Some(path), Some(json)) = (&args.output, json) {
        atomic_write(path, &json)
            .wrap_err_with(|| format!("Failed to write results to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Results written");
    }
    Ok(())
}

fn analyze(path: &Path) -> Result<()> {
    let document = PlanDocument::load(path)?;
    let plan = document.plan.validate()?;
    println!("{}", render_analysis(&plan));
    Ok(())
}

fn init(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let yaml = PlanDocument::template().to_yaml()?;
    atomic_write(&path, &yaml)
        .wrap_err_with(|| format!("Failed to write plan document {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn history() -> Result<()> {
    let table = HistoricalTable::nyu_stern();
    let statistics = table
        .statistics()
        .ok_or_else(|| eyre!("Historical table is empty"))?;
    println!(
        "{}",
        render_history(&statistics, table.start_year, table.end_year())
    );
    Ok(())
}
