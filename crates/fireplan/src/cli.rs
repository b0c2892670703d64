//! Command-line arguments

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fireplan_core::config::{ProjectionBasis, SimulationConfig, TaxMode};
use fireplan_core::model::ReturnsMode;

#[derive(Parser, Debug)]
#[command(name = "fireplan")]
#[command(about = "Project savings, retirement and FIRE age for a household plan")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate a plan document
    Run(RunArgs),
    /// Deterministic FIRE projection of a plan document
    Analyze {
        /// Path to the plan document
        plan: PathBuf,
    },
    /// Write a starter plan document
    Init {
        /// Destination (default: ~/.fireplan/plan.yaml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Summary statistics of the historical returns table
    History,
}

/// Returns mode as named on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Fixed,
    MonteCarlo,
    Historical,
    /// One historical run per start year
    Backtest,
}

impl ModeArg {
    pub fn returns_mode(self) -> ReturnsMode {
        match self {
            ModeArg::Fixed => ReturnsMode::Fixed,
            ModeArg::MonteCarlo => ReturnsMode::Stochastic,
            ModeArg::Historical | ModeArg::Backtest => ReturnsMode::Historical,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BasisArg {
    Real,
    Nominal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TaxModeArg {
    Progressive,
    Effective,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the plan document
    pub plan: PathBuf,

    /// Returns mode (default: the document's, else the plan's)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Run a batch of seeded runs instead of a single run
    #[arg(short, long)]
    pub batch: bool,

    /// Seed of a single run, or the first seed of a batch
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of runs in a batch
    #[arg(long)]
    pub seed_count: Option<usize>,

    #[arg(long, value_enum)]
    pub basis: Option<BasisArg>,

    #[arg(long, value_enum)]
    pub tax_mode: Option<TaxModeArg>,

    /// Keep each account's drift instead of rebalancing yearly
    #[arg(long)]
    pub no_rebalance: bool,

    /// Cancel the simulation after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Write the full result as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a row per simulated year (single runs)
    #[arg(long)]
    pub yearly: bool,
}

/// What `run` should execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Single,
    Batch,
    Backtest,
}

impl RunArgs {
    pub fn kind(&self) -> RunKind {
        match self.mode {
            Some(ModeArg::Backtest) => RunKind::Backtest,
            _ if self.batch => RunKind::Batch,
            _ => RunKind::Single,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Layer the command-line flags over the document's simulation section
    pub fn apply(&self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(mode) = self.mode {
            config.mode = Some(mode.returns_mode());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
            config.base_seed = seed;
        }
        if let Some(seed_count) = self.seed_count {
            config.seed_count = seed_count;
        }
        if let Some(basis) = self.basis {
            config.basis = match basis {
                BasisArg::Real => ProjectionBasis::Real,
                BasisArg::Nominal => ProjectionBasis::Nominal,
            };
        }
        if let Some(tax_mode) = self.tax_mode {
            config.tax_mode = match tax_mode {
                TaxModeArg::Progressive => TaxMode::Progressive,
                TaxModeArg::Effective => TaxMode::Effective,
            };
        }
        if self.no_rebalance {
            config.rebalance = false;
        }
        config
    }
}
