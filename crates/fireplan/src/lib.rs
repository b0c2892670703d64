//! Command-line front end for the fireplan projection engine
//!
//! Loads a YAML plan document, runs it on a background worker and prints a
//! plain-text report, optionally writing the full result as JSON.

pub mod cli;
pub mod document;
pub mod logging;
pub mod report;
pub mod util;
pub mod worker;

pub use cli::{Cli, Command, RunArgs, RunKind};
pub use document::PlanDocument;
pub use logging::init_logging;
pub use worker::{SimulationRequest, SimulationResponse, SimulationWorker};
