//! Integration tests for the fireplan projection engine
//!
//! Tests are organized by topic:
//! - `validation` - Input validation and allocation closure
//! - `determinism` - Seeded reproducibility of runs and batches
//! - `fire` - Closed forms, years-to-FIRE and the zero real return case
//! - `lifecycle` - Phases, withdrawals, taxes and RMDs across a full run
//! - `batches` - Multi-run aggregates and percentile ordering

mod batches;
mod lifecycle;
