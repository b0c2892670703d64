//! Background worker for running simulations off the main thread.
//!
//! The main thread polls the shared [`SimulationProgress`] to report how far
//! a batch has come and cancels it when the time budget runs out.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use fireplan_core::config::SimulationConfig;
use fireplan_core::error::{FireplanError, FireplanResult};
use fireplan_core::model::{MultiSimulationResult, Plan, SimulationResult};
use fireplan_core::simulation::{
    SimulationProgress, historical_backtest, monte_carlo_simulate, simulate,
};

/// Request sent to the background worker
#[derive(Debug)]
pub enum SimulationRequest {
    /// Run the plan once
    Single {
        plan: Box<Plan>,
        config: SimulationConfig,
    },
    /// Run `config.seed_count` seeded runs
    MonteCarlo {
        plan: Box<Plan>,
        config: SimulationConfig,
    },
    /// Run once per historical start year
    Backtest {
        plan: Box<Plan>,
        config: SimulationConfig,
    },
    /// Graceful shutdown
    Shutdown,
}

/// Response from the background worker
#[derive(Debug)]
pub enum SimulationResponse {
    /// Single simulation completed (boxed to reduce enum size)
    SingleComplete(Box<SimulationResult>),
    /// Batch completed
    BatchComplete(Box<MultiSimulationResult>),
    /// Simulation was cancelled
    Cancelled,
    /// Error occurred
    Error(String),
}

/// Background worker that runs simulations on a separate thread
pub struct SimulationWorker {
    request_tx: Sender<SimulationRequest>,
    response_rx: Receiver<SimulationResponse>,
    progress: SimulationProgress,
    thread: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    /// Create a new simulation worker with a background thread
    pub fn new() -> Self {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();
        let progress = SimulationProgress::default();

        let ctx = WorkerContext {
            response_tx,
            progress: progress.clone(),
        };
        let thread = thread::spawn(move || {
            ctx.run(request_rx);
        });

        Self {
            request_tx,
            response_rx,
            progress,
            thread: Some(thread),
        }
    }

    /// Send a simulation request to the worker
    pub fn send(&self, request: SimulationRequest) -> bool {
        // Clear cancel flag for new work
        self.progress.clear_cancellation();
        self.progress.reset(0);
        self.request_tx.send(request).is_ok()
    }

    /// Try to receive a response (non-blocking)
    pub fn try_recv(&self) -> Option<SimulationResponse> {
        self.response_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a response
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SimulationResponse, RecvTimeoutError> {
        self.response_rx.recv_timeout(timeout)
    }

    pub fn progress(&self) -> &SimulationProgress {
        &self.progress
    }

    /// Request cancellation of the current operation
    pub fn cancel(&self) {
        self.progress.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.progress.is_cancelled()
    }

    /// Shutdown the worker thread
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(SimulationRequest::Shutdown);
    }

    /// Send `request` and block until it finishes, logging batch progress
    /// every `poll_interval` and cancelling once `timeout` has elapsed.
    pub fn run_to_completion(
        &self,
        request: SimulationRequest,
        timeout: Option<Duration>,
        poll_interval: Duration,
    ) -> SimulationResponse {
        if !self.send(request) {
            return SimulationResponse::Error("simulation worker has stopped".to_string());
        }

        let started = Instant::now();
        let mut last_reported = 0;
        loop {
            match self.recv_timeout(poll_interval) {
                Ok(response) => return response,
                Err(RecvTimeoutError::Disconnected) => {
                    return SimulationResponse::Error("simulation worker has stopped".to_string());
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            let completed = self.progress.completed();
            if completed > last_reported {
                last_reported = completed;
                tracing::info!(
                    completed,
                    total = self.progress.total(),
                    percent = (self.progress.fraction() * 100.0).round(),
                    "Simulation progress"
                );
            }

            if timeout.is_some_and(|limit| started.elapsed() >= limit) && !self.is_cancelled() {
                tracing::warn!(
                    elapsed_secs = started.elapsed().as_secs(),
                    "Time limit reached, cancelling simulation"
                );
                self.cancel();
            }
        }
    }
}

impl Default for SimulationWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.cancel();
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Shared state for the background worker thread.
struct WorkerContext {
    response_tx: Sender<SimulationResponse>,
    progress: SimulationProgress,
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<SimulationRequest>) {
        while let Ok(request) = request_rx.recv() {
            let response = match request {
                SimulationRequest::Shutdown => break,

                SimulationRequest::Single { plan, config } => {
                    let mode = config.resolve_mode(&plan);
                    let seed = config.single_seed();
                    tracing::info!(?mode, seed, "Starting single simulation");
                    Self::respond(
                        simulate(&plan, &config, mode, seed, Some(&self.progress)),
                        |result| SimulationResponse::SingleComplete(Box::new(result)),
                    )
                }

                SimulationRequest::MonteCarlo { plan, config } => Self::respond(
                    monte_carlo_simulate(&plan, &config, Some(&self.progress)),
                    |result| SimulationResponse::BatchComplete(Box::new(result)),
                ),

                SimulationRequest::Backtest { plan, config } => Self::respond(
                    historical_backtest(&plan, &config, Some(&self.progress)),
                    |result| SimulationResponse::BatchComplete(Box::new(result)),
                ),
            };

            if self.response_tx.send(response).is_err() {
                break;
            }
        }
        tracing::debug!("Simulation worker stopped");
    }

    fn respond<T>(
        result: FireplanResult<T>,
        complete: impl FnOnce(T) -> SimulationResponse,
    ) -> SimulationResponse {
        match result {
            Ok(value) => complete(value),
            Err(FireplanError::Cancelled) => SimulationResponse::Cancelled,
            Err(e) => SimulationResponse::Error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireplan_core::model::{QuickPlanInputs, ReturnsMode};

    fn plan() -> Box<Plan> {
        Box::new(QuickPlanInputs::default().validate().unwrap())
    }

    const POLL: Duration = Duration::from_millis(5);

    #[test]
    fn test_single_run_completes() {
        let worker = SimulationWorker::new();
        let response = worker.run_to_completion(
            SimulationRequest::Single {
                plan: plan(),
                config: SimulationConfig::with_mode(ReturnsMode::Fixed),
            },
            None,
            POLL,
        );
        match response {
            SimulationResponse::SingleComplete(result) => assert_eq!(result.snapshots.len(), 61),
            other => panic!("Expected SingleComplete, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_reports_progress_total() {
        let worker = SimulationWorker::new();
        let config = SimulationConfig {
            seed_count: 16,
            ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
        };
        let response = worker.run_to_completion(
            SimulationRequest::MonteCarlo {
                plan: plan(),
                config,
            },
            None,
            POLL,
        );
        assert!(matches!(response, SimulationResponse::BatchComplete(ref r) if r.len() == 16));
        assert_eq!(worker.progress().completed(), 16);
    }

    #[test]
    fn test_zero_timeout_cancels_large_batch() {
        let worker = SimulationWorker::new();
        let config = SimulationConfig {
            seed_count: 1_000_000,
            ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
        };
        let response = worker.run_to_completion(
            SimulationRequest::MonteCarlo {
                plan: plan(),
                config,
            },
            Some(Duration::ZERO),
            POLL,
        );
        assert!(matches!(response, SimulationResponse::Cancelled));

        // The worker accepts new work after a cancellation
        let response = worker.run_to_completion(
            SimulationRequest::Single {
                plan: plan(),
                config: SimulationConfig::with_mode(ReturnsMode::Fixed),
            },
            None,
            POLL,
        );
        assert!(matches!(response, SimulationResponse::SingleComplete(_)));
    }

    #[test]
    fn test_empty_batch_is_reported_as_error() {
        let worker = SimulationWorker::new();
        let config = SimulationConfig {
            seed_count: 0,
            ..SimulationConfig::with_mode(ReturnsMode::Stochastic)
        };
        let response = worker.run_to_completion(
            SimulationRequest::MonteCarlo {
                plan: plan(),
                config,
            },
            None,
            POLL,
        );
        assert!(matches!(response, SimulationResponse::Error(ref e) if e.contains("at least one run")));
    }
}
