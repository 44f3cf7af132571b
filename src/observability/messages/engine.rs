// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for executor and worker lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A worker thread was started and owns its slots.
///
/// # Log Level
/// `debug!` - one per worker at construction
pub struct WorkerSpawned {
    pub worker: usize,
    pub slots: usize,
    pub seed: u64,
}

impl Display for WorkerSpawned {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} spawned with {} slot(s), seed={}",
            self.worker, self.slots, self.seed
        )
    }
}

impl StructuredLog for WorkerSpawned {
    fn log(&self) {
        tracing::debug!(
            worker = self.worker,
            slots = self.slots,
            seed = self.seed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker",
            span_name = name,
            worker = self.worker,
            slots = self.slots,
            seed = self.seed,
        )
    }
}

/// A worker left its serve loop cleanly.
///
/// # Log Level
/// `debug!`
pub struct WorkerStopped {
    pub worker: usize,
    pub commands_served: u64,
}

impl Display for WorkerStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} stopped after {} command(s)",
            self.worker, self.commands_served
        )
    }
}

impl StructuredLog for WorkerStopped {
    fn log(&self) {
        tracing::debug!(
            worker = self.worker,
            commands_served = self.commands_served,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_stopped",
            span_name = name,
            worker = self.worker,
            commands_served = self.commands_served,
        )
    }
}

/// A worker hit a fatal error and terminated.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use meta_rollout::errors::ProtocolError;
/// use meta_rollout::observability::messages::engine::WorkerCrashed;
///
/// let error = ProtocolError::UnknownCommand { name: "noop".into() };
/// let msg = WorkerCrashed { worker: 3, error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct WorkerCrashed<'a> {
    pub worker: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerCrashed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} crashed: {}", self.worker, self.error)
    }
}

impl StructuredLog for WorkerCrashed<'_> {
    fn log(&self) {
        tracing::error!(
            worker = self.worker,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_crashed",
            span_name = name,
            worker = self.worker,
            error = %self.error,
        )
    }
}

/// A command failed inside a worker; the error was answered and the worker
/// keeps serving.
///
/// # Log Level
/// `warn!`
pub struct WorkerCommandFailed<'a> {
    pub worker: usize,
    pub command: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerCommandFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} failed '{}': {}",
            self.worker, self.command, self.error
        )
    }
}

impl StructuredLog for WorkerCommandFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            worker = self.worker,
            command = self.command,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "worker_command_failed",
            span_name = name,
            worker = self.worker,
            command = self.command,
            error = %self.error,
        )
    }
}

/// Executor constructed and all slots reset.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use meta_rollout::observability::messages::engine::ExecutorReady;
///
/// let msg = ExecutorReady {
///     strategy: "parallel",
///     meta_batch_size: 4,
///     envs_per_task: 1,
///     max_path_length: 40,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutorReady<'a> {
    pub strategy: &'a str,
    pub meta_batch_size: usize,
    pub envs_per_task: usize,
    pub max_path_length: usize,
}

impl Display for ExecutorReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} executor ready: {} task(s) x {} env(s), max_path_length={}",
            self.strategy, self.meta_batch_size, self.envs_per_task, self.max_path_length
        )
    }
}

impl StructuredLog for ExecutorReady<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            meta_batch_size = self.meta_batch_size,
            envs_per_task = self.envs_per_task,
            max_path_length = self.max_path_length,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "executor",
            span_name = name,
            strategy = self.strategy,
            meta_batch_size = self.meta_batch_size,
            envs_per_task = self.envs_per_task,
        )
    }
}

/// Executor shut down.
///
/// # Log Level
/// `info!`
pub struct ExecutorClosed<'a> {
    pub strategy: &'a str,
    pub workers: usize,
}

impl Display for ExecutorClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} executor closed ({} worker(s))", self.strategy, self.workers)
    }
}

impl StructuredLog for ExecutorClosed<'_> {
    fn log(&self) {
        tracing::info!(strategy = self.strategy, workers = self.workers, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "executor_closed",
            span_name = name,
            strategy = self.strategy,
            workers = self.workers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_spawned_display() {
        let msg = WorkerSpawned { worker: 2, slots: 1, seed: 99 };
        assert_eq!(msg.to_string(), "Worker 2 spawned with 1 slot(s), seed=99");
    }

    #[test]
    fn test_worker_command_failed_display() {
        let error = crate::errors::SimulatorError::new("boom");
        let msg = WorkerCommandFailed {
            worker: 1,
            command: "step",
            error: &error,
        };
        assert_eq!(msg.to_string(), "Worker 1 failed 'step': simulator failure: boom");
        assert!(!msg.to_string().contains("crashed"));
    }

    #[test]
    fn test_executor_ready_display() {
        let msg = ExecutorReady {
            strategy: "iterative",
            meta_batch_size: 3,
            envs_per_task: 1,
            max_path_length: 5,
        };
        assert_eq!(
            msg.to_string(),
            "iterative executor ready: 3 task(s) x 1 env(s), max_path_length=5"
        );
    }
}
