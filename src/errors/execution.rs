// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by executors and the worker protocol.

use thiserror::Error;

/// Failure reported by a simulator while stepping or resetting.
///
/// Environments return this instead of panicking; executors never retry it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("simulator failure: {message}")]
pub struct SimulatorError {
    pub message: String,
}

impl SimulatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Violations of the worker command protocol. These are fatal for the
/// worker that observes them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// A command name the worker does not implement.
    #[error("unknown worker command '{name}'")]
    UnknownCommand { name: String },

    /// A known command arrived with the wrong payload kind.
    #[error("command '{command}' expects a {expected} payload, got {actual}")]
    PayloadMismatch {
        command: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// A reply kind that does not belong to the command that was sent.
    #[error("unexpected '{reply}' reply to command '{command}'")]
    UnexpectedReply {
        command: &'static str,
        reply: &'static str,
    },
}

/// Errors surfaced by `VecExecutor` operations.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// An input vector had the wrong length for this executor.
    #[error("{what}: expected {expected} entries, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The simulator behind a slot failed.
    #[error("slot {slot}: {source}")]
    Simulator {
        slot: usize,
        #[source]
        source: SimulatorError,
    },

    /// A slot reported a reward array with no elements.
    #[error("slot {slot} reported an empty reward array")]
    EmptyReward { slot: usize },

    /// The worker protocol was violated.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A worker's channel closed before it replied.
    #[error("worker {worker} disconnected before replying")]
    WorkerDisconnected { worker: usize },

    /// A worker thread panicked.
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    /// The executor was already closed.
    #[error("executor is closed")]
    Closed,

    /// A worker thread could not be started.
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ExecutorError {
    /// Shift a shard-local slot index to its global position.
    pub(crate) fn offset_slot(self, offset: usize) -> Self {
        match self {
            ExecutorError::Simulator { slot, source } => ExecutorError::Simulator {
                slot: slot + offset,
                source,
            },
            ExecutorError::EmptyReward { slot } => ExecutorError::EmptyReward {
                slot: slot + offset,
            },
            other => other,
        }
    }
}
