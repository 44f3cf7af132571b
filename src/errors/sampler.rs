// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::ExecutorError;

/// Failure reported by a policy while producing actions.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("policy failure: {message}")]
pub struct PolicyError {
    pub message: String,
}

impl PolicyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by `MetaSampler`.
#[derive(Error, Debug)]
pub enum SamplerError {
    /// The sampler was constructed against an unsupported configuration.
    #[error("sampler precondition violated: {0}")]
    Precondition(String),

    /// A batch produced during sampling had the wrong length.
    #[error("{what}: expected {expected} entries, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Policy mode was requested but no policy was supplied.
    #[error("no policy supplied and random mode is off")]
    MissingPolicy,

    /// Greedy mode could not derive an action for a slot.
    #[error("greedy action selection failed for slot {slot}: {reason}")]
    GreedyUnsupported { slot: usize, reason: &'static str },

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}
