// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Problems found while validating a sampler configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A size field that must be at least one was zero
    ZeroSize {
        /// Name of the offending field
        field: &'static str,
    },
    /// The sampler only attributes trajectories correctly with one env per task
    UnsupportedEnvsPerTask {
        /// The configured value
        envs_per_task: usize,
    },
    /// Sampling temperature must be strictly positive
    NonPositiveTemperature {
        /// The configured value
        temperature: f64,
    },
    /// Two feedback channels share a name
    DuplicateChannel {
        /// The duplicated channel name
        name: String,
    },
    /// A feedback channel masks no observation indices
    EmptyChannel {
        /// The channel name
        name: String,
    },
    /// The teacher schedule references a channel that is not configured
    UnknownChannel {
        /// Which schedule field holds the reference
        field: &'static str,
        /// The unresolved channel name
        name: String,
    },
    /// Two sampling modes were requested that cannot be combined
    ConflictingModes {
        /// First mode
        first: &'static str,
        /// Second mode
        second: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroSize { field } => {
                write!(f, "'{}' must be at least 1", field)
            }
            ValidationError::UnsupportedEnvsPerTask { envs_per_task } => {
                write!(
                    f,
                    "envs_per_task = {} is not supported: trajectory attribution is only defined for one environment per task",
                    envs_per_task
                )
            }
            ValidationError::NonPositiveTemperature { temperature } => {
                write!(f, "Sampling temperature must be > 0, got {}", temperature)
            }
            ValidationError::DuplicateChannel { name } => {
                write!(f, "Duplicate feedback channel: '{}'", name)
            }
            ValidationError::EmptyChannel { name } => {
                write!(f, "Feedback channel '{}' has no observation indices", name)
            }
            ValidationError::UnknownChannel { field, name } => {
                write!(
                    f,
                    "Teacher '{}' references channel '{}' which is not configured",
                    field, name
                )
            }
            ValidationError::ConflictingModes { first, second } => {
                write!(
                    f,
                    "Sampling modes '{}' and '{}' cannot both be enabled",
                    first, second
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML for the configuration schema.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file parsed but failed validation.
    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
