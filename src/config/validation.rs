//! Configuration validation.
//!
//! Every check runs and every problem is reported, so a single pass over a
//! broken file lists all of its errors:
//!
//! 1. **Sizes**: `meta_batch_size`, `rollouts_per_meta_task` and
//!    `max_path_length` must be at least 1
//! 2. **Sampler shape**: `envs_per_task` must be exactly 1
//! 3. **Sampling switches**: temperature must be positive, and `random`
//!    cannot be combined with `greedy`
//! 4. **Feedback channels**: names must be unique and every channel must mask
//!    at least one index
//! 5. **Teacher references**: `collect_with` / `distill_to` must name a
//!    configured channel
//!
//! # Examples
//!
//! ```rust
//! use meta_rollout::config::{validate_config, Config};
//! use meta_rollout::errors::ValidationError;
//!
//! let config: Config = serde_yaml::from_str(
//!     "executor: iterative\nmeta_batch_size: 0\nrollouts_per_meta_task: 1\nmax_path_length: 5\n",
//! )
//! .unwrap();
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(errors, vec![ValidationError::ZeroSize { field: "meta_batch_size" }]);
//! ```

use std::collections::HashSet;

use crate::config::consts::DEFAULT_ENVS_PER_TASK;
use crate::config::Config;
use crate::errors::ValidationError;

/// Validates a configuration, returning all problems found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_sizes(config, &mut errors);
    validate_sampling(config, &mut errors);
    let channels = validate_channels(config, &mut errors);
    validate_teacher(config, &channels, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_sizes(config: &Config, errors: &mut Vec<ValidationError>) {
    for (field, value) in [
        ("meta_batch_size", config.meta_batch_size),
        ("rollouts_per_meta_task", config.rollouts_per_meta_task),
        ("max_path_length", config.max_path_length),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroSize { field });
        }
    }

    if config.envs_per_task != DEFAULT_ENVS_PER_TASK {
        errors.push(ValidationError::UnsupportedEnvsPerTask {
            envs_per_task: config.envs_per_task,
        });
    }
}

fn validate_sampling(config: &Config, errors: &mut Vec<ValidationError>) {
    let temperature = config.sampling.get_temperature();
    if temperature.is_nan() || temperature <= 0.0 {
        errors.push(ValidationError::NonPositiveTemperature { temperature });
    }

    if config.sampling.random && config.sampling.greedy {
        errors.push(ValidationError::ConflictingModes {
            first: "random",
            second: "greedy",
        });
    }
}

/// Returns the set of configured channel names.
fn validate_channels<'a>(config: &'a Config, errors: &mut Vec<ValidationError>) -> HashSet<&'a str> {
    let mut seen = HashSet::new();

    for channel in &config.feedback_channels {
        if !seen.insert(channel.name.as_str()) {
            errors.push(ValidationError::DuplicateChannel {
                name: channel.name.clone(),
            });
        }
        if channel.indices.is_empty() {
            errors.push(ValidationError::EmptyChannel {
                name: channel.name.clone(),
            });
        }
    }

    seen
}

fn validate_teacher(config: &Config, channels: &HashSet<&str>, errors: &mut Vec<ValidationError>) {
    for (field, reference) in [
        ("collect_with", &config.teacher.collect_with),
        ("distill_to", &config.teacher.distill_to),
    ] {
        if let Some(name) = reference {
            if !channels.contains(name.as_str()) {
                errors.push(ValidationError::UnknownChannel {
                    field,
                    name: name.clone(),
                });
            }
        }
    }
}
