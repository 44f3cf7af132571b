// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_ENVS_PER_TASK, DEFAULT_SHOW_INSTRUCTIONS, DEFAULT_TEMPERATURE, INITIAL_LEVEL,
};
use crate::config::validation::validate_config;
use crate::curriculum::{FeedbackChannel, FixedSchedule, TeacherSchedule};
use crate::engine::ExecutorSettings;
use crate::errors::ConfigError;
use crate::observability::messages::validation::ConfigValidationFailed;
use crate::observability::messages::StructuredLog;
use crate::sampler::{SampleOptions, TeacherMaskPreprocessor};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure for a rollout run.
///
/// Describes the executor shape, the per-call sampling switches and the
/// teacher channels embedded in observations. It is typically loaded from a
/// YAML configuration file.
///
/// # Fields
/// * `executor` - Which executor strategy steps the environments
/// * `meta_batch_size` - Number of meta tasks sampled in parallel
/// * `envs_per_task` - Slots per meta task (optional, defaults to 1)
/// * `rollouts_per_meta_task` - Completed trajectories collected per task
/// * `max_path_length` - Step cap after which a slot is force-reset
/// * `seed` - Base seed for worker seeds and random actions (optional)
/// * `sampling` - Sampling switches (optional)
/// * `feedback_channels` - Teacher channels that can be masked (optional)
/// * `instruction_indices` - Observation indices hidden with instructions (optional)
/// * `teacher` - Fixed teacher schedule (optional)
///
/// # Example
/// ```yaml
/// executor: parallel
/// meta_batch_size: 4
/// rollouts_per_meta_task: 2
/// max_path_length: 40
/// seed: 7
/// sampling:
///   temperature: 1.0
///   log: true
/// feedback_channels:
///   - name: hint
///     indices: [1, 2]
/// instruction_indices: [3]
/// teacher:
///   collect_with: hint
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub executor: ExecutorKind,
    pub meta_batch_size: usize,
    #[serde(default = "default_envs_per_task")]
    pub envs_per_task: usize,
    pub rollouts_per_meta_task: usize,
    pub max_path_length: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub feedback_channels: Vec<FeedbackChannel>,
    #[serde(default)]
    pub instruction_indices: Vec<usize>,
    #[serde(default)]
    pub teacher: TeacherConfig,
}

fn default_envs_per_task() -> usize {
    DEFAULT_ENVS_PER_TASK
}

/// Executor strategy.
///
/// # Variants
/// * `Parallel` - One worker thread per meta task
/// * `Iterative` - Every slot stepped sequentially on the caller's task
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    Parallel,
    Iterative,
}

/// Sampling switches applied to every `obtain_samples` call.
///
/// # Example
/// ```yaml
/// sampling:
///   temperature: 0.8
///   show_instructions: false
///   greedy: true
///   log: true
///   log_prefix: "train/"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SamplingConfig {
    pub temperature: Option<f64>,
    pub show_instructions: Option<bool>,
    #[serde(default)]
    pub random: bool,
    #[serde(default)]
    pub greedy: bool,
    #[serde(default)]
    pub advance_curriculum: bool,
    #[serde(default)]
    pub log: bool,
    pub log_prefix: Option<String>,
}

impl SamplingConfig {
    pub fn get_temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn get_show_instructions(&self) -> bool {
        self.show_instructions.unwrap_or(DEFAULT_SHOW_INSTRUCTIONS)
    }
}

/// Fixed teacher schedule: which channel to collect with and which to
/// distill toward. Both must name configured feedback channels.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherConfig {
    pub collect_with: Option<String>,
    pub distill_to: Option<String>,
}

impl Config {
    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            meta_batch_size: self.meta_batch_size,
            envs_per_task: self.envs_per_task,
            max_path_length: self.max_path_length,
            seed: self.seed,
        }
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.feedback_channels
            .iter()
            .map(|channel| channel.name.clone())
            .collect()
    }

    pub fn teacher_schedule(&self) -> FixedSchedule {
        FixedSchedule::new(
            self.channel_names(),
            self.teacher.collect_with.clone(),
            self.teacher.distill_to.clone(),
        )
    }

    /// Sampling options with the teacher mask of the schedule's first level.
    pub fn sample_options(&self) -> SampleOptions {
        let mask = self.teacher_schedule().schedule(INITIAL_LEVEL, 0.0, 0.0).train;
        SampleOptions {
            random: self.sampling.random,
            greedy: self.sampling.greedy,
            advance_curriculum: self.sampling.advance_curriculum,
            teacher_mask: mask,
            show_instructions: self.sampling.get_show_instructions(),
            temperature: self.sampling.get_temperature(),
            log: self.sampling.log,
            log_prefix: self.sampling.log_prefix.clone().unwrap_or_default(),
        }
    }

    pub fn preprocessor(&self) -> TeacherMaskPreprocessor {
        TeacherMaskPreprocessor::new(
            self.feedback_channels.clone(),
            self.instruction_indices.clone(),
        )
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let source = path.as_ref().display().to_string();
    let cfg = load_config(path)?;

    if let Err(errors) = validate_config(&cfg) {
        ConfigValidationFailed {
            source: &source,
            errors: &errors,
        }
        .log();
        return Err(ConfigError::Invalid(errors));
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
executor: iterative
meta_batch_size: 4
rollouts_per_meta_task: 2
max_path_length: 40
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.executor, ExecutorKind::Iterative);
        assert_eq!(cfg.envs_per_task, 1);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.sampling.get_temperature(), DEFAULT_TEMPERATURE);
        assert!(cfg.sampling.get_show_instructions());
        assert!(cfg.feedback_channels.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
executor: parallel
meta_batch_size: 2
envs_per_task: 1
rollouts_per_meta_task: 3
max_path_length: 10
seed: 5
sampling:
  temperature: 0.5
  show_instructions: false
  greedy: true
  log: true
  log_prefix: "eval/"
feedback_channels:
  - name: hint
    indices: [1, 2]
  - name: cost
    indices: [4]
    null_value: -1.0
instruction_indices: [3]
teacher:
  collect_with: hint
  distill_to: cost
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let options = cfg.sample_options();

        assert_eq!(cfg.executor_settings(), ExecutorSettings::new(2, 1, 10).with_seed(5));
        assert_eq!(cfg.feedback_channels[1].null_value, -1.0);
        assert_eq!(options.temperature, 0.5);
        assert!(!options.show_instructions);
        assert!(options.greedy);
        assert_eq!(options.log_prefix, "eval/");
        assert!(options.teacher_mask.is_enabled("hint"));
        assert!(!options.teacher_mask.is_enabled("cost"));
    }

    #[test]
    fn test_unknown_executor_is_a_yaml_error() {
        let file = write_config(
            "executor: hybrid\nmeta_batch_size: 1\nrollouts_per_meta_task: 1\nmax_path_length: 1\n",
        );

        let result = load_config(file.path());

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = load_config("/nonexistent/rollout.yaml");

        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let file = write_config(
            r#"
executor: parallel
meta_batch_size: 2
rollouts_per_meta_task: 1
max_path_length: 8
"#,
        );

        let result = load_and_validate_config(file.path());

        assert!(result.is_ok());
    }

    #[test]
    fn test_load_and_validate_reports_every_problem() {
        let file = write_config(
            r#"
executor: parallel
meta_batch_size: 0
envs_per_task: 2
rollouts_per_meta_task: 1
max_path_length: 8
sampling:
  random: true
  greedy: true
"#,
        );

        let error = load_and_validate_config(file.path()).unwrap_err();

        let ConfigError::Invalid(errors) = &error else {
            panic!("expected validation failure, got {error}");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroSize {
            field: "meta_batch_size"
        }));
        assert!(error.to_string().contains("cannot both be enabled"));
    }
}
