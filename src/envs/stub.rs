// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use rand::rngs::StdRng;
use rand::Rng;

use crate::errors::SimulatorError;
use crate::traits::Environment;
use crate::types::{EnvStep, InfoRecord, InfoValue, RenderMode, Reward};

/// Marker reported in place of a task when none is assigned.
pub const NO_TASK_MARKER: f32 = -1.0;

/// Deterministic environment whose episodes last a fixed number of steps.
///
/// Observations are `[task, elapsed, level, seed]`, with `task` replaced by
/// [`NO_TASK_MARKER`] when no task is assigned. Every step pays a reward of
/// `1.0` and episodes end after `episode_length` steps, or after `task`
/// steps when built [`with_task_lengths`](CountdownEnv::with_task_lengths).
#[derive(Debug, Clone)]
pub struct CountdownEnv {
    episode_length: usize,
    task: Option<u32>,
    elapsed: usize,
    level: usize,
    seed: u64,
    dropout: f64,
    array_rewards: bool,
    level_distribution: Option<usize>,
    fail_at: Option<usize>,
    fail_task: Option<u32>,
    task_lengths: bool,
}

impl CountdownEnv {
    pub fn new(episode_length: usize) -> Self {
        Self {
            episode_length,
            task: None,
            elapsed: 0,
            level: 0,
            seed: 0,
            dropout: 0.0,
            array_rewards: false,
            level_distribution: None,
            fail_at: None,
            fail_task: None,
            task_lengths: false,
        }
    }

    /// Report rewards as one-element arrays.
    pub fn with_array_rewards(mut self) -> Self {
        self.array_rewards = true;
        self
    }

    pub fn with_level_distribution(mut self, index: usize) -> Self {
        self.level_distribution = Some(index);
        self.level = index;
        self
    }

    /// Use the assigned task as the episode length.
    pub fn with_task_lengths(mut self) -> Self {
        self.task_lengths = true;
        self
    }

    /// Fail on step `step` of every episode.
    pub fn failing_at(mut self, step: usize) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Fail on step `step` of episodes run under `task` only.
    pub fn failing_for_task(mut self, task: u32, step: usize) -> Self {
        self.fail_at = Some(step);
        self.fail_task = Some(task);
        self
    }

    fn observe(&self) -> Vec<f32> {
        vec![
            self.task.map_or(NO_TASK_MARKER, |task| task as f32),
            self.elapsed as f32,
            self.level as f32,
            self.seed as f32,
        ]
    }

    fn episode_length(&self) -> usize {
        match self.task {
            Some(task) if self.task_lengths => task as usize,
            _ => self.episode_length,
        }
    }

    fn should_fail(&self) -> bool {
        self.fail_at == Some(self.elapsed)
            && (self.fail_task.is_none() || self.fail_task == self.task)
    }
}

impl Environment for CountdownEnv {
    type Observation = Vec<f32>;
    type Action = u32;
    type Task = u32;
    type Frame = String;

    fn seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    fn set_task(&mut self, task: Option<u32>) {
        self.task = task;
    }

    fn reset(&mut self) -> Result<Vec<f32>, SimulatorError> {
        self.elapsed = 0;
        Ok(self.observe())
    }

    fn step(&mut self, action: &u32) -> Result<EnvStep<Vec<f32>>, SimulatorError> {
        self.elapsed += 1;
        if self.should_fail() {
            return Err(SimulatorError::new(format!(
                "countdown failed at step {}",
                self.elapsed
            )));
        }

        let reward = if self.array_rewards {
            Reward::Array(vec![1.0])
        } else {
            Reward::Scalar(1.0)
        };
        let info = InfoRecord::from([
            ("elapsed".to_string(), InfoValue::Int(self.elapsed as i64)),
            ("action".to_string(), InfoValue::Int(*action as i64)),
            ("dropout".to_string(), InfoValue::Float(self.dropout)),
        ]);

        Ok(EnvStep::new(self.observe(), reward, self.elapsed >= self.episode_length()).with_info(info))
    }

    fn advance_curriculum(&mut self) {
        self.level += 1;
    }

    fn set_dropout_proportion(&mut self, proportion: f64) {
        self.dropout = proportion;
    }

    fn set_level_distribution(&mut self, index: usize) {
        self.level = index;
    }

    fn level_distribution(&self) -> Option<usize> {
        self.level_distribution
    }

    fn render(&mut self, _mode: RenderMode) -> String {
        format!("task={:?} t={} level={}", self.task, self.elapsed, self.level)
    }

    fn sample_action(&self, rng: &mut StdRng) -> u32 {
        rng.random_range(0..4)
    }

    fn action_from_index(&self, index: usize) -> Option<u32> {
        u32::try_from(index).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_ends_after_fixed_length() {
        let mut env = CountdownEnv::new(2);
        env.reset().unwrap();

        assert!(!env.step(&0).unwrap().done);
        assert!(env.step(&0).unwrap().done);
    }

    #[test]
    fn test_observation_carries_task_and_seed() {
        let mut env = CountdownEnv::new(2);
        env.seed(17);
        assert_eq!(env.reset().unwrap(), vec![NO_TASK_MARKER, 0.0, 0.0, 17.0]);

        env.set_task(Some(4));
        assert_eq!(env.reset().unwrap()[0], 4.0);
    }

    #[test]
    fn test_failure_is_scoped_to_task() {
        let mut env = CountdownEnv::new(5).failing_for_task(2, 1);
        env.reset().unwrap();
        assert!(env.step(&0).is_ok());

        env.set_task(Some(2));
        env.reset().unwrap();
        assert!(env.step(&0).is_err());
    }
}
