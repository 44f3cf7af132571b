// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ExecutorError;
use crate::traits::Environment;
use crate::types::{EnvStep, RenderMode, StepBatch};

/// The slots belonging to one meta task, together with their episode
/// counters and the task they were last assigned.
///
/// Both executor strategies drive environments through a shard: the
/// iterative executor owns one per meta task, and each parallel worker owns
/// exactly one. Slot indices in errors are local to the shard.
pub(crate) struct SlotShard<E: Environment> {
    envs: Vec<E>,
    elapsed: Vec<usize>,
    task: Option<E::Task>,
    max_path_length: usize,
}

impl<E: Environment> SlotShard<E> {
    /// Clone `template` into `slots` environments, all seeded with `seed`.
    pub fn new(template: &E, slots: usize, max_path_length: usize, seed: u64) -> Self {
        let envs = (0..slots)
            .map(|_| {
                let mut env = template.clone();
                env.seed(seed);
                env
            })
            .collect();

        Self {
            envs,
            elapsed: vec![0; slots],
            task: None,
            max_path_length,
        }
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    /// Step every slot once, auto-resetting slots whose episode ended.
    ///
    /// An episode ends when the simulator reports `done` or the slot's step
    /// counter reaches `max_path_length`. The slot is reported with
    /// `done = true` and the reset observation takes the place of the
    /// terminal one.
    pub fn step(&mut self, actions: &[E::Action]) -> Result<StepBatch<E::Observation>, ExecutorError> {
        if actions.len() != self.envs.len() {
            return Err(ExecutorError::ShapeMismatch {
                what: "actions",
                expected: self.envs.len(),
                actual: actions.len(),
            });
        }

        let Self {
            envs,
            elapsed,
            task,
            max_path_length,
        } = self;
        let mut batch = StepBatch::with_capacity(envs.len());

        for (slot, ((env, counter), action)) in envs
            .iter_mut()
            .zip(elapsed.iter_mut())
            .zip(actions)
            .enumerate()
        {
            let EnvStep {
                observation,
                reward,
                done,
                info,
            } = env
                .step(action)
                .map_err(|source| ExecutorError::Simulator { slot, source })?;
            let reward = reward
                .into_scalar()
                .ok_or(ExecutorError::EmptyReward { slot })?;

            *counter += 1;
            let done = done || *counter >= *max_path_length;
            let observation = if done {
                *counter = 0;
                env.set_task(task.clone());
                env.reset()
                    .map_err(|source| ExecutorError::Simulator { slot, source })?
            } else {
                observation
            };

            batch.push(observation, reward, done, info);
        }

        Ok(batch)
    }

    /// Reset every slot under its assigned task and clear its counter.
    pub fn reset(&mut self) -> Result<Vec<E::Observation>, ExecutorError> {
        let mut observations = Vec::with_capacity(self.envs.len());
        for (slot, env) in self.envs.iter_mut().enumerate() {
            env.set_task(self.task.clone());
            let observation = env
                .reset()
                .map_err(|source| ExecutorError::Simulator { slot, source })?;
            observations.push(observation);
        }
        self.elapsed.iter_mut().for_each(|counter| *counter = 0);
        Ok(observations)
    }

    /// Assign `task` to every slot. It stays assigned across resets until the
    /// next call.
    pub fn set_task(&mut self, task: Option<E::Task>) {
        for env in &mut self.envs {
            env.set_task(task.clone());
        }
        self.task = task;
    }

    pub fn advance_curriculum(&mut self) {
        self.envs.iter_mut().for_each(E::advance_curriculum);
    }

    pub fn set_dropout_proportion(&mut self, proportion: f64) {
        for env in &mut self.envs {
            env.set_dropout_proportion(proportion);
        }
    }

    pub fn seed(&mut self, seed: u64) {
        for env in &mut self.envs {
            env.seed(seed);
        }
    }

    pub fn set_level_distribution(&mut self, index: usize) {
        for env in &mut self.envs {
            env.set_level_distribution(index);
        }
    }

    pub fn render(&mut self, mode: RenderMode) -> Vec<E::Frame> {
        self.envs.iter_mut().map(|env| env.render(mode)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::stub::CountdownEnv;

    fn shard(episode_length: usize, max_path_length: usize) -> SlotShard<CountdownEnv> {
        let mut shard = SlotShard::new(&CountdownEnv::new(episode_length), 2, max_path_length, 3);
        shard.reset().unwrap();
        shard
    }

    #[test]
    fn test_done_slot_returns_reset_observation() {
        let mut shard = shard(2, 10);

        let first = shard.step(&[0, 0]).unwrap();
        assert_eq!(first.dones, vec![false, false]);
        assert_eq!(first.observations[0][1], 1.0);

        let second = shard.step(&[0, 0]).unwrap();
        assert_eq!(second.dones, vec![true, true]);
        assert_eq!(second.observations[0][1], 0.0, "terminal observation replaced by reset");

        let third = shard.step(&[0, 0]).unwrap();
        assert_eq!(third.dones, vec![false, false]);
        assert_eq!(third.observations[0][1], 1.0);
    }

    #[test]
    fn test_path_length_cap_forces_done() {
        let mut shard = shard(100, 3);

        let dones: Vec<bool> = (0..7).map(|_| shard.step(&[0, 0]).unwrap().dones[0]).collect();

        assert_eq!(dones, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_assigned_task_survives_auto_reset() {
        let mut shard = shard(1, 10);
        shard.set_task(Some(4));
        shard.reset().unwrap();

        let batch = shard.step(&[0, 0]).unwrap();

        assert!(batch.dones[0]);
        assert_eq!(batch.observations[0][0], 4.0);
    }

    #[test]
    fn test_array_reward_is_unwrapped() {
        let mut shard = SlotShard::new(&CountdownEnv::new(5).with_array_rewards(), 1, 10, 0);
        shard.reset().unwrap();

        let batch = shard.step(&[0]).unwrap();

        assert_eq!(batch.rewards, vec![1.0]);
    }

    #[test]
    fn test_action_count_must_match_slots() {
        let mut shard = shard(2, 10);

        let error = shard.step(&[0]).unwrap_err();

        assert!(matches!(
            error,
            ExecutorError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_simulator_failure_names_the_slot() {
        let mut shard = SlotShard::new(&CountdownEnv::new(5).failing_at(1), 2, 10, 0);
        shard.reset().unwrap();

        let error = shard.step(&[0, 0]).unwrap_err();

        assert!(matches!(error, ExecutorError::Simulator { slot: 0, .. }));
    }
}
