// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::types::{stack_info_records, InfoRecord, StackedInfo};

/// Per-slot accumulator for the episode currently in progress.
#[derive(Debug, Clone)]
pub struct RunningPath<I, A> {
    observations: Vec<I>,
    actions: Vec<A>,
    rewards: Vec<f64>,
    dones: Vec<bool>,
    env_infos: Vec<InfoRecord>,
    agent_infos: Vec<InfoRecord>,
}

impl<I, A> Default for RunningPath<I, A> {
    fn default() -> Self {
        Self {
            observations: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            dones: Vec::new(),
            env_infos: Vec::new(),
            agent_infos: Vec::new(),
        }
    }
}

impl<I, A> RunningPath<I, A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        observation: I,
        action: A,
        reward: f64,
        done: bool,
        env_info: InfoRecord,
        agent_info: InfoRecord,
    ) {
        self.observations.push(observation);
        self.actions.push(action);
        self.rewards.push(reward);
        self.dones.push(done);
        self.env_infos.push(env_info);
        self.agent_infos.push(agent_info);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Drain the accumulated steps into a trajectory, leaving the path empty.
    pub fn finalize(&mut self) -> Trajectory<I, A> {
        let path = std::mem::take(self);
        Trajectory {
            observations: path.observations,
            actions: path.actions,
            rewards: path.rewards,
            dones: path.dones,
            env_infos: stack_info_records(&path.env_infos),
            agent_infos: stack_info_records(&path.agent_infos),
        }
    }

    /// Discard the accumulated steps.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A finished episode. All sequences share the same length; info records are
/// stacked per key.
#[derive(Debug, Clone)]
pub struct Trajectory<I, A> {
    pub observations: Vec<I>,
    pub actions: Vec<A>,
    pub rewards: Vec<f64>,
    pub dones: Vec<bool>,
    pub env_infos: StackedInfo,
    pub agent_infos: StackedInfo,
}

impl<I, A> Trajectory<I, A> {
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }
}

/// Completed trajectories keyed by meta-task index, each in completion order.
#[derive(Debug, Clone)]
pub struct MetaBatch<I, A>(pub BTreeMap<usize, Vec<Trajectory<I, A>>>);

impl<I, A> MetaBatch<I, A> {
    /// An empty batch with an entry for each of `tasks` meta tasks.
    pub fn with_tasks(tasks: usize) -> Self {
        Self((0..tasks).map(|task| (task, Vec::new())).collect())
    }

    pub fn get(&self, task: usize) -> Option<&[Trajectory<I, A>]> {
        self.0.get(&task).map(Vec::as_slice)
    }

    pub fn completed(&self, task: usize) -> usize {
        self.0.get(&task).map_or(0, Vec::len)
    }

    pub(crate) fn push(&mut self, task: usize, trajectory: Trajectory<I, A>) {
        self.0.entry(task).or_default().push(trajectory);
    }

    pub fn total_trajectories(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn total_timesteps(&self) -> usize {
        self.0.values().flatten().map(Trajectory::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Trajectory<I, A>])> {
        self.0.iter().map(|(task, paths)| (*task, paths.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InfoValue;

    fn info(key: &str, value: i64) -> InfoRecord {
        InfoRecord::from([(key.to_string(), InfoValue::Int(value))])
    }

    #[test]
    fn test_finalize_drains_and_stacks_infos() {
        let mut path: RunningPath<u8, u8> = RunningPath::new();
        path.push(1, 0, 0.5, false, info("t", 1), InfoRecord::new());
        path.push(2, 1, 1.5, true, info("t", 2), info("p", 9));

        let trajectory = path.finalize();

        assert!(path.is_empty());
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.total_reward(), 2.0);
        assert_eq!(trajectory.dones, vec![false, true]);
        assert_eq!(
            trajectory.env_infos["t"],
            vec![InfoValue::Int(1), InfoValue::Int(2)]
        );
        assert_eq!(
            trajectory.agent_infos["p"],
            vec![InfoValue::Null, InfoValue::Int(9)]
        );
    }

    #[test]
    fn test_meta_batch_counts() {
        let mut batch: MetaBatch<u8, u8> = MetaBatch::with_tasks(2);
        let mut path = RunningPath::new();
        path.push(0, 0, 1.0, true, InfoRecord::new(), InfoRecord::new());
        batch.push(1, path.finalize());

        assert_eq!(batch.completed(0), 0);
        assert_eq!(batch.completed(1), 1);
        assert_eq!(batch.total_trajectories(), 1);
        assert_eq!(batch.total_timesteps(), 1);
        assert_eq!(batch.get(0).map(<[_]>::len), Some(0));
    }
}
