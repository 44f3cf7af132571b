// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::curriculum::FeedbackChannel;
use crate::errors::SimulatorError;
use crate::traits::Environment;
use crate::types::{EnvStep, InfoRecord, InfoValue, RenderMode, Reward};

pub const POSITION_INDEX: usize = 0;
pub const HINT_LEFT_INDEX: usize = 1;
pub const HINT_RIGHT_INDEX: usize = 2;
pub const INSTRUCTION_INDEX: usize = 3;
pub const OBSERVATION_SIZE: usize = 4;

pub const MOVE_LEFT: u8 = 0;
pub const MOVE_RIGHT: u8 = 1;

const GOAL_REWARD: f64 = 1.0;
const STEP_PENALTY: f64 = -0.01;

/// One-dimensional corridor: the agent starts at cell 0 and must walk to a
/// goal cell.
///
/// Observation layout (length [`OBSERVATION_SIZE`]):
///
/// | Index | Meaning |
/// |---|---|
/// | [`POSITION_INDEX`] | agent position / corridor length |
/// | [`HINT_LEFT_INDEX`], [`HINT_RIGHT_INDEX`] | one-hot direction to the goal (teacher hint) |
/// | [`INSTRUCTION_INDEX`] | goal position / corridor length |
///
/// The corridor grows by two cells per curriculum level. With dropout
/// proportion `p`, the hint is withheld (all zeros) on each observation with
/// probability `p`. Rewards are reported as one-element arrays.
#[derive(Debug, Clone)]
pub struct CorridorEnv {
    base_length: usize,
    level: usize,
    level_distribution: Option<usize>,
    task: Option<u32>,
    position: usize,
    goal: usize,
    dropout: f64,
    rng: StdRng,
}

impl CorridorEnv {
    pub fn new(base_length: usize) -> Self {
        Self {
            base_length: base_length.max(2),
            level: 0,
            level_distribution: None,
            task: None,
            position: 0,
            goal: 1,
            dropout: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn with_level_distribution(mut self, index: usize) -> Self {
        self.level_distribution = Some(index);
        self.level = index;
        self
    }

    /// The teacher hint channel, masked by the sampler when disabled.
    pub fn hint_channel() -> FeedbackChannel {
        FeedbackChannel {
            name: "hint".to_string(),
            indices: vec![HINT_LEFT_INDEX, HINT_RIGHT_INDEX],
            null_value: 0.0,
        }
    }

    pub fn length(&self) -> usize {
        self.base_length + 2 * self.level
    }

    fn observe(&mut self) -> Vec<f32> {
        let length = self.length() as f32;
        let mut observation = vec![0.0; OBSERVATION_SIZE];
        observation[POSITION_INDEX] = self.position as f32 / length;
        observation[INSTRUCTION_INDEX] = self.goal as f32 / length;

        let withheld = self.dropout > 0.0 && self.rng.random::<f64>() < self.dropout;
        if !withheld {
            let hint = if self.goal < self.position {
                HINT_LEFT_INDEX
            } else {
                HINT_RIGHT_INDEX
            };
            observation[hint] = 1.0;
        }
        observation
    }
}

impl Environment for CorridorEnv {
    type Observation = Vec<f32>;
    type Action = u8;
    type Task = u32;
    type Frame = String;

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn set_task(&mut self, task: Option<u32>) {
        self.task = task;
    }

    fn reset(&mut self) -> Result<Vec<f32>, SimulatorError> {
        let last = self.length() - 1;
        self.position = 0;
        self.goal = match self.task {
            Some(goal) => (goal as usize).clamp(1, last),
            None => self.rng.random_range(1..=last),
        };
        Ok(self.observe())
    }

    fn step(&mut self, action: &u8) -> Result<EnvStep<Vec<f32>>, SimulatorError> {
        match *action {
            MOVE_LEFT => self.position = self.position.saturating_sub(1),
            MOVE_RIGHT => self.position = (self.position + 1).min(self.length() - 1),
            other => {
                return Err(SimulatorError::new(format!(
                    "corridor action {} is out of range",
                    other
                )))
            }
        }

        let success = self.position == self.goal;
        let reward = if success { GOAL_REWARD } else { STEP_PENALTY };
        let info = InfoRecord::from([
            ("success".to_string(), InfoValue::Bool(success)),
            (
                "distance".to_string(),
                InfoValue::Int(self.goal.abs_diff(self.position) as i64),
            ),
        ]);

        Ok(EnvStep::new(self.observe(), Reward::Array(vec![reward]), success).with_info(info))
    }

    fn advance_curriculum(&mut self) {
        self.level += 1;
    }

    fn set_dropout_proportion(&mut self, proportion: f64) {
        self.dropout = proportion.clamp(0.0, 1.0);
    }

    fn set_level_distribution(&mut self, index: usize) {
        self.level = index;
    }

    fn level_distribution(&self) -> Option<usize> {
        self.level_distribution
    }

    fn render(&mut self, _mode: RenderMode) -> String {
        (0..self.length())
            .map(|cell| match cell {
                c if c == self.position => 'A',
                c if c == self.goal => 'G',
                _ => '.',
            })
            .collect()
    }

    fn sample_action(&self, rng: &mut StdRng) -> u8 {
        rng.random_range(MOVE_LEFT..=MOVE_RIGHT)
    }

    fn action_from_index(&self, index: usize) -> Option<u8> {
        match index {
            0 => Some(MOVE_LEFT),
            1 => Some(MOVE_RIGHT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walking_right_reaches_assigned_goal() {
        let mut env = CorridorEnv::new(6);
        env.set_task(Some(2));
        let observation = env.reset().unwrap();
        assert_eq!(observation[HINT_RIGHT_INDEX], 1.0);

        let first = env.step(&MOVE_RIGHT).unwrap();
        assert!(!first.done);
        assert_eq!(first.reward, Reward::Array(vec![STEP_PENALTY]));

        let second = env.step(&MOVE_RIGHT).unwrap();
        assert!(second.done);
        assert_eq!(second.reward.into_scalar(), Some(GOAL_REWARD));
        assert_eq!(env.render(RenderMode::Human), "..A...");
    }

    #[test]
    fn test_full_dropout_withholds_hint() {
        let mut env = CorridorEnv::new(6);
        env.set_dropout_proportion(1.0);

        let observation = env.reset().unwrap();

        assert_eq!(observation[HINT_LEFT_INDEX], 0.0);
        assert_eq!(observation[HINT_RIGHT_INDEX], 0.0);
    }

    #[test]
    fn test_curriculum_lengthens_corridor() {
        let mut env = CorridorEnv::new(4);
        env.advance_curriculum();
        assert_eq!(env.length(), 6);

        env.set_level_distribution(0);
        assert_eq!(env.length(), 4);
    }

    #[test]
    fn test_task_goal_is_clamped_into_corridor() {
        let mut env = CorridorEnv::new(4);
        env.set_task(Some(99));
        env.reset().unwrap();

        assert_eq!(env.render(RenderMode::Human), "A..G");
    }

    #[test]
    fn test_out_of_range_action_is_a_simulator_error() {
        let mut env = CorridorEnv::new(4);
        env.reset().unwrap();

        assert!(env.step(&7).is_err());
    }
}
