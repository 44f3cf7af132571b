// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::types::InfoRecord;

/// Reward as reported by an environment.
///
/// Some simulators report rewards as one-element arrays. Executors collapse
/// every reward to a scalar with [`Reward::into_scalar`] before it leaves the
/// slot, so nothing downstream sees the array form.
#[derive(Debug, Clone, PartialEq)]
pub enum Reward {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Reward {
    /// Scalar value of this reward; `None` for an empty array.
    pub fn into_scalar(self) -> Option<f64> {
        match self {
            Reward::Scalar(value) => Some(value),
            Reward::Array(values) => values.first().copied(),
        }
    }
}

impl From<f64> for Reward {
    fn from(value: f64) -> Self {
        Reward::Scalar(value)
    }
}

impl From<Vec<f64>> for Reward {
    fn from(values: Vec<f64>) -> Self {
        Reward::Array(values)
    }
}

/// Result of stepping a single environment once.
#[derive(Debug, Clone)]
pub struct EnvStep<O> {
    pub observation: O,
    pub reward: Reward,
    pub done: bool,
    pub info: InfoRecord,
}

impl<O> EnvStep<O> {
    pub fn new(observation: O, reward: impl Into<Reward>, done: bool) -> Self {
        Self {
            observation,
            reward: reward.into(),
            done,
            info: InfoRecord::new(),
        }
    }

    pub fn with_info(mut self, info: InfoRecord) -> Self {
        self.info = info;
        self
    }
}

/// Vectorized step results, one entry per slot in slot order.
#[derive(Debug, Clone)]
pub struct StepBatch<O> {
    pub observations: Vec<O>,
    pub rewards: Vec<f64>,
    pub dones: Vec<bool>,
    pub infos: Vec<InfoRecord>,
}

impl<O> StepBatch<O> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            observations: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity),
            dones: Vec::with_capacity(capacity),
            infos: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Append one slot's result.
    pub fn push(&mut self, observation: O, reward: f64, done: bool, info: InfoRecord) {
        self.observations.push(observation);
        self.rewards.push(reward);
        self.dones.push(done);
        self.infos.push(info);
    }

    /// Append another batch after this one, preserving order.
    pub fn extend(&mut self, other: StepBatch<O>) {
        self.observations.extend(other.observations);
        self.rewards.extend(other.rewards);
        self.dones.extend(other.dones);
        self.infos.extend(other.infos);
    }
}

/// Frame format requested from `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    RgbArray,
    Human,
}
