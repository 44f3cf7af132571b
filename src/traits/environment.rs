// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use rand::rngs::StdRng;

use crate::errors::SimulatorError;
use crate::types::{EnvStep, RenderMode};

/// Capability interface every pluggable simulator must satisfy.
///
/// Executors clone a template environment once per slot and then drive each
/// copy exclusively through these methods. A copy is only ever touched by a
/// single thread, so implementations need `Send` but not `Sync`.
///
/// The curriculum hooks default to no-ops for simulators that have no
/// curriculum.
pub trait Environment: Clone + Send + 'static {
    type Observation: Clone + Send + 'static;
    type Action: Clone + Send + 'static;
    /// Per-meta-task configuration. `None` passed to `set_task` means
    /// "sample a task internally".
    type Task: Clone + Send + 'static;
    type Frame: Send + 'static;

    fn seed(&mut self, seed: u64);

    fn set_task(&mut self, task: Option<Self::Task>);

    fn reset(&mut self) -> Result<Self::Observation, SimulatorError>;

    fn step(&mut self, action: &Self::Action) -> Result<EnvStep<Self::Observation>, SimulatorError>;

    fn advance_curriculum(&mut self) {}

    fn set_dropout_proportion(&mut self, _proportion: f64) {}

    fn set_level_distribution(&mut self, _index: usize) {}

    /// Level distribution index the template was built with, re-applied to
    /// worker copies after they are spawned.
    fn level_distribution(&self) -> Option<usize> {
        None
    }

    fn render(&mut self, mode: RenderMode) -> Self::Frame;

    /// Draw a uniformly random action from the action space.
    fn sample_action(&self, rng: &mut StdRng) -> Self::Action;

    /// Width of the action vector, used to shape synthesized agent infos.
    fn action_dim(&self) -> usize {
        1
    }

    /// Map a discrete action index to an action, for greedy selection.
    fn action_from_index(&self, _index: usize) -> Option<Self::Action> {
        None
    }
}
