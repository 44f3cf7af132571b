// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::ExecutorError;
use crate::traits::Environment;
use crate::types::{RenderMode, StepBatch};

/// Vectorized view over `meta_batch_size × envs_per_task` environment slots.
///
/// Slots are numbered `0..num_envs()`; slot `i` belongs to meta task
/// `i / envs_per_task()`. Every operation blocks until all slots have been
/// handled and returns per-slot results in slot order.
#[async_trait]
pub trait VecExecutor: Send {
    type Env: Environment;

    fn meta_batch_size(&self) -> usize;

    fn envs_per_task(&self) -> usize;

    /// Total number of slots; fixed at construction.
    fn num_envs(&self) -> usize {
        self.meta_batch_size() * self.envs_per_task()
    }

    /// Step every slot once.
    ///
    /// `actions.len()` must equal `num_envs()`. A slot that reports `done`, or
    /// whose step counter reaches `max_path_length`, is reported with
    /// `done = true` and is reset before the call returns, so its entry in the
    /// returned observations is already the first observation of the next
    /// episode.
    async fn step(
        &mut self,
        actions: Vec<<Self::Env as Environment>::Action>,
    ) -> Result<StepBatch<<Self::Env as Environment>::Observation>, ExecutorError>;

    /// Reset every slot, re-applying its assigned task and clearing counters.
    async fn reset(
        &mut self,
    ) -> Result<Vec<<Self::Env as Environment>::Observation>, ExecutorError>;

    /// Assign one task per meta task. `None` assigns "no task" everywhere.
    async fn set_tasks(
        &mut self,
        tasks: Option<Vec<Option<<Self::Env as Environment>::Task>>>,
    ) -> Result<(), ExecutorError>;

    async fn advance_curriculum(&mut self) -> Result<(), ExecutorError>;

    async fn set_dropout(&mut self, proportion: f64) -> Result<(), ExecutorError>;

    /// Re-seed slots with one seed per meta task; `None` draws fresh seeds.
    async fn seed(&mut self, seeds: Option<Vec<u64>>) -> Result<(), ExecutorError>;

    async fn set_level_distribution(&mut self, index: usize) -> Result<(), ExecutorError>;

    async fn render(
        &mut self,
        mode: RenderMode,
    ) -> Result<Vec<<Self::Env as Environment>::Frame>, ExecutorError>;

    /// Release all resources. Further calls fail with `ExecutorError::Closed`
    /// where applicable.
    async fn close(&mut self) -> Result<(), ExecutorError>;

    /// Human-readable strategy name for logs.
    fn name(&self) -> &'static str;
}
