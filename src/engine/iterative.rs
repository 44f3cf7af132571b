// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use rand::rngs::StdRng;

use crate::engine::settings::{draw_seeds, ExecutorSettings};
use crate::engine::slot::SlotShard;
use crate::errors::ExecutorError;
use crate::observability::messages::engine::{ExecutorClosed, ExecutorReady};
use crate::observability::messages::StructuredLog;
use crate::traits::{Environment, VecExecutor};
use crate::types::{RenderMode, StepBatch};

/// Single-threaded executor that steps every slot on the caller's task.
///
/// Same slot layout, auto-reset rule and seeding as
/// [`ParallelExecutor`](crate::engine::ParallelExecutor): given the same
/// template, settings and action sequence, both produce identical results.
/// Useful for debugging and for simulators that are cheap to step.
pub struct IterativeExecutor<E: Environment> {
    shards: Vec<SlotShard<E>>,
    settings: ExecutorSettings,
    rng: StdRng,
    closed: bool,
}

impl<E: Environment> IterativeExecutor<E> {
    pub fn new(template: &E, settings: ExecutorSettings) -> Result<Self, ExecutorError> {
        settings.check()?;

        let mut rng = settings.rng();
        let shards = draw_seeds(&mut rng, settings.meta_batch_size)
            .into_iter()
            .map(|seed| {
                SlotShard::new(
                    template,
                    settings.envs_per_task,
                    settings.max_path_length,
                    seed,
                )
            })
            .collect();

        let mut executor = Self {
            shards,
            settings,
            rng,
            closed: false,
        };

        if let Some(index) = template.level_distribution() {
            executor.shards_mut()?.for_each(|shard| shard.set_level_distribution(index));
        }
        executor.shards_mut()?.for_each(|shard| shard.set_task(None));
        executor.reset_all()?;

        ExecutorReady {
            strategy: "iterative",
            meta_batch_size: settings.meta_batch_size,
            envs_per_task: settings.envs_per_task,
            max_path_length: settings.max_path_length,
        }
        .log();

        Ok(executor)
    }

    fn shards_mut(&mut self) -> Result<std::slice::IterMut<'_, SlotShard<E>>, ExecutorError> {
        if self.closed {
            return Err(ExecutorError::Closed);
        }
        Ok(self.shards.iter_mut())
    }

    fn reset_all(&mut self) -> Result<Vec<E::Observation>, ExecutorError> {
        let envs_per_task = self.settings.envs_per_task;
        let mut observations = Vec::with_capacity(self.settings.num_envs());
        for (task, shard) in self.shards_mut()?.enumerate() {
            let reset = shard
                .reset()
                .map_err(|error| error.offset_slot(task * envs_per_task))?;
            observations.extend(reset);
        }
        Ok(observations)
    }
}

#[async_trait]
impl<E: Environment> VecExecutor for IterativeExecutor<E> {
    type Env = E;

    fn meta_batch_size(&self) -> usize {
        self.settings.meta_batch_size
    }

    fn envs_per_task(&self) -> usize {
        self.settings.envs_per_task
    }

    async fn step(&mut self, actions: Vec<E::Action>) -> Result<StepBatch<E::Observation>, ExecutorError> {
        let num_envs = self.num_envs();
        if actions.len() != num_envs {
            return Err(ExecutorError::ShapeMismatch {
                what: "actions",
                expected: num_envs,
                actual: actions.len(),
            });
        }

        let envs_per_task = self.settings.envs_per_task;
        let mut batch = StepBatch::with_capacity(num_envs);
        for (task, (shard, actions)) in self
            .shards_mut()?
            .zip(actions.chunks(envs_per_task))
            .enumerate()
        {
            let stepped = shard
                .step(actions)
                .map_err(|error| error.offset_slot(task * envs_per_task))?;
            batch.extend(stepped);
        }
        Ok(batch)
    }

    async fn reset(&mut self) -> Result<Vec<E::Observation>, ExecutorError> {
        self.reset_all()
    }

    async fn set_tasks(&mut self, tasks: Option<Vec<Option<E::Task>>>) -> Result<(), ExecutorError> {
        let meta_batch_size = self.settings.meta_batch_size;
        let tasks = match tasks {
            Some(tasks) if tasks.len() != meta_batch_size => {
                return Err(ExecutorError::ShapeMismatch {
                    what: "tasks",
                    expected: meta_batch_size,
                    actual: tasks.len(),
                })
            }
            Some(tasks) => tasks,
            None => vec![None; meta_batch_size],
        };

        for (shard, task) in self.shards_mut()?.zip(tasks) {
            shard.set_task(task);
        }
        Ok(())
    }

    async fn advance_curriculum(&mut self) -> Result<(), ExecutorError> {
        self.shards_mut()?.for_each(SlotShard::advance_curriculum);
        Ok(())
    }

    async fn set_dropout(&mut self, proportion: f64) -> Result<(), ExecutorError> {
        self.shards_mut()?
            .for_each(|shard| shard.set_dropout_proportion(proportion));
        Ok(())
    }

    async fn seed(&mut self, seeds: Option<Vec<u64>>) -> Result<(), ExecutorError> {
        let meta_batch_size = self.settings.meta_batch_size;
        let seeds = match seeds {
            Some(seeds) if seeds.len() != meta_batch_size => {
                return Err(ExecutorError::ShapeMismatch {
                    what: "seeds",
                    expected: meta_batch_size,
                    actual: seeds.len(),
                })
            }
            Some(seeds) => seeds,
            None => draw_seeds(&mut self.rng, meta_batch_size),
        };

        for (shard, seed) in self.shards_mut()?.zip(seeds) {
            shard.seed(seed);
        }
        Ok(())
    }

    async fn set_level_distribution(&mut self, index: usize) -> Result<(), ExecutorError> {
        self.shards_mut()?
            .for_each(|shard| shard.set_level_distribution(index));
        Ok(())
    }

    async fn render(&mut self, mode: RenderMode) -> Result<Vec<E::Frame>, ExecutorError> {
        Ok(self
            .shards_mut()?
            .flat_map(|shard| shard.render(mode))
            .collect())
    }

    async fn close(&mut self) -> Result<(), ExecutorError> {
        if !self.closed {
            self.closed = true;
            ExecutorClosed {
                strategy: self.name(),
                workers: 0,
            }
            .log();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "iterative"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::stub::CountdownEnv;

    fn executor(meta_batch_size: usize, envs_per_task: usize) -> IterativeExecutor<CountdownEnv> {
        let settings = ExecutorSettings::new(meta_batch_size, envs_per_task, 10).with_seed(42);
        IterativeExecutor::new(&CountdownEnv::new(3), settings).unwrap()
    }

    #[tokio::test]
    async fn test_slots_are_grouped_by_meta_task() {
        let mut executor = executor(2, 2);
        executor
            .set_tasks(Some(vec![Some(5), Some(6)]))
            .await
            .unwrap();

        let observations = executor.reset().await.unwrap();

        let markers: Vec<f32> = observations.iter().map(|obs| obs[0]).collect();
        assert_eq!(markers, vec![5.0, 5.0, 6.0, 6.0]);
    }

    #[tokio::test]
    async fn test_slots_of_a_task_share_its_seed() {
        let mut executor = executor(2, 2);

        let observations = executor.reset().await.unwrap();

        assert_eq!(observations[0][3], observations[1][3]);
        assert_eq!(observations[2][3], observations[3][3]);
        assert_ne!(observations[0][3], observations[2][3]);
    }

    #[tokio::test]
    async fn test_explicit_seeds_are_applied_per_task() {
        let mut executor = executor(2, 1);
        executor.seed(Some(vec![11, 12])).await.unwrap();

        let observations = executor.reset().await.unwrap();

        assert_eq!(observations[0][3], 11.0);
        assert_eq!(observations[1][3], 12.0);
        assert!(executor.seed(Some(vec![1])).await.is_err());
    }

    #[tokio::test]
    async fn test_simulator_failure_reports_global_slot() {
        let settings = ExecutorSettings::new(2, 2, 10).with_seed(1);
        let template = CountdownEnv::new(5).failing_for_task(9, 1);
        let mut executor = IterativeExecutor::new(&template, settings).unwrap();
        executor.set_tasks(Some(vec![None, Some(9)])).await.unwrap();
        executor.reset().await.unwrap();

        let error = executor.step(vec![0; 4]).await.unwrap_err();

        assert!(matches!(error, ExecutorError::Simulator { slot: 2, .. }));
    }

    #[tokio::test]
    async fn test_closed_executor_rejects_commands() {
        let mut executor = executor(1, 1);
        executor.close().await.unwrap();

        assert!(matches!(executor.step(vec![0]).await, Err(ExecutorError::Closed)));
        assert!(executor.close().await.is_ok());
    }
}
