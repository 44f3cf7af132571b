// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::protocol::{
    Command, ADVANCE_CURRICULUM, SEED, SET_DROPOUT_PROPORTION, SET_LEVEL_DISTRIBUTION, SET_TASK,
};
use crate::engine::settings::{draw_seeds, ExecutorSettings};
use crate::engine::worker::{WorkerHandle, WorkerReply};
use crate::errors::ExecutorError;
use crate::observability::messages::engine::{ExecutorClosed, ExecutorReady};
use crate::observability::messages::StructuredLog;
use crate::traits::{Environment, VecExecutor};
use crate::types::{RenderMode, StepBatch};
use rand::rngs::StdRng;

/// Parallel executor that runs each meta task on its own worker thread.
///
/// The executor spawns one worker per meta task. Worker `w` owns the
/// `envs_per_task` slots `w * envs_per_task .. (w + 1) * envs_per_task` and is
/// the only thread that ever touches them.
///
/// ## Execution Strategy
///
/// Every vectorized operation is a broadcast in two phases:
/// 1. **Dispatch**: one request is queued on every worker's inbox, so all
///    workers run concurrently.
/// 2. **Collect**: replies are awaited in worker-index order and concatenated,
///    which keeps results in slot order regardless of which worker finishes
///    first.
///
/// A failure reported by any worker aborts the operation; slot indices in the
/// error are global.
///
/// ## Construction
///
/// [`ParallelExecutor::spawn`] draws one distinct seed per meta task, starts
/// the workers, re-applies the template's level distribution (if any),
/// assigns "no task" everywhere and performs an initial reset.
///
/// ## Shutdown
///
/// [`VecExecutor::close`] sends `close` to every worker and joins the
/// threads. Dropping an executor that was never closed still sends `close`,
/// but does not wait for the threads.
pub struct ParallelExecutor<E: Environment> {
    workers: Vec<WorkerHandle<E>>,
    settings: ExecutorSettings,
    rng: StdRng,
    closed: bool,
}

impl<E: Environment> ParallelExecutor<E> {
    /// Spawn the workers and bring every slot to a freshly reset state.
    pub async fn spawn(template: &E, settings: ExecutorSettings) -> Result<Self, ExecutorError> {
        settings.check()?;

        let mut rng = settings.rng();
        let seeds = draw_seeds(&mut rng, settings.meta_batch_size);
        let workers = seeds
            .into_iter()
            .enumerate()
            .map(|(index, seed)| {
                WorkerHandle::spawn(
                    index,
                    template,
                    settings.envs_per_task,
                    settings.max_path_length,
                    seed,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut executor = Self {
            workers,
            settings,
            rng,
            closed: false,
        };

        if let Some(index) = template.level_distribution() {
            executor.set_level_distribution(index).await?;
        }
        executor.set_tasks(None).await?;
        executor.reset().await?;

        ExecutorReady {
            strategy: executor.name(),
            meta_batch_size: settings.meta_batch_size,
            envs_per_task: settings.envs_per_task,
            max_path_length: settings.max_path_length,
        }
        .log();

        Ok(executor)
    }

    /// Send one command per worker, then collect the replies in worker order.
    async fn broadcast(
        &self,
        commands: Vec<Command<E::Action, E::Task>>,
    ) -> Result<Vec<WorkerReply<E>>, ExecutorError> {
        if self.closed {
            return Err(ExecutorError::Closed);
        }

        let pending = self
            .workers
            .iter()
            .zip(commands)
            .map(|(worker, command)| worker.dispatch(command.into_request()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut replies = Vec::with_capacity(pending.len());
        for (worker, pending) in self.workers.iter().zip(pending) {
            let reply = worker
                .receive(pending)
                .await
                .map_err(|error| error.offset_slot(worker.index() * self.settings.envs_per_task))?;
            replies.push(reply);
        }
        Ok(replies)
    }

    /// Broadcast the same command to every worker and expect acknowledgements.
    async fn broadcast_ack(
        &self,
        command: &'static str,
        make: impl Fn() -> Command<E::Action, E::Task> + Send,
    ) -> Result<(), ExecutorError> {
        let commands = (0..self.workers.len()).map(|_| make()).collect();
        for reply in self.broadcast(commands).await? {
            reply.into_ack(command)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Environment> VecExecutor for ParallelExecutor<E> {
    type Env = E;

    fn meta_batch_size(&self) -> usize {
        self.settings.meta_batch_size
    }

    fn envs_per_task(&self) -> usize {
        self.settings.envs_per_task
    }

    async fn step(&mut self, actions: Vec<E::Action>) -> Result<StepBatch<E::Observation>, ExecutorError> {
        if actions.len() != self.num_envs() {
            return Err(ExecutorError::ShapeMismatch {
                what: "actions",
                expected: self.num_envs(),
                actual: actions.len(),
            });
        }

        let mut actions = actions.into_iter();
        let commands = (0..self.workers.len())
            .map(|_| Command::Step(actions.by_ref().take(self.settings.envs_per_task).collect()))
            .collect();

        let mut batch = StepBatch::with_capacity(self.num_envs());
        for reply in self.broadcast(commands).await? {
            batch.extend(reply.into_step()?);
        }
        Ok(batch)
    }

    async fn reset(&mut self) -> Result<Vec<E::Observation>, ExecutorError> {
        let commands = (0..self.workers.len()).map(|_| Command::Reset).collect();

        let mut observations = Vec::with_capacity(self.num_envs());
        for reply in self.broadcast(commands).await? {
            observations.extend(reply.into_observations()?);
        }
        Ok(observations)
    }

    async fn set_tasks(&mut self, tasks: Option<Vec<Option<E::Task>>>) -> Result<(), ExecutorError> {
        let tasks = match tasks {
            Some(tasks) if tasks.len() != self.workers.len() => {
                return Err(ExecutorError::ShapeMismatch {
                    what: "tasks",
                    expected: self.workers.len(),
                    actual: tasks.len(),
                })
            }
            Some(tasks) => tasks,
            None => vec![None; self.workers.len()],
        };

        let commands = tasks.into_iter().map(Command::SetTask).collect();
        for reply in self.broadcast(commands).await? {
            reply.into_ack(SET_TASK)?;
        }
        Ok(())
    }

    async fn advance_curriculum(&mut self) -> Result<(), ExecutorError> {
        self.broadcast_ack(ADVANCE_CURRICULUM, || Command::AdvanceCurriculum)
            .await
    }

    async fn set_dropout(&mut self, proportion: f64) -> Result<(), ExecutorError> {
        self.broadcast_ack(SET_DROPOUT_PROPORTION, || {
            Command::SetDropoutProportion(proportion)
        })
        .await
    }

    async fn seed(&mut self, seeds: Option<Vec<u64>>) -> Result<(), ExecutorError> {
        let seeds = match seeds {
            Some(seeds) if seeds.len() != self.workers.len() => {
                return Err(ExecutorError::ShapeMismatch {
                    what: "seeds",
                    expected: self.workers.len(),
                    actual: seeds.len(),
                })
            }
            Some(seeds) => seeds,
            None => draw_seeds(&mut self.rng, self.workers.len()),
        };

        let commands = seeds.into_iter().map(Command::Seed).collect();
        for reply in self.broadcast(commands).await? {
            reply.into_ack(SEED)?;
        }
        Ok(())
    }

    async fn set_level_distribution(&mut self, index: usize) -> Result<(), ExecutorError> {
        self.broadcast_ack(SET_LEVEL_DISTRIBUTION, || {
            Command::SetLevelDistribution(index)
        })
        .await
    }

    async fn render(&mut self, mode: RenderMode) -> Result<Vec<E::Frame>, ExecutorError> {
        let commands = (0..self.workers.len()).map(|_| Command::Render(mode)).collect();

        let mut frames = Vec::with_capacity(self.num_envs());
        for reply in self.broadcast(commands).await? {
            frames.extend(reply.into_frames()?);
        }
        Ok(frames)
    }

    async fn close(&mut self) -> Result<(), ExecutorError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let workers = self.workers.len();
        let mut first_error = None;
        for worker in self.workers.drain(..) {
            if let Err(error) = worker.shutdown().await {
                first_error.get_or_insert(error);
            }
        }

        ExecutorClosed {
            strategy: self.name(),
            workers,
        }
        .log();

        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::stub::CountdownEnv;

    async fn executor(meta_batch_size: usize, episode_length: usize) -> ParallelExecutor<CountdownEnv> {
        let settings = ExecutorSettings::new(meta_batch_size, 1, 10).with_seed(42);
        ParallelExecutor::spawn(&CountdownEnv::new(episode_length), settings)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_step_returns_results_in_slot_order() {
        let mut executor = executor(3, 5).await;
        executor
            .set_tasks(Some(vec![Some(10), Some(20), Some(30)]))
            .await
            .unwrap();
        executor.reset().await.unwrap();

        let batch = executor.step(vec![0, 0, 0]).await.unwrap();

        let markers: Vec<f32> = batch.observations.iter().map(|obs| obs[0]).collect();
        assert_eq!(markers, vec![10.0, 20.0, 30.0]);
        assert_eq!(batch.rewards, vec![1.0; 3]);
        executor.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_after_set_tasks_returns_task_observations() {
        let mut executor = executor(2, 5).await;
        executor
            .set_tasks(Some(vec![Some(1), Some(2)]))
            .await
            .unwrap();

        let observations = executor.reset().await.unwrap();

        assert_eq!(observations[0][0], 1.0);
        assert_eq!(observations[1][0], 2.0);
        executor.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_action_count_is_rejected() {
        let mut executor = executor(2, 5).await;

        let error = executor.step(vec![0]).await.unwrap_err();

        assert!(matches!(error, ExecutorError::ShapeMismatch { expected: 2, actual: 1, .. }));
        executor.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_render_returns_one_frame_per_slot() {
        let mut executor = executor(3, 5).await;

        let frames = executor.render(RenderMode::RgbArray).await.unwrap();

        assert_eq!(frames.len(), 3);
        executor.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_simulator_failure_reports_global_slot() {
        let settings = ExecutorSettings::new(2, 1, 10).with_seed(1);
        let template = CountdownEnv::new(5).failing_for_task(7, 1);
        let mut executor = ParallelExecutor::spawn(&template, settings).await.unwrap();
        executor.set_tasks(Some(vec![None, Some(7)])).await.unwrap();
        executor.reset().await.unwrap();

        let error = executor.step(vec![0, 0]).await.unwrap_err();

        assert!(matches!(error, ExecutorError::Simulator { slot: 1, .. }));
        executor.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_executor_rejects_commands() {
        let mut executor = executor(2, 5).await;
        executor.close().await.unwrap();

        assert!(matches!(executor.reset().await, Err(ExecutorError::Closed)));
        assert!(executor.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_template_level_distribution_reaches_workers() {
        let settings = ExecutorSettings::new(2, 1, 10).with_seed(3);
        let template = CountdownEnv::new(5).with_level_distribution(4);

        let mut executor = ParallelExecutor::spawn(&template, settings).await.unwrap();
        let observations = executor.reset().await.unwrap();

        assert!(observations.iter().all(|obs| obs[2] == 4.0));
        executor.close().await.unwrap();
    }
}
