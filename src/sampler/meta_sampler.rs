// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::curriculum::EnableMap;
use crate::errors::SamplerError;
use crate::observability::messages::sampler::{
    CompletionDropped, SamplingCompleted, SamplingStarted, TrajectoryFinalized,
};
use crate::observability::messages::StructuredLog;
use crate::sampler::path::{MetaBatch, RunningPath};
use crate::traits::{Environment, ObservationPreprocessor, Policy, VecExecutor};
use crate::types::{InfoRecord, InfoValue, StepBatch};

/// Agent-info key holding recurrent state; never stored in trajectories.
pub const MEMORY_KEY: &str = "memory";
/// Agent-info key holding action probabilities, read in greedy mode.
pub const PROBS_KEY: &str = "probs";
pub const MEAN_KEY: &str = "mean";
pub const LOG_STD_KEY: &str = "log_std";

/// Per-call sampling switches.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    /// Sample uniformly random actions instead of querying the policy.
    pub random: bool,
    /// Replace policy actions with the argmax of their `probs` agent info.
    pub greedy: bool,
    /// Advance every slot's curriculum before resetting.
    pub advance_curriculum: bool,
    /// Active teacher channels; disabled ones are masked out of observations.
    pub teacher_mask: EnableMap,
    pub show_instructions: bool,
    pub temperature: f64,
    /// Log a `SamplingCompleted` summary when the call finishes.
    pub log: bool,
    pub log_prefix: String,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            random: false,
            greedy: false,
            advance_curriculum: false,
            teacher_mask: EnableMap::new(),
            show_instructions: true,
            temperature: 1.0,
            log: false,
            log_prefix: String::new(),
        }
    }
}

/// Wall time spent in the policy versus the environments during one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SamplingTiming {
    pub policy_time: Duration,
    pub env_time: Duration,
}

/// Trajectories produced by a sampler over environment `E` with
/// preprocessor `P`.
pub type SampledBatch<E, P> = MetaBatch<
    <P as ObservationPreprocessor<<E as Environment>::Observation>>::Output,
    <E as Environment>::Action,
>;

/// Collects a fixed number of completed trajectories per meta task.
///
/// Every call to [`MetaSampler::obtain_samples`] resets all slots and steps
/// them until each meta task owns exactly `rollouts_per_meta_task` finished
/// trajectories. A slot whose task already met its quota keeps running, but
/// the episodes it finishes are discarded.
pub struct MetaSampler<E, P>
where
    E: Environment,
    P: ObservationPreprocessor<E::Observation>,
{
    executor: Box<dyn VecExecutor<Env = E>>,
    preprocessor: P,
    action_space: E,
    rollouts_per_meta_task: usize,
    rng: StdRng,
    total_timesteps_sampled: u64,
    last_timing: Option<SamplingTiming>,
}

impl<E, P> MetaSampler<E, P>
where
    E: Environment,
    P: ObservationPreprocessor<E::Observation>,
{
    /// `action_space` is consulted for random and greedy actions only; it is
    /// never stepped.
    pub fn new(
        executor: Box<dyn VecExecutor<Env = E>>,
        preprocessor: P,
        action_space: E,
        rollouts_per_meta_task: usize,
        seed: Option<u64>,
    ) -> Result<Self, SamplerError> {
        if executor.envs_per_task() != 1 {
            return Err(SamplerError::Precondition(format!(
                "envs_per_task must be 1, got {}",
                executor.envs_per_task()
            )));
        }
        if rollouts_per_meta_task == 0 {
            return Err(SamplerError::Precondition(
                "rollouts_per_meta_task must be at least 1".to_string(),
            ));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            executor,
            preprocessor,
            action_space,
            rollouts_per_meta_task,
            rng,
            total_timesteps_sampled: 0,
            last_timing: None,
        })
    }

    /// Collect `rollouts_per_meta_task` trajectories for every meta task.
    ///
    /// `policy` may be `None` only in random mode. Any executor or policy
    /// failure aborts the call; trajectories gathered so far are dropped.
    pub async fn obtain_samples(
        &mut self,
        mut policy: Option<&mut dyn Policy<P::Output, E::Action>>,
        options: &SampleOptions,
    ) -> Result<SampledBatch<E, P>, SamplerError> {
        if !options.random && policy.is_none() {
            return Err(SamplerError::MissingPolicy);
        }

        let meta_batch_size = self.executor.meta_batch_size();
        let envs_per_task = self.executor.envs_per_task();
        let num_envs = self.executor.num_envs();
        let quota = self.rollouts_per_meta_task;
        let target = quota * meta_batch_size;

        SamplingStarted {
            strategy: self.executor.name(),
            meta_batch_size,
            rollouts_per_meta_task: quota,
            random: options.random,
        }
        .log();

        let mut paths = MetaBatch::with_tasks(meta_batch_size);
        let mut running: Vec<RunningPath<P::Output, E::Action>> =
            (0..num_envs).map(|_| RunningPath::new()).collect();
        let mut timing = SamplingTiming::default();
        let mut timesteps = 0u64;

        if let Some(policy) = policy.as_deref_mut() {
            policy.reset(&vec![true; meta_batch_size]);
        }
        if options.advance_curriculum {
            self.executor.advance_curriculum().await?;
        }
        let mut observations = self.executor.reset().await?;

        while paths.total_trajectories() < target {
            let started = Instant::now();
            let inputs = self.preprocessor.preprocess(
                observations,
                &options.teacher_mask,
                options.show_instructions,
            );
            ensure_len("model inputs", num_envs, inputs.len())?;
            let (actions, agent_infos) =
                self.select_actions(policy.as_deref_mut(), &inputs, options)?;
            timing.policy_time += started.elapsed();

            let started = Instant::now();
            let StepBatch {
                observations: next,
                rewards,
                dones,
                infos,
            } = self.executor.step(actions.clone()).await?;
            timing.env_time += started.elapsed();

            let steps = inputs
                .into_iter()
                .zip(actions)
                .zip(rewards)
                .zip(dones)
                .zip(infos)
                .zip(agent_infos);
            for (slot, (((((input, action), reward), done), env_info), mut agent_info)) in
                steps.enumerate()
            {
                agent_info.remove(MEMORY_KEY);
                let path = &mut running[slot];
                path.push(input, action, reward, done, env_info, agent_info);
                if !done {
                    continue;
                }

                let task = slot / envs_per_task;
                if paths.completed(task) >= quota {
                    CompletionDropped {
                        slot,
                        task,
                        length: path.len(),
                    }
                    .log();
                    path.clear();
                    continue;
                }

                let trajectory = path.finalize();
                timesteps += trajectory.len() as u64;
                TrajectoryFinalized {
                    slot,
                    task,
                    length: trajectory.len(),
                    completed: paths.completed(task) + 1,
                    total: quota,
                }
                .log();
                paths.push(task, trajectory);
            }

            observations = next;
        }

        self.total_timesteps_sampled += timesteps;
        self.last_timing = Some(timing);

        if options.log {
            SamplingCompleted {
                prefix: &options.log_prefix,
                trajectories: paths.total_trajectories(),
                timesteps,
                policy_time: timing.policy_time,
                env_time: timing.env_time,
            }
            .log();
        }

        Ok(paths)
    }

    /// Re-assign "no task" to every meta task.
    pub async fn update_tasks(&mut self) -> Result<(), SamplerError> {
        let tasks = vec![None; self.executor.meta_batch_size()];
        self.executor.set_tasks(Some(tasks)).await?;
        Ok(())
    }

    pub async fn advance_curriculum(&mut self) -> Result<(), SamplerError> {
        self.executor.advance_curriculum().await?;
        Ok(())
    }

    /// Timesteps recorded in returned trajectories across all calls.
    pub fn total_timesteps_sampled(&self) -> u64 {
        self.total_timesteps_sampled
    }

    /// Timing split of the most recent successful call.
    pub fn last_timing(&self) -> Option<SamplingTiming> {
        self.last_timing
    }

    /// Direct access to the executor, e.g. for seeding or dropout control.
    pub fn executor_mut(&mut self) -> &mut dyn VecExecutor<Env = E> {
        self.executor.as_mut()
    }

    pub async fn close(&mut self) -> Result<(), SamplerError> {
        self.executor.close().await?;
        Ok(())
    }

    fn select_actions(
        &mut self,
        policy: Option<&mut (dyn Policy<P::Output, E::Action> + '_)>,
        inputs: &[P::Output],
        options: &SampleOptions,
    ) -> Result<(Vec<E::Action>, Vec<InfoRecord>), SamplerError> {
        let count = inputs.len();

        if options.random {
            let actions = (0..count)
                .map(|_| self.action_space.sample_action(&mut self.rng))
                .collect();
            let dim = self.action_space.action_dim();
            let infos = (0..count).map(|_| zero_agent_info(dim)).collect();
            return Ok((actions, infos));
        }

        let policy = policy.ok_or(SamplerError::MissingPolicy)?;
        let (actions, infos) = policy.get_actions(inputs, options.temperature)?;
        ensure_len("policy actions", count, actions.len())?;
        ensure_len("policy agent infos", count, infos.len())?;

        if !options.greedy {
            return Ok((actions, infos));
        }

        let actions = infos
            .iter()
            .enumerate()
            .map(|(slot, info)| self.greedy_action(slot, info))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((actions, infos))
    }

    fn greedy_action(&self, slot: usize, info: &InfoRecord) -> Result<E::Action, SamplerError> {
        let probs = info
            .get(PROBS_KEY)
            .and_then(InfoValue::as_vector)
            .ok_or(SamplerError::GreedyUnsupported {
                slot,
                reason: "agent info has no probs vector",
            })?;
        let index = argmax(probs).ok_or(SamplerError::GreedyUnsupported {
            slot,
            reason: "probs vector is empty",
        })?;
        self.action_space
            .action_from_index(index)
            .ok_or(SamplerError::GreedyUnsupported {
                slot,
                reason: "environment has no action for the argmax index",
            })
    }
}

fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<(), SamplerError> {
    if expected != actual {
        return Err(SamplerError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Index of the largest value; ties resolve to the first.
fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, &value)| match best {
            Some((_, top)) if top >= value => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}

fn zero_agent_info(dim: usize) -> InfoRecord {
    InfoRecord::from([
        (MEAN_KEY.to_string(), InfoValue::Vector(vec![0.0; dim])),
        (LOG_STD_KEY.to_string(), InfoValue::Vector(vec![0.0; dim])),
    ])
}
