// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for meta batch collection.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Collection of a meta batch began.
///
/// # Log Level
/// `info!`
pub struct SamplingStarted<'a> {
    pub strategy: &'a str,
    pub meta_batch_size: usize,
    pub rollouts_per_meta_task: usize,
    pub random: bool,
}

impl Display for SamplingStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Collecting {} rollout(s) for each of {} task(s) via {} executor{}",
            self.rollouts_per_meta_task,
            self.meta_batch_size,
            self.strategy,
            if self.random { " (random actions)" } else { "" }
        )
    }
}

impl StructuredLog for SamplingStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            meta_batch_size = self.meta_batch_size,
            rollouts_per_meta_task = self.rollouts_per_meta_task,
            random = self.random,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "sampling",
            span_name = name,
            strategy = self.strategy,
            meta_batch_size = self.meta_batch_size,
            rollouts_per_meta_task = self.rollouts_per_meta_task,
        )
    }
}

/// A running path was finalized into a trajectory.
///
/// # Log Level
/// `debug!`
pub struct TrajectoryFinalized {
    pub slot: usize,
    pub task: usize,
    pub length: usize,
    pub completed: usize,
    pub total: usize,
}

impl Display for TrajectoryFinalized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Slot {} finished a {}-step trajectory for task {} ({}/{})",
            self.slot, self.length, self.task, self.completed, self.total
        )
    }
}

impl StructuredLog for TrajectoryFinalized {
    fn log(&self) {
        tracing::debug!(
            slot = self.slot,
            task = self.task,
            length = self.length,
            completed = self.completed,
            total = self.total,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "trajectory",
            span_name = name,
            slot = self.slot,
            task = self.task,
            length = self.length,
        )
    }
}

/// A slot finished an episode for a task whose quota is already full.
///
/// # Log Level
/// `trace!`
pub struct CompletionDropped {
    pub slot: usize,
    pub task: usize,
    pub length: usize,
}

impl Display for CompletionDropped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropped {}-step episode from slot {}: task {} quota already met",
            self.length, self.slot, self.task
        )
    }
}

impl StructuredLog for CompletionDropped {
    fn log(&self) {
        tracing::trace!(
            slot = self.slot,
            task = self.task,
            length = self.length,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "completion_dropped",
            span_name = name,
            slot = self.slot,
            task = self.task,
        )
    }
}

/// Meta batch collected.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use meta_rollout::observability::messages::sampler::SamplingCompleted;
/// use std::time::Duration;
///
/// let msg = SamplingCompleted {
///     prefix: "train/",
///     trajectories: 8,
///     timesteps: 120,
///     policy_time: Duration::from_millis(30),
///     env_time: Duration::from_millis(70),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SamplingCompleted<'a> {
    pub prefix: &'a str,
    pub trajectories: usize,
    pub timesteps: u64,
    pub policy_time: Duration,
    pub env_time: Duration,
}

impl Display for SamplingCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}Collected {} trajectories ({} timesteps): PolicyExecTime={:?} EnvExecTime={:?}",
            self.prefix, self.trajectories, self.timesteps, self.policy_time, self.env_time
        )
    }
}

impl StructuredLog for SamplingCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            prefix = self.prefix,
            trajectories = self.trajectories,
            timesteps = self.timesteps,
            policy_time_ms = self.policy_time.as_millis() as u64,
            env_time_ms = self.env_time.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "sampling_completed",
            span_name = name,
            trajectories = self.trajectories,
            timesteps = self.timesteps,
            policy_time = ?self.policy_time,
            env_time = ?self.env_time,
        )
    }
}
