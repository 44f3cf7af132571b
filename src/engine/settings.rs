// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::errors::ExecutorError;

/// Upper bound (exclusive) for seeds drawn for meta tasks.
pub const SEED_SPACE: usize = 1_000_000;

/// Shape and seeding shared by every executor strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub meta_batch_size: usize,
    pub envs_per_task: usize,
    pub max_path_length: usize,
    /// Base seed for the executor's seed generator. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl ExecutorSettings {
    pub fn new(meta_batch_size: usize, envs_per_task: usize, max_path_length: usize) -> Self {
        Self {
            meta_batch_size,
            envs_per_task,
            max_path_length,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn num_envs(&self) -> usize {
        self.meta_batch_size * self.envs_per_task
    }

    pub(crate) fn check(&self) -> Result<(), ExecutorError> {
        for (what, value) in [
            ("meta_batch_size", self.meta_batch_size),
            ("envs_per_task", self.envs_per_task),
            ("max_path_length", self.max_path_length),
        ] {
            if value == 0 {
                return Err(ExecutorError::ShapeMismatch {
                    what,
                    expected: 1,
                    actual: 0,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Draw `count` distinct seeds from `[0, SEED_SPACE)`.
pub fn draw_seeds(rng: &mut StdRng, count: usize) -> Vec<u64> {
    rand::seq::index::sample(rng, SEED_SPACE, count.min(SEED_SPACE))
        .into_iter()
        .map(|seed| seed as u64)
        .collect()
}
