// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{Config, ExecutorKind};
use crate::engine::iterative::IterativeExecutor;
use crate::engine::parallel::ParallelExecutor;
use crate::engine::settings::ExecutorSettings;
use crate::errors::ExecutorError;
use crate::traits::{Environment, VecExecutor};

/// Factory for creating vectorized executors from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create an executor based on the configured strategy
    pub async fn from_config<E: Environment>(
        cfg: &Config,
        template: &E,
    ) -> Result<Box<dyn VecExecutor<Env = E>>, ExecutorError> {
        Self::create(cfg.executor, template, cfg.executor_settings()).await
    }

    pub async fn create<E: Environment>(
        kind: ExecutorKind,
        template: &E,
        settings: ExecutorSettings,
    ) -> Result<Box<dyn VecExecutor<Env = E>>, ExecutorError> {
        let executor: Box<dyn VecExecutor<Env = E>> = match kind {
            ExecutorKind::Parallel => Box::new(ParallelExecutor::spawn(template, settings).await?),
            ExecutorKind::Iterative => Box::new(IterativeExecutor::new(template, settings)?),
        };
        Ok(executor)
    }
}
