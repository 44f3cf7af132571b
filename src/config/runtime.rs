// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Config;
use crate::engine::factory::ExecutorFactory;
use crate::errors::SamplerError;
use crate::sampler::MetaSampler;
use crate::traits::{Environment, ObservationPreprocessor};

/// Rollout runtime builder - wires executor and sampler from configuration.
///
/// The `RuntimeBuilder` creates the executor selected by the configuration,
/// populated with clones of the template environment, and hands it to a
/// `MetaSampler` together with the observation preprocessor.
///
/// # Examples
///
/// ```no_run
/// use meta_rollout::config::{load_and_validate_config, RuntimeBuilder};
/// use meta_rollout::envs::CorridorEnv;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_and_validate_config("configs/corridor-parallel.yaml")?;
/// let preprocessor = config.preprocessor();
/// let mut sampler = RuntimeBuilder::build_sampler(&config, CorridorEnv::new(6), preprocessor).await?;
///
/// let batch = sampler.obtain_samples(None, &config.sample_options()).await;
/// sampler.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a ready-to-sample `MetaSampler`.
    ///
    /// # Arguments
    /// * `cfg` - Executor shape, strategy, seed and quota
    /// * `template` - Environment cloned into every slot
    /// * `preprocessor` - Transform applied to raw observations before the policy
    pub async fn build_sampler<E, P>(
        cfg: &Config,
        template: E,
        preprocessor: P,
    ) -> Result<MetaSampler<E, P>, SamplerError>
    where
        E: Environment,
        P: ObservationPreprocessor<E::Observation>,
    {
        let executor = ExecutorFactory::from_config(cfg, &template).await?;
        MetaSampler::new(
            executor,
            preprocessor,
            template,
            cfg.rollouts_per_meta_task,
            cfg.seed,
        )
    }
}
