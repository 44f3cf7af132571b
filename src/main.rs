// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use meta_rollout::config::consts::DEFAULT_CONFIG_PATH;
use meta_rollout::config::{load_and_validate_config, RuntimeBuilder};
use meta_rollout::curriculum::FeedbackChannel;
use meta_rollout::envs::corridor::{CorridorEnv, MOVE_LEFT, MOVE_RIGHT};
use meta_rollout::errors::PolicyError;
use meta_rollout::sampler::meta_sampler::PROBS_KEY;
use meta_rollout::traits::Policy;
use meta_rollout::types::{InfoRecord, InfoValue};

/// Corridor length at curriculum level 0
const CORRIDOR_LENGTH: usize = 6;
/// Probability mass the policy puts on the hinted direction
const HINT_CONFIDENCE: f64 = 0.9;

/// Follows the teacher hint when it is visible and guesses otherwise.
struct HintFollower {
    rng: StdRng,
    hint: FeedbackChannel,
}

impl HintFollower {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            hint: CorridorEnv::hint_channel(),
        }
    }

    fn probabilities(&self, observation: &[f32], temperature: f64) -> [f64; 2] {
        let hint: Vec<f32> = self
            .hint
            .indices
            .iter()
            .map(|&index| observation.get(index).copied().unwrap_or(self.hint.null_value))
            .collect();
        let [left, right] = hint.as_slice() else {
            return [0.5, 0.5];
        };
        let confident = if left > right {
            [HINT_CONFIDENCE, 1.0 - HINT_CONFIDENCE]
        } else if right > left {
            [1.0 - HINT_CONFIDENCE, HINT_CONFIDENCE]
        } else {
            return [0.5, 0.5];
        };

        // Temperature flattens (> 1) or sharpens (< 1) the distribution.
        let weights = confident.map(|p| p.powf(1.0 / temperature));
        let total: f64 = weights.iter().sum();
        weights.map(|w| w / total)
    }
}

impl Policy<Vec<f32>, u8> for HintFollower {
    fn reset(&mut self, _dones: &[bool]) {}

    fn get_actions(
        &mut self,
        observations: &[Vec<f32>],
        temperature: f64,
    ) -> Result<(Vec<u8>, Vec<InfoRecord>), PolicyError> {
        if temperature <= 0.0 {
            return Err(PolicyError::new("temperature must be positive"));
        }

        let mut actions = Vec::with_capacity(observations.len());
        let mut infos = Vec::with_capacity(observations.len());
        for observation in observations {
            let probs = self.probabilities(observation, temperature);
            let action = if self.rng.random::<f64>() < probs[0] {
                MOVE_LEFT
            } else {
                MOVE_RIGHT
            };
            actions.push(action);
            infos.push(InfoRecord::from([(
                PROBS_KEY.to_string(),
                InfoValue::Vector(probs.to_vec()),
            )]));
        }
        Ok((actions, infos))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("meta_rollout=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config_files: Vec<&str> = if args.len() > 1 {
        args[1..].iter().map(String::as_str).collect()
    } else {
        vec![DEFAULT_CONFIG_PATH]
    };

    for config_file in config_files {
        run_single_config(config_file)
            .await
            .with_context(|| format!("Failed to run {}", config_file))?;
    }

    Ok(())
}

async fn run_single_config(config_file: &str) -> Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(config_file)?;
    let options = config.sample_options();
    let mut sampler = RuntimeBuilder::build_sampler(
        &config,
        CorridorEnv::new(CORRIDOR_LENGTH),
        config.preprocessor(),
    )
    .await?;
    let mut policy = HintFollower::new(config.seed.unwrap_or_default());

    let batch = sampler.obtain_samples(Some(&mut policy), &options).await;
    // Close the executor even when sampling failed.
    sampler.close().await?;
    let batch = batch?;

    let tasks: Vec<_> = batch
        .iter()
        .map(|(task, trajectories)| {
            json!({
                "task": task,
                "lengths": trajectories.iter().map(|t| t.len()).collect::<Vec<_>>(),
                "returns": trajectories.iter().map(|t| t.total_reward()).collect::<Vec<_>>(),
            })
        })
        .collect();

    let summary = json!({
        "config": config_file,
        "executor": format!("{:?}", config.executor).to_lowercase(),
        "meta_batch_size": config.meta_batch_size,
        "trajectories": batch.total_trajectories(),
        "timesteps": sampler.total_timesteps_sampled(),
        "timing": sampler.last_timing(),
        "teacher": options.teacher_mask.enabled().collect::<Vec<_>>(),
        "tasks": tasks,
        "elapsed": start_time.elapsed(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
