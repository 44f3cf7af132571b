use std::io::Write;

use tempfile::NamedTempFile;

use crate::config::{load_and_validate_config, RuntimeBuilder};
use crate::envs::corridor::{CorridorEnv, HINT_LEFT_INDEX, HINT_RIGHT_INDEX, INSTRUCTION_INDEX};

/// Integration tests building a sampler from a configuration file
#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(yaml.as_bytes()).expect("write config");
        file
    }

    const CORRIDOR: &str = r#"
executor: {executor}
meta_batch_size: 3
rollouts_per_meta_task: 2
max_path_length: 15
seed: 11
sampling:
  random: true
  show_instructions: false
feedback_channels:
  - name: hint
    indices: [1, 2]
instruction_indices: [3]
"#;

    #[tokio::test]
    async fn test_config_builds_working_sampler() {
        for executor in ["parallel", "iterative"] {
            let file = write_config(&CORRIDOR.replace("{executor}", executor));
            let config = load_and_validate_config(file.path()).expect("valid config");

            let mut sampler =
                RuntimeBuilder::build_sampler(&config, CorridorEnv::new(5), config.preprocessor())
                    .await
                    .expect("sampler");
            let batch = sampler
                .obtain_samples(None, &config.sample_options())
                .await
                .expect("samples");

            assert_eq!(batch.total_trajectories(), 6, "{}", executor);
            for (_, trajectories) in batch.iter() {
                assert_eq!(trajectories.len(), 2);
                for trajectory in trajectories {
                    assert!(trajectory.len() <= 15);
                    for observation in &trajectory.observations {
                        // No teacher configured: the hint channel stays masked.
                        assert_eq!(observation[HINT_LEFT_INDEX], 0.0);
                        assert_eq!(observation[HINT_RIGHT_INDEX], 0.0);
                        assert_eq!(observation[INSTRUCTION_INDEX], 0.0);
                    }
                }
            }
            assert_eq!(
                sampler.total_timesteps_sampled(),
                batch.total_timesteps() as u64
            );
            sampler.close().await.expect("close");
        }
    }

    #[tokio::test]
    async fn test_teacher_channel_reaches_policy_inputs() {
        let yaml = CORRIDOR.replace("{executor}", "iterative") + "teacher:\n  collect_with: hint\n";
        let file = write_config(&yaml);
        let config = load_and_validate_config(file.path()).expect("valid config");

        let mut sampler =
            RuntimeBuilder::build_sampler(&config, CorridorEnv::new(5), config.preprocessor())
                .await
                .expect("sampler");
        let batch = sampler
            .obtain_samples(None, &config.sample_options())
            .await
            .expect("samples");

        for (_, trajectories) in batch.iter() {
            for observation in trajectories.iter().flat_map(|t| &t.observations) {
                assert_eq!(observation[HINT_LEFT_INDEX] + observation[HINT_RIGHT_INDEX], 1.0);
            }
        }
    }
}
