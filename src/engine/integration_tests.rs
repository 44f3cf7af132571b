use crate::config::ExecutorKind;
use crate::engine::{ExecutorFactory, ExecutorSettings};
use crate::envs::corridor::CorridorEnv;
use crate::envs::stub::CountdownEnv;
use crate::errors::ExecutorError;
use crate::types::{InfoValue, RenderMode, StepBatch};

/// Integration tests comparing the two executor strategies through the factory
#[cfg(test)]
mod tests {
    use super::*;

    type CorridorBatch = StepBatch<Vec<f32>>;

    async fn run_corridor(kind: ExecutorKind, steps: usize) -> (Vec<Vec<f32>>, Vec<CorridorBatch>, Vec<String>) {
        let settings = ExecutorSettings::new(3, 1, 12).with_seed(2024);
        let template = CorridorEnv::new(6);
        let mut executor = ExecutorFactory::create(kind, &template, settings)
            .await
            .expect("executor should start");

        executor.set_dropout(0.5).await.unwrap();
        let initial = executor.reset().await.unwrap();

        let mut batches = Vec::with_capacity(steps);
        for step in 0..steps {
            let actions = (0..executor.num_envs())
                .map(|slot| ((step + slot) % 2) as u8)
                .collect();
            batches.push(executor.step(actions).await.unwrap());
        }

        let frames = executor.render(RenderMode::Human).await.unwrap();
        executor.close().await.unwrap();
        (initial, batches, frames)
    }

    #[tokio::test]
    async fn test_parallel_and_iterative_agree() {
        let (parallel_initial, parallel, parallel_frames) = run_corridor(ExecutorKind::Parallel, 40).await;
        let (iterative_initial, iterative, iterative_frames) = run_corridor(ExecutorKind::Iterative, 40).await;

        assert_eq!(parallel_initial, iterative_initial);
        assert_eq!(parallel_frames, iterative_frames);
        for (step, (p, i)) in parallel.iter().zip(&iterative).enumerate() {
            assert_eq!(p.observations, i.observations, "observations differ at step {}", step);
            assert_eq!(p.rewards, i.rewards, "rewards differ at step {}", step);
            assert_eq!(p.dones, i.dones, "dones differ at step {}", step);
        }
    }

    #[tokio::test]
    async fn test_every_slot_finishes_within_path_length() {
        for kind in [ExecutorKind::Parallel, ExecutorKind::Iterative] {
            let (_, batches, _) = run_corridor(kind, 24).await;

            for slot in 0..3 {
                let mut since_done = 0;
                for batch in &batches {
                    since_done += 1;
                    assert_eq!(batch.rewards.len(), 3);
                    if batch.dones[slot] {
                        since_done = 0;
                    }
                    assert!(since_done < 12, "{:?} slot {} ran past the path length", kind, slot);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_set_tasks_then_reset_reports_each_task() {
        for kind in [ExecutorKind::Parallel, ExecutorKind::Iterative] {
            let settings = ExecutorSettings::new(2, 1, 10).with_seed(8);
            let mut executor = ExecutorFactory::create(kind, &CountdownEnv::new(4), settings)
                .await
                .unwrap();

            executor
                .set_tasks(Some(vec![Some(3), Some(8)]))
                .await
                .unwrap();
            let observations = executor.reset().await.unwrap();

            assert_eq!(observations[0][0], 3.0, "{:?}", kind);
            assert_eq!(observations[1][0], 8.0, "{:?}", kind);
            executor.close().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_curriculum_and_level_controls_reach_every_slot() {
        for kind in [ExecutorKind::Parallel, ExecutorKind::Iterative] {
            let settings = ExecutorSettings::new(2, 1, 10).with_seed(8);
            let mut executor = ExecutorFactory::create(kind, &CountdownEnv::new(4), settings)
                .await
                .unwrap();

            executor.set_level_distribution(2).await.unwrap();
            executor.advance_curriculum().await.unwrap();
            let observations = executor.reset().await.unwrap();

            assert!(observations.iter().all(|obs| obs[2] == 3.0), "{:?}", kind);
            executor.close().await.unwrap();
        }
    }

    async fn run_grouped(kind: ExecutorKind, steps: usize) -> (Vec<Vec<f32>>, Vec<StepBatch<Vec<f32>>>) {
        let settings = ExecutorSettings::new(3, 2, 4).with_seed(31);
        let mut executor = ExecutorFactory::create(kind, &CountdownEnv::new(4), settings)
            .await
            .unwrap();

        executor
            .set_tasks(Some(vec![Some(10), Some(20), Some(30)]))
            .await
            .unwrap();
        let initial = executor.reset().await.unwrap();

        let mut batches = Vec::with_capacity(steps);
        for step in 0..steps {
            let actions = (0..executor.num_envs())
                .map(|slot| (100 * step + slot) as u32)
                .collect();
            batches.push(executor.step(actions).await.unwrap());
        }

        executor.close().await.unwrap();
        (initial, batches)
    }

    #[tokio::test]
    async fn test_several_envs_per_task_keep_slot_order() {
        let (parallel_initial, parallel) = run_grouped(ExecutorKind::Parallel, 9).await;
        let (iterative_initial, iterative) = run_grouped(ExecutorKind::Iterative, 9).await;

        let markers: Vec<f32> = parallel_initial.iter().map(|obs| obs[0]).collect();
        assert_eq!(markers, vec![10.0, 10.0, 20.0, 20.0, 30.0, 30.0]);
        assert_eq!(parallel_initial, iterative_initial);

        for (step, (p, i)) in parallel.iter().zip(&iterative).enumerate() {
            assert_eq!(p.observations, i.observations, "observations differ at step {}", step);
            assert_eq!(p.dones, i.dones, "dones differ at step {}", step);

            for (slot, (p_info, i_info)) in p.infos.iter().zip(&i.infos).enumerate() {
                let expected = InfoValue::Int((100 * step + slot) as i64);
                assert_eq!(p_info["action"], expected, "parallel slot {} at step {}", slot, step);
                assert_eq!(i_info["action"], expected, "iterative slot {} at step {}", slot, step);
            }

            let markers: Vec<f32> = p.observations.iter().map(|obs| obs[0]).collect();
            assert_eq!(markers, vec![10.0, 10.0, 20.0, 20.0, 30.0, 30.0]);
        }
    }

    #[tokio::test]
    async fn test_failure_with_several_envs_per_task_reports_global_slot() {
        for kind in [ExecutorKind::Parallel, ExecutorKind::Iterative] {
            let settings = ExecutorSettings::new(3, 2, 10).with_seed(5);
            let template = CountdownEnv::new(5).failing_for_task(20, 1);
            let mut executor = ExecutorFactory::create(kind, &template, settings)
                .await
                .unwrap();
            executor
                .set_tasks(Some(vec![Some(10), Some(20), Some(30)]))
                .await
                .unwrap();
            executor.reset().await.unwrap();

            let error = executor.step(vec![0; 6]).await.unwrap_err();

            assert!(
                matches!(error, ExecutorError::Simulator { slot: 2, .. }),
                "{:?} reported {:?}",
                kind,
                error
            );
            executor.close().await.unwrap();
        }
    }
}
