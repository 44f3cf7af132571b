pub mod factory;
pub mod iterative;
pub mod parallel;
pub mod protocol;
pub mod settings;
pub(crate) mod slot;
pub(crate) mod worker;
#[cfg(test)]
pub mod integration_tests;

pub use factory::ExecutorFactory;
pub use iterative::IterativeExecutor;
pub use parallel::ParallelExecutor;
pub use settings::{draw_seeds, ExecutorSettings, SEED_SPACE};
