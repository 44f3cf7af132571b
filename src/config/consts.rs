/// Environments per meta task; the sampler supports exactly one
pub const DEFAULT_ENVS_PER_TASK: usize = 1;
/// Policy sampling temperature when none is configured
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
/// Instructions are visible to the policy unless configured otherwise
pub const DEFAULT_SHOW_INSTRUCTIONS: bool = true;
/// Curriculum level used to derive the initial teacher mask
pub const INITIAL_LEVEL: i32 = 0;
/// Configuration loaded by the binary when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "configs/corridor-parallel.yaml";
