// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // config loading, validation, runtime wiring
pub mod curriculum; // teacher channels and schedules
pub mod engine;     // vectorized executors and worker protocol
pub mod envs;       // bundled environments
pub mod errors;     // error handling
pub mod observability;
pub mod sampler;    // meta sampler and trajectories
pub mod traits;     // unified abstractions
pub mod types;      // step, reward and info values
