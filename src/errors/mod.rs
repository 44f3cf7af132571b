// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod sampler;

pub use config::{ConfigError, ValidationError};
pub use execution::{ExecutorError, ProtocolError, SimulatorError};
pub use sampler::{PolicyError, SamplerError};
