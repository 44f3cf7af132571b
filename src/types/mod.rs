// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Value types shared by environments, executors and the sampler.

mod info;
mod step;

pub use info::{stack_info_records, InfoRecord, InfoValue, StackedInfo};
pub use step::{EnvStep, RenderMode, Reward, StepBatch};
