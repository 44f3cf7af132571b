// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod masking;
pub mod meta_sampler;
pub mod path;

pub use masking::{mask_teacher, TeacherMaskPreprocessor};
pub use meta_sampler::{MetaSampler, SampleOptions, SampledBatch, SamplingTiming};
pub use path::{MetaBatch, RunningPath, Trajectory};
