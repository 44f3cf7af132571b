// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod environment;
pub mod executor;
pub mod policy;
pub mod preprocessor;

pub use environment::Environment;
pub use executor::VecExecutor;
pub use policy::Policy;
pub use preprocessor::{IdentityPreprocessor, ObservationPreprocessor};
