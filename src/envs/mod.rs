// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bundled environments: a deterministic countdown stub for tests and a
//! small corridor world with a hint channel for the demo binary.

pub mod corridor;
pub mod stub;

pub use corridor::CorridorEnv;
pub use stub::CountdownEnv;
