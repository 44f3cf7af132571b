// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic and operational log line in the crate is produced from a
//! message struct in [`messages`]. Each struct implements `Display` for the
//! human-readable line and [`messages::StructuredLog`] to emit it at its
//! level with structured fields attached.
//!
//! # Usage
//!
//! ```rust
//! use meta_rollout::observability::messages::engine::WorkerSpawned;
//! use meta_rollout::observability::messages::StructuredLog;
//!
//! WorkerSpawned { worker: 0, slots: 1, seed: 42 }.log();
//! ```

pub mod messages;
