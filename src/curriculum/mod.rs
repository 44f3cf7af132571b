// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Teacher/feedback channel vocabulary shared by the schedule, the
//! observation mask and configuration.
//!
//! The engine never decides which channels are active. A [`TeacherSchedule`]
//! computes an [`EnableMap`] outside the engine and the sampler only feeds
//! that map into observation preprocessing.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Level value asking a schedule for the shape of its maps only.
pub const SHAPE_ONLY_LEVEL: i32 = -1;

/// One named auxiliary signal embedded in the observation vector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedbackChannel {
    pub name: String,
    /// Observation indices carrying this channel.
    pub indices: Vec<usize>,
    /// Value written to masked indices.
    #[serde(default)]
    pub null_value: f32,
}

/// Channel name -> "currently enabled" flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnableMap(pub BTreeMap<String, bool>);

impl EnableMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Map with every named channel disabled.
    pub fn all_disabled<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self(names.into_iter().map(|n| (n.to_string(), false)).collect())
    }

    /// Map enabling exactly `enabled` (if given) among `names`.
    pub fn only<'a>(names: impl IntoIterator<Item = &'a str>, enabled: Option<&str>) -> Self {
        Self(
            names
                .into_iter()
                .map(|n| (n.to_string(), Some(n) == enabled))
                .collect(),
        )
    }

    /// Unknown channels count as disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, on)| **on).map(|(n, _)| n.as_str())
    }
}

impl From<BTreeMap<String, bool>> for EnableMap {
    fn from(map: BTreeMap<String, bool>) -> Self {
        Self(map)
    }
}

/// Output of a schedule: which channels to collect with and which to distill
/// toward.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutput {
    pub train: EnableMap,
    /// `None` only for [`SHAPE_ONLY_LEVEL`].
    pub distill: Option<EnableMap>,
}

/// Contract for curriculum/teacher schedules.
///
/// Implementations are pure functions of their inputs. Calling with
/// `level == SHAPE_ONLY_LEVEL` must return the all-false train map and
/// `distill == None`.
pub trait TeacherSchedule {
    fn schedule(&self, level: i32, success_rate: f64, accuracy_rate: f64) -> ScheduleOutput;
}

/// Collects with one named channel and distills toward one named channel at
/// every level.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchedule {
    channels: Vec<String>,
    collect_with: Option<String>,
    distill_to: Option<String>,
}

impl FixedSchedule {
    pub fn new(
        channels: Vec<String>,
        collect_with: Option<String>,
        distill_to: Option<String>,
    ) -> Self {
        Self {
            channels,
            collect_with,
            distill_to,
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }
}

impl TeacherSchedule for FixedSchedule {
    fn schedule(&self, level: i32, _success_rate: f64, _accuracy_rate: f64) -> ScheduleOutput {
        if level == SHAPE_ONLY_LEVEL {
            return ScheduleOutput {
                train: EnableMap::all_disabled(self.names()),
                distill: None,
            };
        }
        ScheduleOutput {
            train: EnableMap::only(self.names(), self.collect_with.as_deref()),
            distill: Some(EnableMap::only(self.names(), self.distill_to.as_deref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> FixedSchedule {
        FixedSchedule::new(
            vec!["direction".into(), "subgoal".into()],
            Some("direction".into()),
            Some("subgoal".into()),
        )
    }

    #[test]
    fn test_shape_only_level_returns_all_false_and_no_distill() {
        let out = schedule().schedule(SHAPE_ONLY_LEVEL, 0.0, 0.0);

        assert_eq!(out.train.0.len(), 2);
        assert!(out.train.0.values().all(|on| !on));
        assert!(out.distill.is_none());
    }

    #[test]
    fn test_fixed_schedule_enables_named_channels() {
        let out = schedule().schedule(3, 0.9, 0.9);

        assert!(out.train.is_enabled("direction"));
        assert!(!out.train.is_enabled("subgoal"));
        let distill = out.distill.unwrap();
        assert!(distill.is_enabled("subgoal"));
        assert!(!distill.is_enabled("direction"));
    }

    #[test]
    fn test_unknown_channel_is_disabled() {
        let map = EnableMap::all_disabled(["a"]);
        assert!(!map.is_enabled("missing"));
        assert_eq!(map.enabled().count(), 0);
    }
}
