// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-step diagnostic records reported by environments (`env_info`) and
//! policies (`agent_info`), plus the field-wise stacking applied when a
//! running path is finalized into a trajectory.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A single field inside an info record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InfoValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Vector(Vec<f64>),
    Text(String),
    /// Placeholder for a field that was absent at this step.
    Null,
}

impl InfoValue {
    /// Borrow the value as a float vector, if it is one.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            InfoValue::Vector(values) => Some(values),
            _ => None,
        }
    }
}

impl From<f64> for InfoValue {
    fn from(value: f64) -> Self {
        InfoValue::Float(value)
    }
}

impl From<i64> for InfoValue {
    fn from(value: i64) -> Self {
        InfoValue::Int(value)
    }
}

impl From<bool> for InfoValue {
    fn from(value: bool) -> Self {
        InfoValue::Bool(value)
    }
}

impl From<Vec<f64>> for InfoValue {
    fn from(values: Vec<f64>) -> Self {
        InfoValue::Vector(values)
    }
}

impl From<&str> for InfoValue {
    fn from(value: &str) -> Self {
        InfoValue::Text(value.to_string())
    }
}

/// One step's worth of named diagnostics.
pub type InfoRecord = BTreeMap<String, InfoValue>;

/// Field-wise stacked records: every column has one entry per step.
pub type StackedInfo = BTreeMap<String, Vec<InfoValue>>;

/// Stack a sequence of per-step records into per-field columns.
///
/// The column set is the union of keys seen across all records. A record
/// missing a key contributes `InfoValue::Null` so that every column has
/// exactly `records.len()` entries.
pub fn stack_info_records(records: &[InfoRecord]) -> StackedInfo {
    let keys: BTreeSet<&String> = records.iter().flat_map(|r| r.keys()).collect();

    keys.into_iter()
        .map(|key| {
            let column = records
                .iter()
                .map(|record| record.get(key).cloned().unwrap_or(InfoValue::Null))
                .collect();
            (key.clone(), column)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, InfoValue)]) -> InfoRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_stack_produces_one_entry_per_step() {
        let records = vec![
            record(&[("success", true.into()), ("probs", vec![0.2, 0.8].into())]),
            record(&[("success", false.into()), ("probs", vec![0.6, 0.4].into())]),
            record(&[("success", true.into()), ("probs", vec![0.5, 0.5].into())]),
        ];

        let stacked = stack_info_records(&records);

        assert_eq!(stacked.len(), 2);
        assert_eq!(stacked["success"].len(), 3);
        assert_eq!(stacked["probs"].len(), 3);
        assert_eq!(stacked["probs"][1], InfoValue::Vector(vec![0.6, 0.4]));
    }

    #[test]
    fn test_missing_fields_are_padded_with_null() {
        let records = vec![
            record(&[("a", 1.0.into())]),
            record(&[("b", 2i64.into())]),
        ];

        let stacked = stack_info_records(&records);

        assert_eq!(stacked["a"], vec![InfoValue::Float(1.0), InfoValue::Null]);
        assert_eq!(stacked["b"], vec![InfoValue::Null, InfoValue::Int(2)]);
    }

    #[test]
    fn test_empty_records_stack_to_empty_map() {
        let stacked = stack_info_records(&[InfoRecord::new(), InfoRecord::new()]);
        assert!(stacked.is_empty());
    }

    #[test]
    fn test_vector_view() {
        assert_eq!(InfoValue::Text("x".into()).as_vector(), None);
        assert_eq!(InfoValue::Vector(vec![1.0]).as_vector(), Some(&[1.0][..]));
    }
}
