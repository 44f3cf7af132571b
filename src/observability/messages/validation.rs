// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation failures.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration failed validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ConfigValidationFailed<'a> {
    pub source: &'a str,
    pub errors: &'a [ValidationError],
}

impl Display for ConfigValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration '{}' failed validation with {} error(s)",
            self.source,
            self.errors.len()
        )?;
        for error in self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl StructuredLog for ConfigValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            source = self.source,
            error_count = self.errors.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "config_validation",
            name = name,
            source = self.source,
            error_count = self.errors.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_error() {
        let errors = vec![
            ValidationError::ZeroSize { field: "meta_batch_size" },
            ValidationError::DuplicateChannel { name: "direction".into() },
        ];
        let msg = ConfigValidationFailed {
            source: "run.yaml",
            errors: &errors,
        };

        let text = msg.to_string();
        assert!(text.contains("2 error(s)"));
        assert!(text.contains("'meta_batch_size' must be at least 1"));
        assert!(text.contains("Duplicate feedback channel: 'direction'"));
    }
}
