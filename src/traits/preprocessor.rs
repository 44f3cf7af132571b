// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::curriculum::EnableMap;

/// Turns raw slot observations into model inputs, applying the active
/// teacher mask.
pub trait ObservationPreprocessor<O>: Send {
    type Output: Clone + Send;

    fn preprocess(
        &self,
        raw: Vec<O>,
        teacher_mask: &EnableMap,
        show_instructions: bool,
    ) -> Vec<Self::Output>;
}

/// Passes observations through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPreprocessor;

impl<O: Clone + Send> ObservationPreprocessor<O> for IdentityPreprocessor {
    type Output = O;

    fn preprocess(&self, raw: Vec<O>, _teacher_mask: &EnableMap, _show_instructions: bool) -> Vec<O> {
        raw
    }
}
