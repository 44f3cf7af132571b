// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::PolicyError;
use crate::types::InfoRecord;

/// Action source consumed by the meta sampler.
///
/// `I` is the preprocessed model input for one slot, `A` the environment's
/// action type.
pub trait Policy<I, A> {
    /// Clear recurrent state for the slots flagged in `dones`.
    fn reset(&mut self, dones: &[bool]);

    /// One action and one agent-info record per observation.
    fn get_actions(
        &mut self,
        observations: &[I],
        temperature: f64,
    ) -> Result<(Vec<A>, Vec<InfoRecord>), PolicyError>;
}
