// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::curriculum::{EnableMap, FeedbackChannel};
use crate::traits::ObservationPreprocessor;

/// Overwrite the indices of every channel not enabled in `mask` with the
/// channel's null value. Indices past the end of `observation` are ignored.
pub fn mask_teacher(observation: &mut [f32], channels: &[FeedbackChannel], mask: &EnableMap) {
    for channel in channels.iter().filter(|channel| !mask.is_enabled(&channel.name)) {
        for &index in &channel.indices {
            if let Some(value) = observation.get_mut(index) {
                *value = channel.null_value;
            }
        }
    }
}

/// Preprocessor for flat `f32` observations that applies the teacher mask
/// and optionally hides instruction indices.
#[derive(Debug, Clone, Default)]
pub struct TeacherMaskPreprocessor {
    channels: Vec<FeedbackChannel>,
    instruction_indices: Vec<usize>,
}

impl TeacherMaskPreprocessor {
    pub fn new(channels: Vec<FeedbackChannel>, instruction_indices: Vec<usize>) -> Self {
        Self {
            channels,
            instruction_indices,
        }
    }
}

impl ObservationPreprocessor<Vec<f32>> for TeacherMaskPreprocessor {
    type Output = Vec<f32>;

    fn preprocess(
        &self,
        raw: Vec<Vec<f32>>,
        teacher_mask: &EnableMap,
        show_instructions: bool,
    ) -> Vec<Vec<f32>> {
        raw.into_iter()
            .map(|mut observation| {
                mask_teacher(&mut observation, &self.channels, teacher_mask);
                if !show_instructions {
                    for &index in &self.instruction_indices {
                        if let Some(value) = observation.get_mut(index) {
                            *value = 0.0;
                        }
                    }
                }
                observation
            })
            .collect()
    }
}
