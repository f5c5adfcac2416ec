// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rectified linear activation.

use crate::{Tensor, TensorError, TensorView};

/// Elementwise `max(0, x)`.
///
/// `input` and `output` must have the same shape.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes differ.
pub fn relu(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "relu",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    for (d, &s) in output.as_mut_slice().iter_mut().zip(input.as_slice()) {
        *d = s.max(0.0);
    }

    Ok(())
}
