// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inner product (fully connected) layer.

use crate::{Tensor, TensorError, TensorView};

/// Computes `W·x + b` per batch item.
///
/// - `input` is `[n, ...]`; everything after the batch axis is flattened
///   into a feature vector of length `in_f`.
/// - `weight` is `[out_f, in_f]`.
/// - `bias`, when present, is `[out_f]`.
/// - `output` must be pre-allocated to `[n, out_f, 1, 1]`.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] on any shape disagreement.
pub fn inner_product(
    input: &TensorView<'_>,
    weight: &TensorView<'_>,
    bias: Option<&TensorView<'_>>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let in_dims = input.shape().dims();
    if in_dims.is_empty() {
        return Err(TensorError::ShapeMismatch {
            op: "inner_product",
            lhs: input.shape().clone(),
            rhs: weight.shape().clone(),
        });
    }
    let n = in_dims[0];
    let in_f = if n == 0 { 0 } else { input.num_elements() / n };

    let (out_f, w_in_f) = match *weight.shape().dims() {
        [a, b] => (a, b),
        _ => {
            return Err(TensorError::ShapeMismatch {
                op: "inner_product",
                lhs: weight.shape().clone(),
                rhs: input.shape().clone(),
            })
        }
    };

    if w_in_f != in_f {
        return Err(TensorError::ShapeMismatch {
            op: "inner_product",
            lhs: weight.shape().clone(),
            rhs: input.shape().clone(),
        });
    }

    if let Some(b) = bias {
        if b.shape().dims() != [out_f] {
            return Err(TensorError::ShapeMismatch {
                op: "inner_product",
                lhs: b.shape().clone(),
                rhs: weight.shape().clone(),
            });
        }
    }

    let expected_out = crate::Shape::nchw(n, out_f, 1, 1);
    if output.shape() != &expected_out {
        return Err(TensorError::ShapeMismatch {
            op: "inner_product",
            lhs: expected_out,
            rhs: output.shape().clone(),
        });
    }

    let src = input.as_slice();
    let wts = weight.as_slice();
    let dst = output.as_mut_slice();

    for b in 0..n {
        let x = &src[b * in_f..(b + 1) * in_f];
        for of in 0..out_f {
            let row = &wts[of * in_f..(of + 1) * in_f];
            let mut acc = bias.map(|bv| bv.as_slice()[of]).unwrap_or(0.0);
            for (wv, xv) in row.iter().zip(x) {
                acc += wv * xv;
            }
            dst[b * out_f + of] = acc;
        }
    }

    Ok(())
}
