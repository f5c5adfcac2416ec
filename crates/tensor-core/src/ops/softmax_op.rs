// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Channel softmax.

use crate::{Tensor, TensorError, TensorView};

/// Softmax over the channel axis of an NCHW tensor, computed
/// independently for every `(batch, y, x)` position.
///
/// Uses the numerically stable variant that subtracts the per-position
/// maximum before exponentiation. For the common classifier head shape
/// `[n, classes, 1, 1]` this reduces to softmax over the class scores.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes differ or the
/// input is not rank 4.
pub fn softmax(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "softmax",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    let (n, c, h, w) = input.shape().nchw_dims().ok_or(TensorError::ShapeMismatch {
        op: "softmax",
        lhs: input.shape().clone(),
        rhs: output.shape().clone(),
    })?;

    if c == 0 {
        return Ok(());
    }

    let src = input.as_slice();
    let dst = output.as_mut_slice();
    let plane = h * w;

    for b in 0..n {
        let batch_off = b * c * plane;
        for pos in 0..plane {
            // Stride through the channel axis at this spatial position.
            let idx = |ch: usize| batch_off + ch * plane + pos;

            let mut max_val = f32::NEG_INFINITY;
            for ch in 0..c {
                max_val = max_val.max(src[idx(ch)]);
            }

            let mut sum = 0.0f32;
            for ch in 0..c {
                let e = (src[idx(ch)] - max_val).exp();
                dst[idx(ch)] = e;
                sum += e;
            }

            if sum > 0.0 {
                let inv = 1.0 / sum;
                for ch in 0..c {
                    dst[idx(ch)] *= inv;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    fn approx_eq(a: &[f32], b: &[f32], tol: f32) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_softmax_uniform() {
        let input =
            Tensor::from_vec(Shape::nchw(1, 4, 1, 1), vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 4, 1, 1));

        softmax(&input.view(), &mut output).unwrap();
        assert!(approx_eq(output.as_slice(), &[0.25; 4], 1e-5));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let input = Tensor::from_vec(
            Shape::nchw(1, 5, 1, 1),
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 5, 1, 1));

        softmax(&input.view(), &mut output).unwrap();
        let sum: f32 = output.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_softmax_monotonic() {
        let input =
            Tensor::from_vec(Shape::nchw(1, 3, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 3, 1, 1));

        softmax(&input.view(), &mut output).unwrap();
        let r = output.as_slice();
        assert!(r[0] < r[1]);
        assert!(r[1] < r[2]);
    }

    #[test]
    fn test_softmax_per_position() {
        // Two spatial positions normalised independently over channels.
        // Position 0 holds [1, 3], position 1 holds [2, 2].
        let input = Tensor::from_vec(
            Shape::nchw(1, 2, 1, 2),
            vec![1.0, 2.0, 3.0, 2.0],
        )
        .unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 2, 1, 2));

        softmax(&input.view(), &mut output).unwrap();
        let r = output.as_slice();
        // Column sums over the channel axis are 1.
        assert!((r[0] + r[2] - 1.0).abs() < 1e-5);
        assert!((r[1] + r[3] - 1.0).abs() < 1e-5);
        // Equal scores at position 1 → 0.5 each.
        assert!((r[1] - 0.5).abs() < 1e-5);
        assert!(r[0] < r[2]);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let input = Tensor::from_vec(
            Shape::nchw(1, 3, 1, 1),
            vec![1000.0, 1001.0, 1002.0],
        )
        .unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 3, 1, 1));

        softmax(&input.view(), &mut output).unwrap();
        let r = output.as_slice();
        let sum: f32 = r.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(r.iter().all(|&x| x.is_finite()));
    }

    #[test]
    fn test_softmax_requires_rank_4() {
        let input = Tensor::zeros(Shape::vector(4));
        let mut output = Tensor::zeros(Shape::vector(4));
        assert!(matches!(
            softmax(&input.view(), &mut output),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }
}
