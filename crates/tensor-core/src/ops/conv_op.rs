// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! 2-D convolution.

use crate::{Tensor, TensorError, TensorView};

/// Output spatial extent of a convolution along one axis, or `None` if
/// the kernel does not fit the padded input.
///
/// Uses floor division: `(dim + 2*pad - kernel) / stride + 1`.
pub fn conv_out_dim(dim: usize, kernel: usize, stride: usize, pad: usize) -> Option<usize> {
    if stride == 0 || kernel == 0 {
        return None;
    }
    let padded = dim + 2 * pad;
    if padded < kernel {
        return None;
    }
    Some((padded - kernel) / stride + 1)
}

/// Direct 2-D convolution over an NCHW input.
///
/// - `input` is `[n, in_c, h, w]`.
/// - `weight` is `[out_c, in_c, kh, kw]` with `kh == kw` (square kernels).
/// - `bias`, when present, is `[out_c]`.
/// - `output` must be pre-allocated to `[n, out_c, oh, ow]` where the
///   spatial extents follow [`conv_out_dim`].
///
/// Padding is implicit zeros: out-of-range taps contribute nothing.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if any shape disagrees and
/// [`TensorError::InvalidGeometry`] if the kernel does not fit.
pub fn conv2d(
    input: &TensorView<'_>,
    weight: &TensorView<'_>,
    bias: Option<&TensorView<'_>>,
    stride: usize,
    pad: usize,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let (n, in_c, h, w) = input.shape().nchw_dims().ok_or(TensorError::ShapeMismatch {
        op: "conv2d",
        lhs: input.shape().clone(),
        rhs: output.shape().clone(),
    })?;

    let wdims = weight.shape().dims();
    let (out_c, w_in_c, kh, kw) = match *wdims {
        [a, b, c, d] => (a, b, c, d),
        _ => {
            return Err(TensorError::ShapeMismatch {
                op: "conv2d",
                lhs: weight.shape().clone(),
                rhs: input.shape().clone(),
            })
        }
    };

    if w_in_c != in_c || kh != kw {
        return Err(TensorError::ShapeMismatch {
            op: "conv2d",
            lhs: weight.shape().clone(),
            rhs: input.shape().clone(),
        });
    }

    if let Some(b) = bias {
        if b.shape().dims() != [out_c] {
            return Err(TensorError::ShapeMismatch {
                op: "conv2d",
                lhs: b.shape().clone(),
                rhs: weight.shape().clone(),
            });
        }
    }

    let oh = conv_out_dim(h, kh, stride, pad).ok_or_else(|| TensorError::InvalidGeometry {
        op: "conv2d",
        detail: format!("kernel {kh} (stride {stride}, pad {pad}) does not fit height {h}"),
    })?;
    let ow = conv_out_dim(w, kw, stride, pad).ok_or_else(|| TensorError::InvalidGeometry {
        op: "conv2d",
        detail: format!("kernel {kw} (stride {stride}, pad {pad}) does not fit width {w}"),
    })?;

    let expected_out = crate::Shape::nchw(n, out_c, oh, ow);
    if output.shape() != &expected_out {
        return Err(TensorError::ShapeMismatch {
            op: "conv2d",
            lhs: expected_out,
            rhs: output.shape().clone(),
        });
    }

    let src = input.as_slice();
    let wts = weight.as_slice();
    let dst = output.as_mut_slice();

    for b in 0..n {
        for oc in 0..out_c {
            let bias_val = bias.map(|bv| bv.as_slice()[oc]).unwrap_or(0.0);
            for oy in 0..oh {
                for ox in 0..ow {
                    let mut acc = bias_val;
                    for ic in 0..in_c {
                        let src_plane = (b * in_c + ic) * h * w;
                        let wt_plane = ((oc * in_c) + ic) * kh * kw;
                        for ky in 0..kh {
                            // Signed arithmetic: the padded origin can be negative.
                            let iy = (oy * stride + ky) as isize - pad as isize;
                            if iy < 0 || iy >= h as isize {
                                continue;
                            }
                            for kx in 0..kw {
                                let ix = (ox * stride + kx) as isize - pad as isize;
                                if ix < 0 || ix >= w as isize {
                                    continue;
                                }
                                acc += src[src_plane + iy as usize * w + ix as usize]
                                    * wts[wt_plane + ky * kw + kx];
                            }
                        }
                    }
                    dst[((b * out_c + oc) * oh + oy) * ow + ox] = acc;
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

    #[test]
    fn test_conv_out_dim() {
        // 32x32, 5x5 kernel, stride 1, pad 2 → 32 (same padding).
        assert_eq!(conv_out_dim(32, 5, 1, 2), Some(32));
        // 32x32, 5x5 kernel, stride 1, no pad → 28.
        assert_eq!(conv_out_dim(32, 5, 1, 0), Some(28));
        // 227, 11, stride 4 → 55 (AlexNet conv1).
        assert_eq!(conv_out_dim(227, 11, 4, 0), Some(55));
        // Kernel larger than padded input.
        assert_eq!(conv_out_dim(3, 5, 1, 0), None);
        // Degenerate stride.
        assert_eq!(conv_out_dim(8, 3, 0, 0), None);
    }

    #[test]
    fn test_identity_kernel() {
        // 1x1 kernel with weight 1.0 copies the input.
        let input =
            Tensor::from_vec(Shape::nchw(1, 1, 2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let weight = Tensor::from_vec(Shape::new(vec![1, 1, 1, 1]), vec![1.0]).unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 1, 2, 2));

        conv2d(&input.view(), &weight.view(), None, 1, 0, &mut output).unwrap();
        assert_eq!(output.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sum_kernel() {
        // 2x2 all-ones kernel, stride 1 → sliding-window sums.
        let input = Tensor::from_vec(
            Shape::nchw(1, 1, 3, 3),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        )
        .unwrap();
        let weight = Tensor::from_vec(Shape::new(vec![1, 1, 2, 2]), vec![1.0; 4]).unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 1, 2, 2));

        conv2d(&input.view(), &weight.view(), None, 1, 0, &mut output).unwrap();
        assert_eq!(output.as_slice(), &[12.0, 16.0, 24.0, 28.0]);
    }

    #[test]
    fn test_bias_added() {
        let input = Tensor::from_vec(Shape::nchw(1, 1, 1, 1), vec![2.0]).unwrap();
        let weight = Tensor::from_vec(Shape::new(vec![1, 1, 1, 1]), vec![3.0]).unwrap();
        let bias = Tensor::from_vec(Shape::vector(1), vec![0.5]).unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 1, 1, 1));

        conv2d(
            &input.view(),
            &weight.view(),
            Some(&bias.view()),
            1,
            0,
            &mut output,
        )
        .unwrap();
        assert_eq!(output.as_slice(), &[6.5]);
    }

    #[test]
    fn test_zero_padding() {
        // 3x3 ones kernel with pad 1: corner windows see only 4 valid taps.
        let input = Tensor::from_vec(Shape::nchw(1, 1, 2, 2), vec![1.0; 4]).unwrap();
        let weight = Tensor::from_vec(Shape::new(vec![1, 1, 3, 3]), vec![1.0; 9]).unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 1, 2, 2));

        conv2d(&input.view(), &weight.view(), None, 1, 1, &mut output).unwrap();
        assert_eq!(output.as_slice(), &[4.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_multi_channel_accumulation() {
        // Two input channels summed by a 1x1 kernel with weights [1, 10].
        let input = Tensor::from_vec(
            Shape::nchw(1, 2, 1, 2),
            vec![1.0, 2.0, 3.0, 4.0], // ch0: [1, 2], ch1: [3, 4]
        )
        .unwrap();
        let weight = Tensor::from_vec(Shape::new(vec![1, 2, 1, 1]), vec![1.0, 10.0]).unwrap();
        let mut output = Tensor::zeros(Shape::nchw(1, 1, 1, 2));

        conv2d(&input.view(), &weight.view(), None, 1, 0, &mut output).unwrap();
        assert_eq!(output.as_slice(), &[31.0, 42.0]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let input = Tensor::zeros(Shape::nchw(1, 1, 4, 4));
        let weight = Tensor::zeros(Shape::new(vec![1, 2, 3, 3])); // wrong in_c
        let mut output = Tensor::zeros(Shape::nchw(1, 1, 2, 2));

        let result = conv2d(&input.view(), &weight.view(), None, 1, 0, &mut output);
        assert!(matches!(result, Err(TensorError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_kernel_too_large_rejected() {
        let input = Tensor::zeros(Shape::nchw(1, 1, 2, 2));
        let weight = Tensor::zeros(Shape::new(vec![1, 1, 5, 5]));
        let mut output = Tensor::zeros(Shape::nchw(1, 1, 1, 1));

        let result = conv2d(&input.view(), &weight.view(), None, 1, 0, &mut output);
        assert!(matches!(result, Err(TensorError::InvalidGeometry { .. })));
    }
}
