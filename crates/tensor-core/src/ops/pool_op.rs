// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Spatial pooling (max and average).

use crate::{Tensor, TensorError, TensorView};

/// Pooling reduction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolMethod {
    /// Maximum over the window.
    Max,
    /// Mean over the in-range positions of the window.
    Average,
}

impl PoolMethod {
    /// Parses a method from a topology string. Accepts `"max"`/`"ave"`/
    /// `"average"` (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "max" => Some(Self::Max),
            "ave" | "avg" | "average" | "mean" => Some(Self::Average),
            _ => None,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Average => "average",
        }
    }
}

impl std::fmt::Display for PoolMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output spatial extent of a pooling window along one axis, or `None`
/// if the window does not fit the padded input.
///
/// Uses ceiling division (the convention of the Caffe-style networks
/// this tool probes): `ceil((dim + 2*pad - kernel) / stride) + 1`,
/// clipped so the last window starts inside the real-plus-left-pad
/// extent.
pub fn pool_out_dim(dim: usize, kernel: usize, stride: usize, pad: usize) -> Option<usize> {
    if stride == 0 || kernel == 0 {
        return None;
    }
    let padded = dim + 2 * pad;
    if padded < kernel {
        return None;
    }
    let span = padded - kernel;
    let mut out = span.div_ceil(stride) + 1;
    if pad > 0 && (out - 1) * stride >= dim + pad {
        out -= 1;
    }
    Some(out)
}

/// Pools an NCHW input spatially, channel by channel.
///
/// `output` must be pre-allocated to `[n, c, oh, ow]` where the spatial
/// extents follow [`pool_out_dim`]. Windows are clipped to the real
/// input: max pooling skips out-of-range positions, average pooling
/// divides by the number of in-range positions.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] on shape disagreement and
/// [`TensorError::InvalidGeometry`] if the window does not fit.
pub fn pool2d(
    input: &TensorView<'_>,
    method: PoolMethod,
    kernel: usize,
    stride: usize,
    pad: usize,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let (n, c, h, w) = input.shape().nchw_dims().ok_or(TensorError::ShapeMismatch {
        op: "pool2d",
        lhs: input.shape().clone(),
        rhs: output.shape().clone(),
    })?;

    let oh = pool_out_dim(h, kernel, stride, pad).ok_or_else(|| TensorError::InvalidGeometry {
        op: "pool2d",
        detail: format!("window {kernel} (stride {stride}, pad {pad}) does not fit height {h}"),
    })?;
    let ow = pool_out_dim(w, kernel, stride, pad).ok_or_else(|| TensorError::InvalidGeometry {
        op: "pool2d",
        detail: format!("window {kernel} (stride {stride}, pad {pad}) does not fit width {w}"),
    })?;

    let expected_out = crate::Shape::nchw(n, c, oh, ow);
    if output.shape() != &expected_out {
        return Err(TensorError::ShapeMismatch {
            op: "pool2d",
            lhs: expected_out,
            rhs: output.shape().clone(),
        });
    }

    let src = input.as_slice();
    let dst = output.as_mut_slice();

    for b in 0..n {
        for ch in 0..c {
            let plane = (b * c + ch) * h * w;
            for oy in 0..oh {
                for ox in 0..ow {
                    let y0 = (oy * stride) as isize - pad as isize;
                    let x0 = (ox * stride) as isize - pad as isize;

                    let mut max_val = f32::NEG_INFINITY;
                    let mut sum = 0.0f32;
                    let mut count = 0usize;

                    for ky in 0..kernel {
                        let iy = y0 + ky as isize;
                        if iy < 0 || iy >= h as isize {
                            continue;
                        }
                        for kx in 0..kernel {
                            let ix = x0 + kx as isize;
                            if ix < 0 || ix >= w as isize {
                                continue;
                            }
                            let v = src[plane + iy as usize * w + ix as usize];
                            max_val = max_val.max(v);
                            sum += v;
                            count += 1;
                        }
                    }

                    // pool_out_dim clips every window into the input, so
                    // count is always at least 1.
                    let v = match method {
                        PoolMethod::Max => max_val,
                        PoolMethod::Average => sum / count as f32,
                    };
                    dst[((b * c + ch) * oh + oy) * ow + ox] = v;
                }
            }
        }
    }

    Ok(())
}
