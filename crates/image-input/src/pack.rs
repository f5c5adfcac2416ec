// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Packing rasters into network input tensors.

use crate::{ImageInputError, Raster};
use tensor_core::{Shape, Tensor};

/// Packs a raster into a `[1, channels, rows, cols]` f32 tensor.
///
/// The layout is channel-major: all of channel 0's plane first, then
/// channel 1's, and so on, rows within a plane and columns within a
/// row. Each sample is the raw 0–255 intensity cast to f32, with no
/// scaling or mean subtraction.
///
/// # Errors
/// Returns [`ImageInputError::SizeMismatch`] when the raster's element
/// count differs from `expected_elements` (the network's declared
/// input size).
pub fn to_input_tensor(
    raster: &Raster,
    expected_elements: usize,
) -> Result<Tensor, ImageInputError> {
    let actual = raster.num_elements();
    if actual != expected_elements {
        return Err(ImageInputError::SizeMismatch {
            channels: raster.channels(),
            rows: raster.rows(),
            cols: raster.cols(),
            actual,
            expected: expected_elements,
        });
    }

    let (c, h, w) = (raster.channels(), raster.rows(), raster.cols());
    let mut data = Vec::with_capacity(actual);
    for ch in 0..c {
        for row in 0..h {
            for col in 0..w {
                data.push(f32::from(raster.intensity(ch, row, col)));
            }
        }
    }

    tracing::debug!(elements = actual, "packed input tensor");

    let shape = Shape::nchw(1, c, h, w);
    // The buffer length equals the shape's element count by construction.
    Tensor::from_vec(shape, data).map_err(|_| ImageInputError::BufferSizeMismatch {
        expected: expected_elements,
        actual,
    })
}
