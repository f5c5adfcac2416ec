// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for image decoding and packing.

/// Errors that can occur when reading or packing an input image.
#[derive(Debug, thiserror::Error)]
pub enum ImageInputError {
    /// The image file could not be opened or decoded.
    #[error("failed to decode image '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// The decoded image geometry does not match the network input.
    #[error(
        "image has {actual} samples ({channels}x{rows}x{cols}) but the network expects {expected}"
    )]
    SizeMismatch {
        channels: usize,
        rows: usize,
        cols: usize,
        actual: usize,
        expected: usize,
    },

    /// The sample buffer length disagrees with the declared geometry.
    #[error("sample buffer holds {actual} bytes, geometry requires {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}
