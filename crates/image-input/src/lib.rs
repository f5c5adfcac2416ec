// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # image-input
//!
//! Image decoding and tensor packing for actprobe.
//!
//! - [`Raster`] — a decoded image as raw interleaved 8-bit samples.
//! - [`to_input_tensor`] — packs a raster into a channel-major NCHW
//!   f32 tensor, preserving the raw 0–255 intensities.
//!
//! Intensities are deliberately **not** normalised or mean-subtracted:
//! the probe feeds the network exactly the byte values the decoder
//! produced, so dumped activations can be compared across runs and
//! implementations without an extra preprocessing variable.

mod error;
mod pack;
mod raster;

pub use error::ImageInputError;
pub use pack::to_input_tensor;
pub use raster::Raster;
