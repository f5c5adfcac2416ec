// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Decoded image rasters.

use crate::ImageInputError;
use std::path::Path;

/// A decoded image as raw 8-bit samples in interleaved (HWC) order.
///
/// Grayscale images decode to one channel; everything else is converted
/// to three-channel RGB. Intensities stay as the decoder produced them,
/// in 0–255.
#[derive(Debug, Clone)]
pub struct Raster {
    channels: usize,
    rows: usize,
    cols: usize,
    samples: Vec<u8>,
}

impl Raster {
    /// Opens and decodes an image file.
    pub fn open(path: &Path) -> Result<Self, ImageInputError> {
        let img = image::open(path).map_err(|source| ImageInputError::Decode {
            path: path.display().to_string(),
            source,
        })?;

        let raster = match img {
            image::DynamicImage::ImageLuma8(gray) => {
                let (cols, rows) = (gray.width() as usize, gray.height() as usize);
                Self {
                    channels: 1,
                    rows,
                    cols,
                    samples: gray.into_raw(),
                }
            }
            other => {
                let rgb = other.to_rgb8();
                let (cols, rows) = (rgb.width() as usize, rgb.height() as usize);
                Self {
                    channels: 3,
                    rows,
                    cols,
                    samples: rgb.into_raw(),
                }
            }
        };

        tracing::debug!(
            path = %path.display(),
            channels = raster.channels,
            rows = raster.rows,
            cols = raster.cols,
            "decoded image"
        );
        Ok(raster)
    }

    /// Builds a raster from an existing interleaved sample buffer.
    pub fn from_samples(
        channels: usize,
        rows: usize,
        cols: usize,
        samples: Vec<u8>,
    ) -> Result<Self, ImageInputError> {
        let expected = channels * rows * cols;
        if samples.len() != expected {
            return Err(ImageInputError::BufferSizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            channels,
            rows,
            cols,
            samples,
        })
    }

    /// Number of channels (1 for grayscale, 3 for RGB).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Image height in pixels.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Image width in pixels.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of samples (`channels * rows * cols`).
    pub fn num_elements(&self) -> usize {
        self.channels * self.rows * self.cols
    }

    /// Returns the raw intensity at `(channel, row, col)`.
    ///
    /// Samples are stored interleaved, so channel varies fastest.
    pub fn intensity(&self, channel: usize, row: usize, col: usize) -> u8 {
        self.samples[(row * self.cols + col) * self.channels + channel]
    }

    /// The raw interleaved sample buffer.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}
