// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and view abstractions.

use crate::{Shape, TensorError};

/// An owned, n-dimensional `f32` tensor stored in contiguous memory.
///
/// `Tensor` is the primary data carrier in the probe pipeline: packed
/// image input, layer weights, and layer activations are all `Tensor`s.
///
/// # Memory Layout
/// Data is stored in row-major (C) order. For rank-4 NCHW shapes this
/// is the channel-major flattening: all values of channel 0, then all
/// of channel 1, and so on — exactly the order the dump files use.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::zeros(Shape::matrix(2, 3));
    /// assert_eq!(t.num_elements(), 6);
    /// ```
    pub fn zeros(shape: Shape) -> Self {
        let n = shape.num_elements();
        Self {
            shape,
            data: vec![0.0; n],
        }
    }

    /// Creates a tensor from a flat value vector.
    ///
    /// Returns an error if the vector length does not match
    /// `shape.num_elements()`.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the total number of elements.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Returns an immutable view over this tensor's data.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            shape: &self.shape,
            data: &self.data,
        }
    }

    /// Returns the flat value slice in native (row-major) order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns a mutable reference to the flat value slice.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Fills the tensor with a constant value.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Consumes the tensor, returning its flat value buffer.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// A borrowed, read-only view over a [`Tensor`]'s data.
///
/// Views are zero-copy and tied to the lifetime of the source tensor,
/// enforced by the borrow checker.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    shape: &'a Shape,
    data: &'a [f32],
}

impl<'a> TensorView<'a> {
    /// Creates a view from raw parts (used internally by tensor ops).
    pub fn from_parts(shape: &'a Shape, data: &'a [f32]) -> Self {
        Self { shape, data }
    }

    /// Returns the shape of the viewed tensor.
    pub fn shape(&self) -> &Shape {
        self.shape
    }

    /// Returns the flat value slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the total number of elements.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }
}
