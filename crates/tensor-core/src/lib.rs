// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor types and forward-pass operations for convolutional networks.
//!
//! This crate provides:
//! - [`Tensor`] — an owned, contiguous `f32` tensor in row-major layout.
//! - [`Shape`] — dimension descriptors with NCHW conveniences.
//! - Forward operations: convolution, pooling, ReLU, inner product,
//!   channel softmax.
//!
//! # Design Goals
//! - Deterministic, single-threaded kernels: the same input always
//!   produces bit-identical output, which is the whole point of an
//!   activation-dump tool.
//! - Operations write into caller-provided output tensors; no hidden
//!   allocation inside the kernels.
//! - Clean error types via `thiserror`; shape disagreements are errors,
//!   never panics.

mod error;
mod ops;
mod shape;
mod tensor;

pub use error::TensorError;
pub use ops::{
    conv2d, conv_out_dim, inner_product, pool2d, pool_out_dim, relu, softmax, PoolMethod,
};
pub use shape::Shape;
pub use tensor::{Tensor, TensorView};
