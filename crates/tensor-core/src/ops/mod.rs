// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Forward-pass operations over NCHW tensors.
//!
//! Each operation validates shapes, then writes into a pre-allocated
//! output tensor. Kernels are plain nested loops: for a diagnostic dump
//! tool, a predictable element-by-element evaluation order matters more
//! than throughput.

mod conv_op;
mod linear_op;
mod pool_op;
mod relu_op;
mod softmax_op;

pub use conv_op::{conv2d, conv_out_dim};
pub use linear_op::inner_product;
pub use pool_op::{pool2d, pool_out_dim, PoolMethod};
pub use relu_op::relu;
pub use softmax_op::softmax;
