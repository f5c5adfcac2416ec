// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the forward runtime.

use tensor_core::TensorError;

/// Errors that can occur while running a forward pass.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// Model loading or validation failed.
    #[error("model error: {0}")]
    Model(#[from] model_ir::ModelError),

    /// Weight data could not be loaded for a layer.
    #[error("weight loading failed for layer '{layer}': {detail}")]
    WeightLoad { layer: String, detail: String },

    /// The bound input does not match the network's declared input size.
    #[error("input has {actual} elements but the network expects {expected}")]
    InputSizeMismatch { expected: usize, actual: usize },

    /// A requested layer index is beyond the network's last layer.
    #[error("layer {requested} out of range: the network has {num_layers} layers")]
    LayerOutOfRange { requested: usize, num_layers: usize },

    /// A layer's computation failed.
    #[error("execution failed at layer '{layer}'")]
    Execution {
        layer: String,
        #[source]
        source: TensorError,
    },

    /// Configuration loading or parsing failed.
    #[error("config error: {0}")]
    Config(String),
}
