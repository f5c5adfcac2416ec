// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer definitions for the network IR.
//!
//! Each [`LayerDef`] describes a single computation in the chain: its
//! operation and geometry, weight references, and inferred activation
//! shapes. Weight *data* is not stored here — only names (keys into the
//! SafeTensors file). The forward runtime loads the data.

use tensor_core::{PoolMethod, Shape};

/// The computation a layer performs, with its geometry parameters.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerOp {
    /// 2-D convolution with square kernels.
    Convolution {
        num_output: usize,
        kernel: usize,
        stride: usize,
        pad: usize,
    },
    /// Spatial max or average pooling.
    Pooling {
        method: PoolMethod,
        kernel: usize,
        stride: usize,
        pad: usize,
    },
    /// Rectified linear activation.
    Relu,
    /// Fully connected projection.
    InnerProduct { num_output: usize },
    /// Softmax over the channel axis.
    Softmax,
}

impl LayerOp {
    /// Returns a human-readable label for the operation kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Convolution { .. } => "convolution",
            Self::Pooling { .. } => "pooling",
            Self::Relu => "relu",
            Self::InnerProduct { .. } => "inner_product",
            Self::Softmax => "softmax",
        }
    }

    /// Returns `true` for operations that carry trained parameters.
    pub fn has_weights(&self) -> bool {
        matches!(self, Self::Convolution { .. } | Self::InnerProduct { .. })
    }
}

impl std::fmt::Display for LayerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// Metadata describing a single layer in the network.
///
/// A `LayerDef` does not own weight data — it stores names (keys into
/// the SafeTensors file) and the shapes the loader observed for them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Unique identifier for this layer (e.g., `"conv1"`).
    pub name: String,
    /// The operation this layer performs.
    pub op: LayerOp,
    /// Index in the execution order (0-based).
    pub index: usize,
    /// Names of weight tensors required by this layer.
    pub weight_names: Vec<String>,
    /// Shapes of the weight tensors (parallel to `weight_names`).
    pub weight_shapes: Vec<Shape>,
    /// Shape of the layer's input activation (NCHW).
    pub input_shape: Shape,
    /// Shape of the layer's output activation (NCHW).
    pub output_shape: Shape,
}

impl LayerDef {
    /// Memory required for this layer's weights in bytes (f32 storage).
    pub fn weight_bytes(&self) -> usize {
        self.weight_shapes.iter().map(Shape::size_bytes).sum()
    }

    /// Memory required for this layer's output activation in bytes.
    pub fn activation_bytes(&self) -> usize {
        self.output_shape.size_bytes()
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} ({}) {} -> {}, {} weight tensors",
            self.index,
            self.name,
            self.op,
            self.input_shape,
            self.output_shape,
            self.weight_names.len(),
        )
    }
}
