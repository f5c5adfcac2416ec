// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON topology parsing.
//!
//! The topology file describes the network's input shape and its layer
//! chain, and maps layers to weight tensor names in the SafeTensors file.
//!
//! # Format
//! ```json
//! {
//!   "name": "imc",
//!   "input_shape": [1, 3, 32, 32],
//!   "layers": [
//!     { "name": "conv1", "kind": "convolution", "num_output": 16,
//!       "kernel": 5, "stride": 1, "pad": 2,
//!       "weights": ["conv1.weight", "conv1.bias"] },
//!     { "name": "pool1", "kind": "pooling", "method": "max",
//!       "kernel": 2, "stride": 2 },
//!     { "name": "relu1", "kind": "relu" },
//!     { "name": "ip1", "kind": "inner_product", "num_output": 10,
//!       "weights": ["ip1.weight", "ip1.bias"] },
//!     { "name": "prob", "kind": "softmax" }
//!   ]
//! }
//! ```
//! `stride` defaults to 1 and `pad` to 0; `method` defaults to `"max"`.

use crate::{LayerOp, ModelError};
use std::path::Path;
use tensor_core::PoolMethod;

/// Top-level network descriptor, deserialized from the topology file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Topology {
    /// Human-readable network name (e.g., `"imc"`).
    pub name: String,
    /// Declared input shape in NCHW order.
    pub input_shape: Vec<usize>,
    /// Layer definitions in execution order.
    pub layers: Vec<TopologyLayer>,
}

/// A single layer entry in the topology file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TopologyLayer {
    /// Layer name (e.g., `"conv1"`).
    pub name: String,
    /// Operation kind string (e.g., `"convolution"`, `"pooling"`).
    pub kind: String,
    /// Weight tensor names in the SafeTensors file.
    #[serde(default)]
    pub weights: Vec<String>,
    /// Output channels (convolution) or output features (inner product).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_output: Option<usize>,
    /// Square kernel/window extent (convolution, pooling).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel: Option<usize>,
    /// Stride (convolution, pooling); defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stride: Option<usize>,
    /// Zero padding (convolution, pooling); defaults to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad: Option<usize>,
    /// Pooling method string; defaults to `"max"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Topology {
    /// Loads a topology from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a topology from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let topology: Self = serde_json::from_str(json)?;
        Ok(topology)
    }

    /// Validates that the topology is internally consistent.
    ///
    /// Checks:
    /// - The input shape is rank 4 with no zero dimensions.
    /// - At least one layer is defined, with no duplicate names.
    /// - Every layer resolves to a recognised [`LayerOp`] with its
    ///   required parameters present.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.input_shape.len() != 4 {
            return Err(ModelError::InvalidGraph(format!(
                "input_shape must have 4 dimensions (NCHW), got {}",
                self.input_shape.len(),
            )));
        }
        if self.input_shape.iter().any(|&d| d == 0) {
            return Err(ModelError::InvalidGraph(
                "input_shape has a zero dimension".into(),
            ));
        }

        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph(
                "topology contains no layers".into(),
            ));
        }

        let mut seen_names = std::collections::HashSet::new();
        for layer in &self.layers {
            if !seen_names.insert(&layer.name) {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "duplicate layer name".into(),
                });
            }
            layer.op()?;
        }

        Ok(())
    }
}

impl TopologyLayer {
    /// Resolves this entry into a [`LayerOp`], checking that the
    /// parameters the kind requires are present and positive.
    pub fn op(&self) -> Result<LayerOp, ModelError> {
        let invalid = |detail: String| ModelError::InvalidLayer {
            layer: self.name.clone(),
            detail,
        };

        match self.kind.to_lowercase().as_str() {
            "convolution" | "conv" => {
                let num_output = self
                    .num_output
                    .filter(|&n| n > 0)
                    .ok_or_else(|| invalid("convolution requires num_output > 0".into()))?;
                let kernel = self
                    .kernel
                    .filter(|&k| k > 0)
                    .ok_or_else(|| invalid("convolution requires kernel > 0".into()))?;
                let stride = self.stride.unwrap_or(1);
                if stride == 0 {
                    return Err(invalid("stride must be > 0".into()));
                }
                Ok(LayerOp::Convolution {
                    num_output,
                    kernel,
                    stride,
                    pad: self.pad.unwrap_or(0),
                })
            }
            "pooling" | "pool" => {
                let kernel = self
                    .kernel
                    .filter(|&k| k > 0)
                    .ok_or_else(|| invalid("pooling requires kernel > 0".into()))?;
                let stride = self.stride.unwrap_or(1);
                if stride == 0 {
                    return Err(invalid("stride must be > 0".into()));
                }
                let method = match &self.method {
                    Some(s) => PoolMethod::from_str_loose(s)
                        .ok_or_else(|| invalid(format!("unrecognised pooling method '{s}'")))?,
                    None => PoolMethod::Max,
                };
                Ok(LayerOp::Pooling {
                    method,
                    kernel,
                    stride,
                    pad: self.pad.unwrap_or(0),
                })
            }
            "relu" => Ok(LayerOp::Relu),
            "inner_product" | "innerproduct" | "fully_connected" | "fc" | "ip" => {
                let num_output = self
                    .num_output
                    .filter(|&n| n > 0)
                    .ok_or_else(|| invalid("inner_product requires num_output > 0".into()))?;
                Ok(LayerOp::InnerProduct { num_output })
            }
            "softmax" => Ok(LayerOp::Softmax),
            other => Err(invalid(format!("unrecognised layer kind '{other}'"))),
        }
    }
}
