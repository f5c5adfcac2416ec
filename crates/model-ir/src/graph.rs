// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: the network as an ordered chain of layers.
//!
//! # Type-State Pattern
//!
//! The graph transitions through states enforced at compile time:
//!
//! ```text
//! ModelGraph<Loaded>     — layers built, not yet checked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated>  — shapes verified, ready for the forward pass.
//! ```
//!
//! This prevents the forward runtime from ever receiving a graph whose
//! activation chain or weight shapes are inconsistent. The transition
//! consumes the old state and returns the new one, so there is zero
//! runtime cost — the marker types are `PhantomData` (ZST).

use crate::{LayerDef, LayerOp, ModelError};
use std::fmt;
use tensor_core::Shape;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been built but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and is ready for execution.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// The complete network represented as an ordered sequence of layers.
///
/// The networks this tool probes are linear chains: each layer consumes
/// the previous layer's output. The generic parameter `S` encodes the
/// validation state at compile time.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Human-readable network name (e.g., `"imc"`).
    pub name: String,
    /// Declared input activation shape (NCHW).
    pub input_shape: Shape,
    /// Ordered list of layer definitions.
    pub layers: Vec<LayerDef>,
    /// State marker (zero-sized, compile-time only).
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(name: String, input_shape: Shape, layers: Vec<LayerDef>) -> Self {
        Self {
            name,
            input_shape,
            layers,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph is non-empty and the input shape is rank-4 NCHW.
    /// - Layer indices are consecutive starting from 0.
    /// - No layer has zero-element activation shapes.
    /// - The activation chain is exact: layer 0 consumes the graph input
    ///   shape, and each later layer consumes its predecessor's output.
    /// - Weight shapes are consistent with each layer's operation.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph(
                "model graph contains no layers".into(),
            ));
        }
        if self.input_shape.nchw_dims().is_none() {
            return Err(ModelError::InvalidGraph(format!(
                "input shape {} is not rank-4 NCHW",
                self.input_shape,
            )));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.index != i {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("expected index {i}, got {}", layer.index),
                });
            }
            if layer.input_shape.num_elements() == 0 {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "input shape has zero elements".into(),
                });
            }
            if layer.output_shape.num_elements() == 0 {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "output shape has zero elements".into(),
                });
            }

            let expected_input = if i == 0 {
                &self.input_shape
            } else {
                &self.layers[i - 1].output_shape
            };
            if &layer.input_shape != expected_input {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!(
                        "input shape {} does not match upstream shape {}",
                        layer.input_shape, expected_input,
                    ),
                });
            }

            check_weight_shapes(layer)?;
        }

        Ok(ModelGraph {
            name: self.name,
            input_shape: self.input_shape,
            layers: self.layers,
            _state: std::marker::PhantomData,
        })
    }
}

/// Verifies that a layer's weight shapes agree with its operation.
fn check_weight_shapes(layer: &LayerDef) -> Result<(), ModelError> {
    let invalid = |detail: String| ModelError::InvalidLayer {
        layer: layer.name.clone(),
        detail,
    };

    if layer.weight_names.len() != layer.weight_shapes.len() {
        return Err(invalid("weight names and shapes differ in length".into()));
    }

    match &layer.op {
        LayerOp::Convolution {
            num_output, kernel, ..
        } => {
            let in_c = layer
                .input_shape
                .dim(1)
                .ok_or_else(|| invalid("convolution input is not NCHW".into()))?;
            match layer.weight_shapes.as_slice() {
                [w] | [w, _] => {
                    let expected = Shape::new(vec![*num_output, in_c, *kernel, *kernel]);
                    if w != &expected {
                        return Err(invalid(format!(
                            "convolution weight shape {w} does not match expected {expected}",
                        )));
                    }
                }
                _ => {
                    return Err(invalid(format!(
                        "convolution expects 1 or 2 weight tensors, got {}",
                        layer.weight_shapes.len(),
                    )))
                }
            }
            if let Some(b) = layer.weight_shapes.get(1) {
                if b.dims() != [*num_output] {
                    return Err(invalid(format!(
                        "convolution bias shape {b} does not match [{num_output}]",
                    )));
                }
            }
        }
        LayerOp::InnerProduct { num_output } => {
            let batch = layer.input_shape.dim(0).unwrap_or(0).max(1);
            let in_f = layer.input_shape.num_elements() / batch;
            match layer.weight_shapes.as_slice() {
                [w] | [w, _] => {
                    let expected = Shape::matrix(*num_output, in_f);
                    if w != &expected {
                        return Err(invalid(format!(
                            "inner_product weight shape {w} does not match expected {expected}",
                        )));
                    }
                }
                _ => {
                    return Err(invalid(format!(
                        "inner_product expects 1 or 2 weight tensors, got {}",
                        layer.weight_shapes.len(),
                    )))
                }
            }
            if let Some(b) = layer.weight_shapes.get(1) {
                if b.dims() != [*num_output] {
                    return Err(invalid(format!(
                        "inner_product bias shape {b} does not match [{num_output}]",
                    )));
                }
            }
        }
        LayerOp::Pooling { .. } | LayerOp::Relu | LayerOp::Softmax => {
            if !layer.weight_shapes.is_empty() {
                return Err(invalid(format!(
                    "{} takes no weights, got {}",
                    layer.op,
                    layer.weight_shapes.len(),
                )));
            }
        }
    }

    Ok(())
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Returns the total number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the declared input element count.
    pub fn input_elements(&self) -> usize {
        self.input_shape.num_elements()
    }

    /// Returns the total memory for all weights in bytes.
    pub fn total_weight_bytes(&self) -> usize {
        self.layers.iter().map(LayerDef::weight_bytes).sum()
    }

    /// Returns the total memory for all activations in bytes.
    pub fn total_activation_bytes(&self) -> usize {
        self.layers.iter().map(LayerDef::activation_bytes).sum()
    }

    /// Returns an iterator over the layers in execution order.
    pub fn iter_layers(&self) -> impl Iterator<Item = &LayerDef> {
        self.layers.iter()
    }

    /// Returns a reference to a layer by index.
    pub fn layer(&self, index: usize) -> Option<&LayerDef> {
        self.layers.get(index)
    }

    /// Returns a summary string describing the network.
    pub fn summary(&self) -> String {
        let weight_kb = self.total_weight_bytes() as f64 / 1024.0;
        format!(
            "Network '{}': {} layers, input {}, {:.1} KB weights",
            self.name,
            self.num_layers(),
            self.input_shape,
            weight_kb,
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ModelGraph '{}' ({} layers, input {}):",
            self.name,
            self.layers.len(),
            self.input_shape,
        )?;
        for layer in &self.layers {
            writeln!(f, "  {}", layer.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: a relu chain over a fixed shape (no weights to mismatch).
    fn relu_chain(n: usize, shape: Shape) -> Vec<LayerDef> {
        (0..n)
            .map(|i| LayerDef {
                name: format!("relu{i}"),
                op: LayerOp::Relu,
                index: i,
                weight_names: vec![],
                weight_shapes: vec![],
                input_shape: shape.clone(),
                output_shape: shape.clone(),
            })
            .collect()
    }

    #[test]
    fn test_validate_ok() {
        let shape = Shape::nchw(1, 3, 4, 4);
        let graph = ModelGraph::new("test".into(), shape.clone(), relu_chain(3, shape));
        let validated = graph.validate().unwrap();
        assert_eq!(validated.num_layers(), 3);
        assert_eq!(validated.input_elements(), 48);
    }

    #[test]
    fn test_validate_empty() {
        let graph = ModelGraph::new("empty".into(), Shape::nchw(1, 1, 1, 1), vec![]);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_validate_bad_index() {
        let shape = Shape::nchw(1, 3, 4, 4);
        let mut layers = relu_chain(3, shape.clone());
        layers[1].index = 5;
        let graph = ModelGraph::new("bad".into(), shape, layers);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_validate_broken_chain() {
        let shape = Shape::nchw(1, 3, 4, 4);
        let mut layers = relu_chain(2, shape.clone());
        layers[1].input_shape = Shape::nchw(1, 3, 2, 2);
        layers[1].output_shape = Shape::nchw(1, 3, 2, 2);
        let graph = ModelGraph::new("chain".into(), shape, layers);
        assert!(matches!(
            graph.validate(),
            Err(ModelError::InvalidLayer { .. })
        ));
    }

    #[test]
    fn test_validate_first_layer_must_match_input() {
        let layers = relu_chain(1, Shape::nchw(1, 3, 4, 4));
        let graph = ModelGraph::new("mismatch".into(), Shape::nchw(1, 1, 4, 4), layers);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_validate_conv_weight_shape() {
        let layer = LayerDef {
            name: "conv1".into(),
            op: LayerOp::Convolution {
                num_output: 4,
                kernel: 3,
                stride: 1,
                pad: 1,
            },
            index: 0,
            weight_names: vec!["w".into()],
            weight_shapes: vec![Shape::new(vec![4, 9, 3, 3])], // wrong in_c
            input_shape: Shape::nchw(1, 3, 8, 8),
            output_shape: Shape::nchw(1, 4, 8, 8),
        };
        let graph = ModelGraph::new("conv".into(), Shape::nchw(1, 3, 8, 8), vec![layer]);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_weights_on_relu() {
        let shape = Shape::nchw(1, 3, 4, 4);
        let mut layers = relu_chain(1, shape.clone());
        layers[0].weight_names = vec!["w".into()];
        layers[0].weight_shapes = vec![Shape::vector(3)];
        let graph = ModelGraph::new("relu-w".into(), shape, layers);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_summary_and_display() {
        let shape = Shape::nchw(1, 3, 4, 4);
        let validated = ModelGraph::new("imc".into(), shape.clone(), relu_chain(2, shape))
            .validate()
            .unwrap();
        let s = validated.summary();
        assert!(s.contains("imc"));
        assert!(s.contains("2 layers"));

        let display = format!("{validated}");
        assert!(display.contains("relu0"));
        assert!(display.contains("relu1"));
    }

    #[test]
    fn test_layer_access() {
        let shape = Shape::nchw(1, 3, 4, 4);
        let validated = ModelGraph::new("test".into(), shape.clone(), relu_chain(3, shape))
            .validate()
            .unwrap();
        assert_eq!(validated.layer(0).unwrap().name, "relu0");
        assert_eq!(validated.layer(2).unwrap().name, "relu2");
        assert!(validated.layer(3).is_none());
    }
}
