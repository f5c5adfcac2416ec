// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The forward-pass executor with type-state–enforced pipeline.
//!
//! ```text
//! ForwardNet<Idle>
//!     │  .load_model()
//!     ▼
//! ForwardNet<Loaded>
//!     │  .bind_input()
//!     ▼
//! ForwardNet<Primed>
//!     │  .forward_to(i) / .activation(i)
//! ```
//!
//! Each state transition consumes the old value and returns a new one,
//! making invalid call sequences a compile error: you cannot run a net
//! with no model, or bind an input before the model's declared size is
//! known.

use crate::{ForwardError, WeightLoader};
use model_ir::{graph::Validated, LayerDef, LayerOp, ModelGraph, ModelLoader};
use std::path::Path;
use tensor_core::{conv2d, inner_product, pool2d, relu, softmax, Tensor};

// ── Type-state markers ─────────────────────────────────────────

/// Net is created but no model is loaded.
#[derive(Debug)]
pub struct Idle;

/// Model graph and weights are loaded; no input bound yet.
#[derive(Debug)]
pub struct Loaded;

/// Input is bound; layers can be executed.
#[derive(Debug)]
pub struct Primed;

/// Sealed trait for net states.
pub trait NetState: std::fmt::Debug {}
impl NetState for Idle {}
impl NetState for Loaded {}
impl NetState for Primed {}

// ── ForwardNet ─────────────────────────────────────────────────

/// The forward-pass executor.
///
/// `S` is a type-state marker that enforces the pipeline ordering at
/// compile time. Weights for every layer are materialised up front at
/// load time, so a run never fails halfway through on missing data.
///
/// # Example
/// ```no_run
/// use forward_rt::ForwardNet;
/// use std::path::Path;
///
/// # fn example(input: tensor_core::Tensor) -> Result<(), forward_rt::ForwardError> {
/// let mut net = ForwardNet::new()
///     .load_model(Path::new("imc.json"), Path::new("imc.safetensors"))?
///     .bind_input(input)?;
/// net.forward_to(2)?;
/// let activation = net.activation(2);
/// # Ok(())
/// # }
/// ```
pub struct ForwardNet<S: NetState = Idle> {
    _state: std::marker::PhantomData<S>,
    // Fields populated as the net transitions through states:
    graph: Option<ModelGraph<Validated>>,
    /// Per-layer weight tensors, parallel to the graph's layers.
    weights: Vec<Vec<Tensor>>,
    input: Option<Tensor>,
    /// Activations computed so far, indexed by layer.
    activations: Vec<Option<Tensor>>,
}

impl Default for ForwardNet<Idle> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Idle → Loaded ──────────────────────────────────────────────

impl ForwardNet<Idle> {
    /// Creates a new net with nothing loaded.
    pub fn new() -> Self {
        Self {
            _state: std::marker::PhantomData,
            graph: None,
            weights: Vec::new(),
            input: None,
            activations: Vec::new(),
        }
    }

    /// Loads the model graph and all layer weights.
    /// Transitions to the `Loaded` state.
    ///
    /// Steps:
    /// 1. Load and validate the model graph from topology + weights.
    /// 2. Memory-map the weight file and materialise every layer's
    ///    weight tensors.
    pub fn load_model(
        self,
        topology_path: &Path,
        weights_path: &Path,
    ) -> Result<ForwardNet<Loaded>, ForwardError> {
        let graph = ModelLoader::load(topology_path, weights_path)?;
        tracing::info!("{}", graph.summary());

        let loader = WeightLoader::open(weights_path)?;
        let mut weights = Vec::with_capacity(graph.num_layers());
        for layer in graph.iter_layers() {
            weights.push(loader.load_layer_weights(layer)?);
        }

        Ok(ForwardNet {
            _state: std::marker::PhantomData,
            graph: Some(graph),
            weights,
            input: None,
            activations: Vec::new(),
        })
    }

    /// Builds a loaded net from a pre-built graph and weight tensors
    /// (for testing without files on disk).
    pub fn from_parts(
        graph: ModelGraph<Validated>,
        weights: Vec<Vec<Tensor>>,
    ) -> Result<ForwardNet<Loaded>, ForwardError> {
        if weights.len() != graph.num_layers() {
            return Err(ForwardError::WeightLoad {
                layer: graph.name.clone(),
                detail: format!(
                    "{} weight sets for {} layers",
                    weights.len(),
                    graph.num_layers(),
                ),
            });
        }
        for (layer, w) in graph.iter_layers().zip(&weights) {
            if w.len() != layer.weight_names.len() {
                return Err(ForwardError::WeightLoad {
                    layer: layer.name.clone(),
                    detail: format!(
                        "expected {} weight tensors, got {}",
                        layer.weight_names.len(),
                        w.len(),
                    ),
                });
            }
        }

        Ok(ForwardNet {
            _state: std::marker::PhantomData,
            graph: Some(graph),
            weights,
            input: None,
            activations: Vec::new(),
        })
    }
}

// ── Loaded → Primed ────────────────────────────────────────────

impl ForwardNet<Loaded> {
    /// Returns a reference to the model graph.
    pub fn graph(&self) -> &ModelGraph<Validated> {
        self.graph.as_ref().expect("graph must exist in Loaded state")
    }

    /// Number of layers in the loaded network.
    pub fn num_layers(&self) -> usize {
        self.graph().num_layers()
    }

    /// The element count the network's declared input shape requires.
    pub fn input_elements(&self) -> usize {
        self.graph().input_elements()
    }

    /// Binds an input tensor and transitions to the `Primed` state.
    ///
    /// The input must hold exactly as many elements as the network's
    /// declared input shape; it is then reinterpreted under that shape,
    /// so callers only need to get the count and element order right.
    pub fn bind_input(self, input: Tensor) -> Result<ForwardNet<Primed>, ForwardError> {
        let graph = self.graph.as_ref().expect("graph must exist in Loaded state");
        let expected = graph.input_elements();
        let actual = input.num_elements();
        if actual != expected {
            return Err(ForwardError::InputSizeMismatch { expected, actual });
        }

        let input_shape = graph.input_shape.clone();
        let num_layers = graph.num_layers();
        let data = input.into_data();
        let input = Tensor::from_vec(input_shape, data)
            .map_err(|_| ForwardError::InputSizeMismatch { expected, actual })?;

        tracing::debug!(elements = actual, "input bound");

        Ok(ForwardNet {
            _state: std::marker::PhantomData,
            graph: self.graph,
            weights: self.weights,
            input: Some(input),
            activations: vec![None; num_layers],
        })
    }
}

// ── Primed: execution ──────────────────────────────────────────

impl ForwardNet<Primed> {
    /// Returns a reference to the model graph.
    pub fn graph(&self) -> &ModelGraph<Validated> {
        self.graph.as_ref().expect("graph must exist in Primed state")
    }

    /// The bound input tensor, reshaped to the network's input shape.
    pub fn input(&self) -> &Tensor {
        self.input.as_ref().expect("input must exist in Primed state")
    }

    /// Runs the network up to and including `layer`, reusing any
    /// activations already computed by earlier calls.
    pub fn forward_to(&mut self, layer: usize) -> Result<(), ForwardError> {
        let num_layers = self.graph().num_layers();
        if layer >= num_layers {
            return Err(ForwardError::LayerOutOfRange {
                requested: layer,
                num_layers,
            });
        }

        for i in 0..=layer {
            if self.activations[i].is_some() {
                continue;
            }
            let def = self
                .graph()
                .layer(i)
                .expect("index checked against num_layers")
                .clone();
            let output = {
                let input = if i == 0 {
                    self.input()
                } else {
                    self.activations[i - 1]
                        .as_ref()
                        .expect("previous activation computed in order")
                };
                run_layer(&def, input, &self.weights[i])?
            };
            tracing::debug!(layer = i, name = %def.name, shape = %def.output_shape, "layer executed");
            self.activations[i] = Some(output);
        }

        Ok(())
    }

    /// Returns the activation of `layer` if it has been computed.
    pub fn activation(&self, layer: usize) -> Option<&Tensor> {
        self.activations.get(layer).and_then(Option::as_ref)
    }

    /// Number of layers in the network.
    pub fn num_layers(&self) -> usize {
        self.graph().num_layers()
    }
}

/// Executes a single layer over `input`, returning the new activation.
fn run_layer(def: &LayerDef, input: &Tensor, weights: &[Tensor]) -> Result<Tensor, ForwardError> {
    let mut output = Tensor::zeros(def.output_shape.clone());
    let in_view = input.view();
    let execution = |source| ForwardError::Execution {
        layer: def.name.clone(),
        source,
    };

    match &def.op {
        LayerOp::Convolution { stride, pad, .. } => {
            let bias = weights.get(1).map(Tensor::view);
            conv2d(
                &in_view,
                &weights[0].view(),
                bias.as_ref(),
                *stride,
                *pad,
                &mut output,
            )
            .map_err(execution)?;
        }
        LayerOp::Pooling {
            method,
            kernel,
            stride,
            pad,
        } => {
            pool2d(&in_view, *method, *kernel, *stride, *pad, &mut output).map_err(execution)?;
        }
        LayerOp::Relu => {
            relu(&in_view, &mut output).map_err(execution)?;
        }
        LayerOp::InnerProduct { .. } => {
            let bias = weights.get(1).map(Tensor::view);
            inner_product(&in_view, &weights[0].view(), bias.as_ref(), &mut output)
                .map_err(execution)?;
        }
        LayerOp::Softmax => {
            softmax(&in_view, &mut output).map_err(execution)?;
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::{Topology, WeightMeta};
    use std::collections::HashMap;
    use tensor_core::Shape;

    /// conv(identity) → relu over a 1x1x3x3 input.
    fn tiny_net() -> ForwardNet<Loaded> {
        let json = r#"{
            "name": "tiny",
            "input_shape": [1, 1, 3, 3],
            "layers": [
                { "name": "conv1", "kind": "convolution", "num_output": 1,
                  "kernel": 1, "weights": ["conv1.weight"] },
                { "name": "relu1", "kind": "relu" }
            ]
        }"#;
        let topology = Topology::from_json(json).unwrap();

        let mut meta = HashMap::new();
        let wshape = Shape::new(vec![1, 1, 1, 1]);
        meta.insert(
            "conv1.weight".to_string(),
            WeightMeta {
                name: "conv1.weight".to_string(),
                shape: wshape.clone(),
                size_bytes: wshape.size_bytes(),
            },
        );
        let graph = ModelLoader::from_topology_and_meta(&topology, &meta).unwrap();

        // 1x1 kernel with value 2.0: doubles every element.
        let weight = Tensor::from_vec(wshape, vec![2.0]).unwrap();
        ForwardNet::from_parts(graph, vec![vec![weight], vec![]]).unwrap()
    }

    fn ramp_input() -> Tensor {
        let data: Vec<f32> = (-4..5).map(|i| i as f32).collect();
        Tensor::from_vec(Shape::nchw(1, 1, 3, 3), data).unwrap()
    }

    #[test]
    fn test_forward_conv_then_relu() {
        let mut net = tiny_net().bind_input(ramp_input()).unwrap();
        net.forward_to(1).unwrap();

        let conv = net.activation(0).unwrap();
        assert_eq!(
            conv.as_slice(),
            &[-8.0, -6.0, -4.0, -2.0, 0.0, 2.0, 4.0, 6.0, 8.0]
        );

        let relu_out = net.activation(1).unwrap();
        assert_eq!(
            relu_out.as_slice(),
            &[0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 6.0, 8.0]
        );
    }

    #[test]
    fn test_incremental_execution() {
        let mut net = tiny_net().bind_input(ramp_input()).unwrap();
        net.forward_to(0).unwrap();
        assert!(net.activation(0).is_some());
        assert!(net.activation(1).is_none());

        net.forward_to(1).unwrap();
        assert!(net.activation(1).is_some());
    }

    #[test]
    fn test_forward_is_deterministic() {
        let mut a = tiny_net().bind_input(ramp_input()).unwrap();
        let mut b = tiny_net().bind_input(ramp_input()).unwrap();
        a.forward_to(1).unwrap();
        b.forward_to(1).unwrap();
        assert_eq!(a.activation(1).unwrap(), b.activation(1).unwrap());
    }

    #[test]
    fn test_input_size_mismatch() {
        let input = Tensor::zeros(Shape::nchw(1, 1, 2, 2));
        let result = tiny_net().bind_input(input);
        assert!(matches!(
            result,
            Err(ForwardError::InputSizeMismatch {
                expected: 9,
                actual: 4,
            })
        ));
    }

    #[test]
    fn test_input_reshaped_to_graph_shape() {
        let flat = Tensor::from_vec(Shape::new(vec![9]), vec![1.0; 9]).unwrap();
        let net = tiny_net().bind_input(flat).unwrap();
        assert_eq!(net.input().shape(), &Shape::nchw(1, 1, 3, 3));
    }

    #[test]
    fn test_layer_out_of_range() {
        let mut net = tiny_net().bind_input(ramp_input()).unwrap();
        let result = net.forward_to(2);
        assert!(matches!(
            result,
            Err(ForwardError::LayerOutOfRange {
                requested: 2,
                num_layers: 2,
            })
        ));
    }

    #[test]
    fn test_from_parts_weight_count_mismatch() {
        let json = r#"{
            "name": "tiny",
            "input_shape": [1, 1, 3, 3],
            "layers": [{ "name": "relu1", "kind": "relu" }]
        }"#;
        let topology = Topology::from_json(json).unwrap();
        let graph = ModelLoader::from_topology_and_meta(&topology, &HashMap::new()).unwrap();
        let result = ForwardNet::from_parts(graph, vec![]);
        assert!(matches!(result, Err(ForwardError::WeightLoad { .. })));
    }
}
