// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from topology + SafeTensors files.
//!
//! The loader reads two files:
//! - the topology (JSON) describing the input shape and layer chain
//!   (see [`Topology`]);
//! - the weights in HuggingFace SafeTensors format.
//!
//! Weight *data* is **not** loaded into memory here. The loader only
//! reads the SafeTensors header to extract tensor shapes, which are
//! used to build the [`ModelGraph`]. Actual weight data is loaded by
//! the forward runtime via memory-mapped I/O.

use crate::{graph, LayerDef, LayerOp, ModelError, ModelGraph, Topology};
use std::collections::HashMap;
use std::path::Path;
use tensor_core::{conv_out_dim, pool_out_dim, Shape};

/// Metadata for a single tensor extracted from the SafeTensors header.
#[derive(Debug, Clone)]
pub struct WeightMeta {
    /// Tensor name (key in the SafeTensors file).
    pub name: String,
    /// Shape of the tensor.
    pub shape: Shape,
    /// Size in bytes (f32 storage).
    pub size_bytes: usize,
}

/// Loads a model from disk into a validated [`ModelGraph`].
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let graph =
///     ModelLoader::load(Path::new("imc.json"), Path::new("imc.safetensors")).unwrap();
/// println!("Loaded {} layers", graph.num_layers());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Loads and validates a model from a topology file and a weights file.
    ///
    /// Steps:
    /// 1. Parse the topology JSON and validate it.
    /// 2. Read the SafeTensors header to extract weight tensor metadata.
    /// 3. Build [`LayerDef`]s by walking the chain and inferring each
    ///    layer's activation shapes.
    /// 4. Construct and validate the [`ModelGraph`].
    pub fn load(
        topology_path: &Path,
        weights_path: &Path,
    ) -> Result<ModelGraph<graph::Validated>, ModelError> {
        tracing::info!(
            topology = %topology_path.display(),
            weights = %weights_path.display(),
            "loading model"
        );

        let topology = Topology::from_file(topology_path)?;
        topology.validate()?;

        let weight_meta = Self::read_weight_metadata(weights_path)?;

        Self::from_topology_and_meta(&topology, &weight_meta)
    }

    /// Builds a model from a topology and a pre-built weight metadata map.
    ///
    /// Useful for testing without actual SafeTensors files.
    pub fn from_topology_and_meta(
        topology: &Topology,
        weight_meta: &HashMap<String, WeightMeta>,
    ) -> Result<ModelGraph<graph::Validated>, ModelError> {
        topology.validate()?;
        let input_shape = Shape::new(topology.input_shape.clone());
        let layers = Self::build_layers(topology, &input_shape, weight_meta)?;
        let graph = ModelGraph::new(topology.name.clone(), input_shape, layers);
        graph.validate()
    }

    /// Reads the SafeTensors header to extract tensor names and shapes.
    ///
    /// Uses memory-mapped I/O to avoid loading the full weight file.
    /// Only f32 tensors are accepted.
    pub fn read_weight_metadata(
        weights_path: &Path,
    ) -> Result<HashMap<String, WeightMeta>, ModelError> {
        let file = std::fs::File::open(weights_path).map_err(|e| {
            ModelError::SafeTensors(format!("cannot open '{}': {e}", weights_path.display()))
        })?;

        // Memory-map the file for zero-copy header parsing.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| ModelError::SafeTensors(format!("mmap failed: {e}")))?;

        // Deserialise the SafeTensors header (this only parses metadata,
        // not the actual tensor data).
        let tensors = safetensors::SafeTensors::deserialize(&mmap)
            .map_err(|e| ModelError::SafeTensors(format!("SafeTensors parse error: {e}")))?;

        let mut meta = HashMap::new();
        for (name, view) in tensors.tensors() {
            if view.dtype() != safetensors::Dtype::F32 {
                return Err(ModelError::UnsupportedDType {
                    name: name.clone(),
                    dtype: format!("{:?}", view.dtype()),
                });
            }
            let shape = Shape::new(view.shape().to_vec());
            let size_bytes = shape.size_bytes();
            meta.insert(
                name.clone(),
                WeightMeta {
                    name: name.to_string(),
                    shape,
                    size_bytes,
                },
            );
        }

        Ok(meta)
    }

    /// Converts topology entries into layer definitions, walking the
    /// chain from the declared input shape and inferring each layer's
    /// output shape from its operation.
    fn build_layers(
        topology: &Topology,
        input_shape: &Shape,
        weight_meta: &HashMap<String, WeightMeta>,
    ) -> Result<Vec<LayerDef>, ModelError> {
        let mut layers = Vec::with_capacity(topology.layers.len());
        let mut current = input_shape.clone();

        for (i, entry) in topology.layers.iter().enumerate() {
            let op = entry.op()?;

            // Collect weight shapes from SafeTensors metadata.
            let mut weight_shapes = Vec::with_capacity(entry.weights.len());
            for wname in &entry.weights {
                let meta = weight_meta
                    .get(wname)
                    .ok_or_else(|| ModelError::WeightNotFound {
                        name: wname.clone(),
                    })?;
                weight_shapes.push(meta.shape.clone());
            }
            if op.has_weights() && entry.weights.is_empty() {
                return Err(ModelError::InvalidLayer {
                    layer: entry.name.clone(),
                    detail: format!("{op} requires weight tensors, none listed"),
                });
            }

            let output_shape = infer_output_shape(&entry.name, &op, &current)?;

            layers.push(LayerDef {
                name: entry.name.clone(),
                op,
                index: i,
                weight_names: entry.weights.clone(),
                weight_shapes,
                input_shape: current.clone(),
                output_shape: output_shape.clone(),
            });

            current = output_shape;
        }

        Ok(layers)
    }
}

/// Infers a layer's output activation shape from its operation and
/// input shape.
fn infer_output_shape(name: &str, op: &LayerOp, input: &Shape) -> Result<Shape, ModelError> {
    let (n, c, h, w) = input.nchw_dims().ok_or_else(|| ModelError::InvalidLayer {
        layer: name.to_string(),
        detail: format!("input shape {input} is not rank-4 NCHW"),
    })?;

    match op {
        LayerOp::Convolution {
            num_output,
            kernel,
            stride,
            pad,
        } => {
            let oh = conv_out_dim(h, *kernel, *stride, *pad);
            let ow = conv_out_dim(w, *kernel, *stride, *pad);
            match (oh, ow) {
                (Some(oh), Some(ow)) => Ok(Shape::nchw(n, *num_output, oh, ow)),
                _ => Err(ModelError::InvalidLayer {
                    layer: name.to_string(),
                    detail: format!(
                        "convolution kernel {kernel} does not fit input {h}x{w} with pad {pad}"
                    ),
                }),
            }
        }
        LayerOp::Pooling {
            kernel,
            stride,
            pad,
            ..
        } => {
            let oh = pool_out_dim(h, *kernel, *stride, *pad);
            let ow = pool_out_dim(w, *kernel, *stride, *pad);
            match (oh, ow) {
                (Some(oh), Some(ow)) => Ok(Shape::nchw(n, c, oh, ow)),
                _ => Err(ModelError::InvalidLayer {
                    layer: name.to_string(),
                    detail: format!(
                        "pooling window {kernel} does not fit input {h}x{w} with pad {pad}"
                    ),
                }),
            }
        }
        LayerOp::Relu | LayerOp::Softmax => Ok(input.clone()),
        LayerOp::InnerProduct { num_output } => Ok(Shape::nchw(n, *num_output, 1, 1)),
    }
}
