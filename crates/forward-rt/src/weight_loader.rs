// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Weight loading from SafeTensors files with memory-mapped I/O.
//!
//! [`WeightLoader`] opens the weight file once via mmap and extracts
//! per-layer tensor data on demand. A missing or unreadable weight file
//! is fatal: the probe exists to dump the activations of a trained
//! network, so there is no synthetic fallback.

use model_ir::LayerDef;
use std::path::{Path, PathBuf};
use tensor_core::Tensor;

/// Loads weight tensors from a SafeTensors file on demand.
///
/// Uses `memmap2` for zero-copy access to the raw bytes; tensor data is
/// only materialised (little-endian f32 decode) when a layer asks for it.
pub struct WeightLoader {
    /// Path to the weight file, kept for diagnostics.
    weights_path: PathBuf,
    /// Memory-mapped SafeTensors file (opened once, reused).
    mmap: memmap2::Mmap,
}

impl WeightLoader {
    /// Opens and memory-maps the given SafeTensors file.
    pub fn open(weights_path: &Path) -> Result<Self, super::ForwardError> {
        let file =
            std::fs::File::open(weights_path).map_err(|e| super::ForwardError::WeightLoad {
                layer: "init".into(),
                detail: format!("cannot open '{}': {e}", weights_path.display()),
            })?;
        let mmap =
            unsafe { memmap2::Mmap::map(&file) }.map_err(|e| super::ForwardError::WeightLoad {
                layer: "init".into(),
                detail: format!("mmap failed: {e}"),
            })?;

        tracing::info!(
            "weight loader: mmap'd {} ({:.2} MB)",
            weights_path.display(),
            mmap.len() as f64 / (1024.0 * 1024.0),
        );

        Ok(Self {
            weights_path: weights_path.to_path_buf(),
            mmap,
        })
    }

    /// Returns the path of the underlying weight file.
    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    /// Loads all weight tensors for a given layer, in the order the
    /// layer's `weight_names` lists them.
    pub fn load_layer_weights(&self, layer: &LayerDef) -> Result<Vec<Tensor>, super::ForwardError> {
        let st = safetensors::SafeTensors::deserialize(&self.mmap).map_err(|e| {
            super::ForwardError::WeightLoad {
                layer: layer.name.clone(),
                detail: format!("SafeTensors parse error: {e}"),
            }
        })?;

        let mut tensors = Vec::with_capacity(layer.weight_names.len());

        for (i, wname) in layer.weight_names.iter().enumerate() {
            let view = st
                .tensor(wname)
                .map_err(|e| super::ForwardError::WeightLoad {
                    layer: layer.name.clone(),
                    detail: format!("tensor '{wname}' not found: {e}"),
                })?;

            let expected_shape = &layer.weight_shapes[i];
            let data = decode_f32_le(view.data());
            let tensor = Tensor::from_vec(expected_shape.clone(), data).map_err(|e| {
                super::ForwardError::WeightLoad {
                    layer: layer.name.clone(),
                    detail: format!("tensor '{wname}' size mismatch: {e}"),
                }
            })?;

            tensors.push(tensor);
        }

        Ok(tensors)
    }
}

/// Decodes a little-endian f32 byte buffer. Trailing bytes that do not
/// form a full f32 are dropped; the shape check downstream catches the
/// mismatch.
fn decode_f32_le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

impl std::fmt::Debug for WeightLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightLoader")
            .field("weights_path", &self.weights_path)
            .field("mapped_bytes", &self.mmap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::LayerOp;
    use safetensors::{serialize_to_file, Dtype};
    use std::collections::HashMap;
    use tensor_core::Shape;

    fn write_test_safetensors(path: &Path) {
        let weight: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let bias: Vec<f32> = vec![0.5, -0.5, 1.5];
        let weight_bytes: Vec<u8> = weight.iter().flat_map(|v| v.to_le_bytes()).collect();
        let bias_bytes: Vec<u8> = bias.iter().flat_map(|v| v.to_le_bytes()).collect();

        let mut tensors = HashMap::new();
        tensors.insert(
            "ip.weight".to_string(),
            safetensors::tensor::TensorView::new(Dtype::F32, vec![3, 4], &weight_bytes).unwrap(),
        );
        tensors.insert(
            "ip.bias".to_string(),
            safetensors::tensor::TensorView::new(Dtype::F32, vec![3], &bias_bytes).unwrap(),
        );
        serialize_to_file(&tensors, &None, path).unwrap();
    }

    fn sample_layer() -> LayerDef {
        LayerDef {
            name: "ip".into(),
            op: LayerOp::InnerProduct { num_output: 3 },
            index: 0,
            weight_names: vec!["ip.weight".into(), "ip.bias".into()],
            weight_shapes: vec![Shape::matrix(3, 4), Shape::vector(3)],
            input_shape: Shape::nchw(1, 4, 1, 1),
            output_shape: Shape::nchw(1, 3, 1, 1),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let result = WeightLoader::open(Path::new("/nonexistent/w.safetensors"));
        assert!(matches!(
            result,
            Err(crate::ForwardError::WeightLoad { .. })
        ));
    }

    #[test]
    fn test_load_layer_weights() {
        let path = std::env::temp_dir().join(format!(
            "actprobe_weights_{}.safetensors",
            std::process::id()
        ));
        write_test_safetensors(&path);

        let loader = WeightLoader::open(&path).unwrap();
        let weights = loader.load_layer_weights(&sample_layer()).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].shape(), &Shape::matrix(3, 4));
        assert_eq!(weights[0].as_slice()[5], 5.0);
        assert_eq!(weights[1].as_slice(), &[0.5, -0.5, 1.5]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_tensor_name() {
        let path = std::env::temp_dir().join(format!(
            "actprobe_weights_missing_{}.safetensors",
            std::process::id()
        ));
        write_test_safetensors(&path);

        let loader = WeightLoader::open(&path).unwrap();
        let mut layer = sample_layer();
        layer.weight_names[0] = "bogus".into();
        let result = loader.load_layer_weights(&layer);
        assert!(matches!(
            result,
            Err(crate::ForwardError::WeightLoad { .. })
        ));

        std::fs::remove_file(&path).ok();
    }
}
