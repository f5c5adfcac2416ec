// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The probe run: load, bind, forward, dump.

use crate::dump;
use anyhow::Context;
use forward_rt::{ForwardNet, ProbeConfig};
use image_input::{to_input_tensor, Raster};

/// Runs the network over the configured image and dumps the input plus
/// every activation up to `tolayer`.
pub fn execute(config: &ProbeConfig) -> anyhow::Result<()> {
    tracing::info!("reading {}", config.network.display());
    let net = ForwardNet::new().load_model(&config.network, &config.weights)?;

    let num_layers = net.num_layers();
    anyhow::ensure!(
        config.tolayer < num_layers,
        "tolayer {} out of range: '{}' has {} layers",
        config.tolayer,
        config.network.display(),
        num_layers,
    );

    tracing::info!("reading {}", config.image.display());
    let raster = Raster::open(&config.image)?;
    let input = to_input_tensor(&raster, net.graph().input_elements())?;

    let mut net = net.bind_input(input)?;

    std::fs::create_dir_all(&config.out_dir).with_context(|| {
        format!("cannot create output directory '{}'", config.out_dir.display())
    })?;

    tracing::info!("dumping input data");
    let path = dump::write_input(&config.out_dir, net.input())?;
    tracing::debug!("wrote {}", path.display());

    net.forward_to(config.tolayer)?;
    for i in 0..=config.tolayer {
        let activation = net
            .activation(i)
            .context("activation missing after forward pass")?;
        let name = &net.graph().layer(i).context("layer index out of range")?.name;
        tracing::info!("dumping layer {i} ({name})");
        let path = dump::write_layer(&config.out_dir, i, activation)?;
        tracing::debug!("wrote {}", path.display());
    }

    Ok(())
}

/// Prints the network's layer table without executing anything.
pub fn inspect(config: &ProbeConfig) -> anyhow::Result<()> {
    let net = ForwardNet::new().load_model(&config.network, &config.weights)?;
    let graph = net.graph();

    println!("{}", graph.summary());
    for layer in graph.iter_layers() {
        println!("  {}", layer.summary());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use safetensors::{serialize_to_file, Dtype};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    /// Writes a 4-layer model (conv → relu → ip → softmax over a
    /// 1x4x4 input) and a matching grayscale image into `dir`.
    fn write_fixture(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        std::fs::create_dir_all(dir).unwrap();

        let topology = dir.join("net.json");
        std::fs::write(
            &topology,
            r#"{
                "name": "probe-net",
                "input_shape": [1, 1, 4, 4],
                "layers": [
                    { "name": "conv1", "kind": "convolution", "num_output": 1,
                      "kernel": 2, "stride": 2,
                      "weights": ["conv1.weight", "conv1.bias"] },
                    { "name": "relu1", "kind": "relu" },
                    { "name": "ip1", "kind": "inner_product", "num_output": 2,
                      "weights": ["ip1.weight", "ip1.bias"] },
                    { "name": "prob", "kind": "softmax" }
                ]
            }"#,
        )
        .unwrap();

        let to_bytes =
            |values: &[f32]| -> Vec<u8> { values.iter().flat_map(|v| v.to_le_bytes()).collect() };
        let conv_w = to_bytes(&[0.25; 4]);
        let conv_b = to_bytes(&[1.0]);
        let ip_w = to_bytes(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let ip_b = to_bytes(&[0.5, -0.5]);

        let mut tensors = HashMap::new();
        tensors.insert(
            "conv1.weight".to_string(),
            safetensors::tensor::TensorView::new(Dtype::F32, vec![1, 1, 2, 2], &conv_w).unwrap(),
        );
        tensors.insert(
            "conv1.bias".to_string(),
            safetensors::tensor::TensorView::new(Dtype::F32, vec![1], &conv_b).unwrap(),
        );
        tensors.insert(
            "ip1.weight".to_string(),
            safetensors::tensor::TensorView::new(Dtype::F32, vec![2, 4], &ip_w).unwrap(),
        );
        tensors.insert(
            "ip1.bias".to_string(),
            safetensors::tensor::TensorView::new(Dtype::F32, vec![2], &ip_b).unwrap(),
        );
        let weights = dir.join("net.safetensors");
        serialize_to_file(&tensors, &None, &weights).unwrap();

        let img = image::GrayImage::from_fn(4, 4, |x, y| image::Luma([(10 * (y * 4 + x)) as u8]));
        let image_path = dir.join("gray.png");
        img.save(&image_path).unwrap();

        (topology, weights, image_path)
    }

    fn fixture_config(tag: &str, tolayer: usize) -> ProbeConfig {
        let dir = std::env::temp_dir().join(format!("actprobe_probe_{tag}_{}", std::process::id()));
        let (network, weights, image) = write_fixture(&dir);
        ProbeConfig {
            network,
            weights,
            tolayer,
            image,
            out_dir: dir.join("out"),
        }
    }

    fn dump_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_execute_writes_one_file_per_dump() {
        let config = fixture_config("count", 3);
        execute(&config).unwrap();

        // Input plus layers 0..=3.
        assert_eq!(
            dump_names(&config.out_dir),
            vec!["input.out", "layer0.out", "layer1.out", "layer2.out", "layer3.out"],
        );

        let input = std::fs::read_to_string(config.out_dir.join("input.out")).unwrap();
        assert_eq!(input.lines().count(), 16);
        assert_eq!(input.lines().next(), Some("0"));

        std::fs::remove_dir_all(config.out_dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_execute_reruns_are_byte_identical() {
        let first = fixture_config("rerun_a", 2);
        let second = fixture_config("rerun_b", 2);
        execute(&first).unwrap();
        execute(&second).unwrap();

        let names = dump_names(&first.out_dir);
        assert_eq!(names, dump_names(&second.out_dir));
        for name in names {
            let a = std::fs::read(first.out_dir.join(&name)).unwrap();
            let b = std::fs::read(second.out_dir.join(&name)).unwrap();
            assert_eq!(a, b, "dump '{name}' differs between runs");
        }

        std::fs::remove_dir_all(first.out_dir.parent().unwrap()).ok();
        std::fs::remove_dir_all(second.out_dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_execute_rejects_out_of_range_tolayer() {
        let config = fixture_config("range", 4);
        let result = execute(&config);
        assert!(result.is_err());
        // The range check fires before any dump is written.
        assert!(!config.out_dir.exists());

        std::fs::remove_dir_all(config.out_dir.parent().unwrap()).ok();
    }
}
