// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Plain-text activation dump files.
//!
//! Two file kinds, both one value per line in channel-major order:
//!
//! - `input.out` — the packed input tensor, values only.
//! - `layer<i>.out` — layer `i`'s activation, preceded by a single
//!   header line `n c h w` giving the activation shape.

use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use tensor_core::Tensor;

/// Writes the input tensor to `<dir>/input.out`.
///
/// Returns the path of the written file.
pub fn write_input(dir: &Path, input: &Tensor) -> anyhow::Result<PathBuf> {
    let path = dir.join("input.out");
    let file = std::fs::File::create(&path)
        .with_context(|| format!("cannot create '{}'", path.display()))?;
    let mut w = std::io::BufWriter::new(file);

    for v in input.as_slice() {
        writeln!(w, "{v}")?;
    }
    w.flush()?;

    Ok(path)
}

/// Writes layer `index`'s activation to `<dir>/layer<index>.out`.
///
/// The first line is the shape header `n c h w`; the remaining lines
/// are the values. Returns the path of the written file.
pub fn write_layer(dir: &Path, index: usize, activation: &Tensor) -> anyhow::Result<PathBuf> {
    let (n, c, h, w_dim) = activation
        .shape()
        .nchw_dims()
        .with_context(|| format!("layer {index} activation is not rank-4 NCHW"))?;

    let path = dir.join(format!("layer{index}.out"));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("cannot create '{}'", path.display()))?;
    let mut w = std::io::BufWriter::new(file);

    writeln!(w, "{n} {c} {h} {w_dim}")?;
    for v in activation.as_slice() {
        writeln!(w, "{v}")?;
    }
    w.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::Shape;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("actprobe_dump_{tag}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_write_input_one_value_per_line() {
        let dir = temp_dir("input");
        let tensor =
            Tensor::from_vec(Shape::nchw(1, 1, 2, 2), vec![0.0, 255.0, 7.0, 12.5]).unwrap();

        let path = write_input(&dir, &tensor).unwrap();
        assert!(path.ends_with("input.out"));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["0", "255", "7", "12.5"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_layer_header_then_values() {
        let dir = temp_dir("layer");
        let tensor =
            Tensor::from_vec(Shape::nchw(1, 2, 1, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        let path = write_layer(&dir, 3, &tensor).unwrap();
        assert!(path.ends_with("layer3.out"));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "1 2 1 2");
        assert_eq!(&lines[1..], &["1", "2", "3", "4"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_layer_rejects_non_nchw() {
        let dir = temp_dir("badshape");
        let tensor = Tensor::from_vec(Shape::new(vec![4]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(write_layer(&dir, 0, &tensor).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
