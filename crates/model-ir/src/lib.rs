// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! A lightweight intermediate representation (IR) for the feed-forward
//! convolutional networks actprobe dumps activations from.
//!
//! Rather than depending on a heavyweight inference framework, this
//! crate defines a minimal IR that captures what the probe needs:
//!
//! - [`LayerOp`] — the kind of computation each layer performs, with
//!   its geometry parameters.
//! - [`LayerDef`] — a single layer's metadata, weight references, and
//!   inferred activation shapes.
//! - [`ModelGraph`] — the full network as an ordered layer chain, with
//!   a **type-state pattern** (`Loaded` → `Validated`).
//! - [`ModelLoader`] — loads models from a JSON topology + SafeTensors
//!   weight file.
//! - [`Topology`] — the JSON network descriptor.
//!
//! # Supported Model Format
//! A model is stored as two files:
//! - a topology file (JSON) describing the input shape and layer chain;
//! - a weights file in HuggingFace SafeTensors format, f32 tensors
//!   keyed by the names the topology lists per layer.
//!
//! # Example
//! ```no_run
//! use model_ir::ModelLoader;
//! use std::path::Path;
//!
//! let graph =
//!     ModelLoader::load(Path::new("imc.json"), Path::new("imc.safetensors")).unwrap();
//! println!("{}", graph.summary());
//! for layer in graph.iter_layers() {
//!     println!("  {}", layer.summary());
//! }
//! ```

mod error;
pub mod graph;
mod layer;
mod loader;
mod topology;

pub use error::ModelError;
pub use graph::ModelGraph;
pub use layer::{LayerDef, LayerOp};
pub use loader::{ModelLoader, WeightMeta};
pub use topology::{Topology, TopologyLayer};
