// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model loading and IR construction.

/// Errors that can occur when working with model representations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The topology file could not be read.
    #[error("failed to read topology: {0}")]
    TopologyRead(#[from] std::io::Error),

    /// The topology JSON is malformed.
    #[error("failed to parse topology: {0}")]
    TopologyParse(#[from] serde_json::Error),

    /// A weight tensor referenced in the topology was not found in the
    /// SafeTensors file.
    #[error("weight tensor not found: {name}")]
    WeightNotFound { name: String },

    /// The SafeTensors file could not be loaded.
    #[error("failed to load SafeTensors: {0}")]
    SafeTensors(String),

    /// A weight tensor is stored in a dtype this tool does not process.
    #[error("weight tensor '{name}' has unsupported dtype {dtype} (expected F32)")]
    UnsupportedDType { name: String, dtype: String },

    /// A layer definition is invalid (missing parameters, bad geometry,
    /// inconsistent weight shapes).
    #[error("invalid layer '{layer}': {detail}")]
    InvalidLayer { layer: String, detail: String },

    /// The model graph as a whole is malformed.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),
}
