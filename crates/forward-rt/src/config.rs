// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Probe configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! network = "imc.json"
//! weights = "imc.safetensors"
//! tolayer = 0
//! image = "test.jpg"
//! out_dir = "."
//! ```

use std::path::{Path, PathBuf};

/// Configuration for a single probe run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProbeConfig {
    /// Path to the network topology JSON file.
    pub network: PathBuf,
    /// Path to the SafeTensors weight file.
    pub weights: PathBuf,
    /// Index of the last layer to execute and dump (0-based).
    #[serde(default)]
    pub tolayer: usize,
    /// Path to the input image.
    pub image: PathBuf,
    /// Directory the dump files are written into.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ProbeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::ForwardError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::ForwardError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::ForwardError> {
        toml::from_str(toml_str)
            .map_err(|e| super::ForwardError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::ForwardError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::ForwardError::Config(format!("TOML serialise error: {e}")))
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            network: PathBuf::from("imc.json"),
            weights: PathBuf::from("imc.safetensors"),
            tolayer: 0,
            image: PathBuf::from("test.jpg"),
            out_dir: default_out_dir(),
        }
    }
}
