// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # forward-rt
//!
//! The single-threaded forward-pass runtime for actprobe.
//!
//! This crate executes a validated [`model_ir::ModelGraph`] layer by
//! layer over a bound input tensor, keeping every intermediate
//! activation so callers can inspect any layer after the fact:
//!
//! - [`ForwardNet`] — the executor, with a **type-state pattern**
//!   (`Idle` → `Loaded` → `Primed`) enforcing the load/bind/run order
//!   at compile time.
//! - [`WeightLoader`] — on-demand weight loading from a memory-mapped
//!   SafeTensors file.
//! - [`ProbeConfig`] — TOML-backed run configuration.
//!
//! Execution is deliberately synchronous and single-threaded: the
//! point of the probe is byte-for-byte reproducible activations, and
//! a serial pass over small networks keeps the arithmetic order fixed.

mod config;
pub mod engine;
mod error;
mod weight_loader;

pub use config::ProbeConfig;
pub use engine::ForwardNet;
pub use error::ForwardError;
pub use weight_loader::WeightLoader;
