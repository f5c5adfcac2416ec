// Copyright (c) 2026 Actprobe Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # actprobe
//!
//! Runs a small convolutional network over a single image and dumps
//! the input tensor plus every activation up to a chosen layer as
//! plain-text files, one value per line.
//!
//! ## Usage
//! ```bash
//! # Dump the input and the first layer's activation
//! actprobe -n imc.json -w imc.safetensors -i test.jpg -l 0
//!
//! # Dump everything up to layer 3 into ./dumps
//! actprobe -n imc.json -w imc.safetensors -i test.jpg -l 3 -o ./dumps
//!
//! # Print the layer table without running anything
//! actprobe -n imc.json -w imc.safetensors --inspect
//! ```

mod dump;
mod probe;

use clap::Parser;
use forward_rt::ProbeConfig;

#[derive(Parser, Debug)]
#[command(
    name = "actprobe",
    about = "Per-layer activation dump tool for small convolutional networks",
    version,
    author
)]
struct Cli {
    /// Path to the network topology JSON file.
    #[arg(short = 'n', long, default_value = "imc.json")]
    network: std::path::PathBuf,

    /// Path to the SafeTensors weight file.
    #[arg(short = 'w', long, default_value = "imc.safetensors")]
    weights: std::path::PathBuf,

    /// Index of the last layer to execute and dump (0-based).
    #[arg(short = 'l', long, default_value_t = 0)]
    tolayer: usize,

    /// Path to the input image.
    #[arg(short = 'i', long, default_value = "test.jpg")]
    image: std::path::PathBuf,

    /// Directory the dump files are written into.
    #[arg(short = 'o', long, default_value = ".")]
    out_dir: std::path::PathBuf,

    /// Path to a TOML configuration file (overrides the other arguments).
    #[arg(short = 'c', long)]
    config: Option<std::path::PathBuf>,

    /// Print the layer table and exit without running the network.
    #[arg(long)]
    inspect: bool,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Resolves the run configuration: the TOML file when given,
    /// otherwise the command-line arguments.
    fn resolve_config(&self) -> anyhow::Result<ProbeConfig> {
        if let Some(path) = &self.config {
            return Ok(ProbeConfig::from_file(path)?);
        }
        Ok(ProbeConfig {
            network: self.network.clone(),
            weights: self.weights.clone(),
            tolayer: self.tolayer,
            image: self.image.clone(),
            out_dir: self.out_dir.clone(),
        })
    }
}

/// Initialises tracing based on verbosity count.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

/// Exit code for an argument-parse outcome that stops the run.
///
/// `--help` prints usage and exits 1: a run that produced no dumps is
/// never reported as success. Other parse failures use clap's usual 2.
fn parse_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        clap::error::ErrorKind::DisplayHelp => 1,
        clap::error::ErrorKind::DisplayVersion => 0,
        _ => 2,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let code = parse_exit_code(&err);
        let _ = err.print();
        std::process::exit(code);
    });
    init_tracing(cli.verbose);

    let config = cli.resolve_config()?;
    if cli.inspect {
        probe::inspect(&config)
    } else {
        probe::execute(&config)
    }
}
