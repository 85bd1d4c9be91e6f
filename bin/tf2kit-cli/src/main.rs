// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tf2kit
//!
//! Command-line tools around a TensorFlow deployment workflow.
//!
//! ## Usage
//! ```bash
//! # Export EfficientNetB0 and print its layer table
//! tf2kit export --variant b0 --output model
//!
//! # Write model/inpfile.json from the serving signature
//! tf2kit generate --model model
//!
//! # Store a session configuration in the descriptor
//! tf2kit set-config --inpfile model/inpfile.json --threads 4 --memory-fraction 0.5
//!
//! # Compare predictions against ground truth
//! tf2kit plot --truth true.csv --pred ../output/pred.csv
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tf2kit",
    about = "Export, describe and configure TensorFlow models; plot their results",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file; command-line flags override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an EfficientNet classifier, print its summary and export it.
    Export {
        /// Variant b0..b7.
        #[arg(long)]
        variant: Option<String>,

        /// Number of output classes.
        #[arg(long)]
        classes: Option<u32>,

        /// Output model directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretrained SafeTensors weights to verify and copy.
        #[arg(short, long)]
        weights: Option<PathBuf>,
    },

    /// Print the serving signature of a model as JSON.
    Signature {
        #[command(flatten)]
        model: commands::ModelArgs,

        /// Also write inout_sign.json into the model directory.
        #[arg(long)]
        dump: bool,
    },

    /// Write inpfile.json from the serving signature.
    Generate {
        #[command(flatten)]
        model: commands::ModelArgs,
    },

    /// Store the session configuration in an existing inpfile.json.
    SetConfig(commands::set_config::SetConfigArgs),

    /// Show signature, descriptor consistency and architecture of a model.
    Inspect {
        #[command(flatten)]
        model: commands::ModelArgs,
    },

    /// Plot predictions against ground truth.
    Plot {
        /// Ground-truth CSV.
        #[arg(long)]
        truth: Option<PathBuf>,

        /// Prediction table.
        #[arg(long)]
        pred: Option<PathBuf>,

        /// Directory for the PNG files.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// TrueType font for labels.
        #[arg(long)]
        font: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = config::ToolkitConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Export {
            variant,
            classes,
            output,
            weights,
        } => commands::export::execute(config.export, variant, classes, output, weights),
        Commands::Signature { model, dump } => {
            commands::signature::execute(model.resolve(&config.model), dump)
        }
        Commands::Generate { model } => commands::generate::execute(model.resolve(&config.model)),
        Commands::SetConfig(args) => commands::set_config::execute(config.session, args),
        Commands::Inspect { model } => commands::inspect::execute(model.resolve(&config.model)),
        Commands::Plot {
            truth,
            pred,
            output_dir,
            font,
        } => commands::plot::execute(config.plot, truth, pred, output_dir, font),
    }
}
