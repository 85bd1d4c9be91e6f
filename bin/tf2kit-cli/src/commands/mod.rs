// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI plumbing.

pub mod export;
pub mod generate;
pub mod inspect;
pub mod plot;
pub mod set_config;
pub mod signature;

use std::path::PathBuf;

use saved_model::SignatureOptions;
use tracing_subscriber::EnvFilter;

use crate::config::ModelSection;

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Model directory and signature selection shared by several commands.
#[derive(Debug, clap::Args)]
pub struct ModelArgs {
    /// Path to the model directory.
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Comma-separated tag set of the meta graph.
    #[arg(long)]
    pub tag_set: Option<String>,

    /// Signature key within the meta graph.
    #[arg(long)]
    pub signature_key: Option<String>,
}

impl ModelArgs {
    /// Overlays the flags on the `[model]` section.
    pub fn resolve(self, section: &ModelSection) -> (PathBuf, SignatureOptions) {
        let mut options = section.signature_options();
        if let Some(tag_set) = self.tag_set {
            options.tag_set = tag_set;
        }
        if let Some(key) = self.signature_key {
            options.signature_key = key;
        }
        (self.model.unwrap_or_else(|| section.path.clone()), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_args_override() {
        let section = ModelSection::default();
        let args = ModelArgs {
            model: Some(PathBuf::from("/m")),
            tag_set: None,
            signature_key: Some("predict".into()),
        };
        let (path, options) = args.resolve(&section);
        assert_eq!(path, PathBuf::from("/m"));
        assert_eq!(options.tag_set, "serve");
        assert_eq!(options.signature_key, "predict");
    }

    #[test]
    fn test_model_args_defaults() {
        let args = ModelArgs {
            model: None,
            tag_set: None,
            signature_key: None,
        };
        let (path, options) = args.resolve(&ModelSection::default());
        assert_eq!(path, PathBuf::from("./SavedModel"));
        assert_eq!(options, SignatureOptions::default());
    }
}
