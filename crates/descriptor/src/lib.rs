// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # descriptor
//!
//! The input-descriptor file (`inpfile.json`) consumed by downstream
//! inference wrappers. It accumulates:
//!
//! - `path_to_model`, `inputs_id`, `inputs_dim`, `outputs_id`,
//!   `outputs_dim`, written by [`generate`] from the model's serving
//!   signature;
//! - `config`, the hex-token session configuration, written by
//!   [`set_session_config`];
//! - optional consumer settings `rowmajor`, `batch_size`, `env`, written
//!   by [`set_runtime_keys`].
//!
//! Every writer goes through [`DescriptorFile`], which loads the existing
//! object, updates only its own keys and writes the whole object back, so
//! the writers can run in any order without clobbering each other.

mod check;
mod error;
mod file;
mod generate;
mod inject;
mod typed;

pub use check::{check_descriptor, DescriptorIssue};
pub use error::DescriptorError;
pub use file::DescriptorFile;
pub use generate::{generate, signature_entries};
pub use inject::{set_runtime_keys, set_session_config, RuntimeKeys};
pub use typed::InputDescriptor;

/// File name of the descriptor inside a model directory.
pub const INPFILE_NAME: &str = "inpfile.json";

/// Keys written by [`generate`].
pub const GENERATED_KEYS: [&str; 5] = [
    "path_to_model",
    "inputs_id",
    "inputs_dim",
    "outputs_id",
    "outputs_dim",
];

/// Key holding the hex-token session configuration.
pub const CONFIG_KEY: &str = "config";
