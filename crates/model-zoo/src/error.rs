// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model construction, export and loading.

use std::path::PathBuf;

/// Errors that can occur when building, exporting or loading a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A file or directory could not be read or written.
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// A weight tensor the architecture needs is missing from the weight file.
    #[error("weight tensor not found: {name}")]
    WeightNotFound { name: String },

    /// A weight tensor exists but with a different shape.
    #[error("weight tensor '{name}' has shape {found}, expected {expected}")]
    WeightShapeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// The SafeTensors file could not be loaded.
    #[error("failed to load SafeTensors: {0}")]
    SafeTensors(String),

    /// A layer definition is invalid.
    #[error("invalid layer '{layer}': {detail}")]
    InvalidLayer { layer: String, detail: String },

    /// The model graph is malformed.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),

    /// The variant name is not one of `b0`..`b7`.
    #[error("unknown EfficientNet variant '{0}' (expected b0..b7)")]
    UnknownVariant(String),

    /// Writing `saved_model.pb` failed.
    #[error(transparent)]
    SavedModel(#[from] saved_model::SavedModelError),
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
