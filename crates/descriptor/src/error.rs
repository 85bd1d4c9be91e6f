// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for descriptor generation and updates.

use std::path::PathBuf;

/// Errors that can occur when reading, generating or updating a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The descriptor file could not be read or written.
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The descriptor file is not valid JSON.
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The descriptor file holds valid JSON that is not an object.
    #[error("'{}' does not contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    /// A value could not be converted to or from JSON.
    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the model's signature failed.
    #[error(transparent)]
    SavedModel(#[from] saved_model::SavedModelError),

    /// The stored session configuration could not be decoded.
    #[error(transparent)]
    SessionConfig(#[from] session_config::SessionConfigError),

    /// A signature tensor has no dimension after the batch axis.
    #[error("{section} tensor '{key}' has shape {shape:?}; expected [batch, features, ...]")]
    MissingFeatureDim {
        section: String,
        key: String,
        shape: Vec<String>,
    },
}

impl DescriptorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
