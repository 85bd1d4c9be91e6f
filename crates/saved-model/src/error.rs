// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for SavedModel reading and writing.

use std::path::PathBuf;

/// Errors that can occur when working with SavedModel directories.
#[derive(Debug, thiserror::Error)]
pub enum SavedModelError {
    /// The path does not contain a loadable `saved_model.pb`.
    #[error("no SavedModel found at '{}'", path.display())]
    NotFound { path: PathBuf },

    /// The directory holds only a text-format `saved_model.pbtxt`.
    #[error("'{}' is a text-format SavedModel; only binary saved_model.pb is supported", path.display())]
    TextFormat { path: PathBuf },

    /// Reading or writing a file failed.
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `saved_model.pb` is not a valid `SavedModel` protobuf.
    #[error("failed to decode SavedModel protobuf: {0}")]
    Decode(#[from] prost::DecodeError),

    /// No meta graph carries exactly the requested tag set.
    #[error("MetaGraphDef associated with tag-set '{requested}' could not be found; available tag-sets: {available:?}")]
    TagSetNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// The meta graph has no signature under the requested key.
    #[error("signature '{key}' not found in meta graph; available signatures: {available:?}")]
    SignatureNotFound { key: String, available: Vec<String> },

    /// A signature could not be rendered as JSON.
    #[error("failed to serialise signature: {0}")]
    Json(#[from] serde_json::Error),
}

impl SavedModelError {
    /// Returns `true` for failures caused by a tag set or signature key
    /// that does not exist in an otherwise loadable model.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::TagSetNotFound { .. } | Self::SignatureNotFound { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
