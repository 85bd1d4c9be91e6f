// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for table reading and plot rendering.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// A file or directory could not be read or written.
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed (bad quoting, unequal record lengths, ...).
    #[error("failed to read CSV '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A field is not a number.
    #[error("'{}' line {line}: '{value}' is not a number", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// A row is shorter than a column the configuration refers to, or rows
    /// have differing widths.
    #[error("'{}' line {line}: expected {expected} column(s), found {found}", path.display())]
    MissingColumn {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Truth and prediction tables cannot be compared.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// No row has a strictly positive time value.
    #[error("nothing to plot: {0}")]
    Empty(String),

    /// The drawing backend failed.
    #[error("rendering '{}' failed: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

impl PlotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
