// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor metadata conversions.

/// Errors that can occur when interpreting tensor metadata.
#[derive(Debug, thiserror::Error)]
pub enum TensorMetaError {
    /// A dtype name could not be parsed.
    #[error("unrecognised dtype '{0}'")]
    UnknownDTypeName(String),
}
