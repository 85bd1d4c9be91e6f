// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for session configuration decoding.

/// Errors that can occur when turning hex tokens back into a configuration.
#[derive(Debug, thiserror::Error)]
pub enum SessionConfigError {
    /// A token is not a one- or two-digit hex byte.
    #[error("invalid hex token #{index}: '{token}'")]
    InvalidToken { index: usize, token: String },

    /// The decoded bytes are not a valid `ConfigProto`.
    #[error("failed to decode ConfigProto: {0}")]
    Decode(#[from] prost::DecodeError),
}
