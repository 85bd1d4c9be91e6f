// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # session-config
//!
//! Builds TensorFlow session configurations and transports them as text.
//!
//! A [`SessionOptions`] value (GPU memory growth, thread counts, GPU memory
//! fraction, visible devices) is converted into TensorFlow's `ConfigProto`,
//! serialised with the canonical protobuf encoding, and each byte is
//! rendered as a two-character hex token. The token list is what the JSON
//! descriptor stores under `config`; a consumer in any language turns it
//! back into bytes and hands them to `TFE_ContextOptionsSetConfig`.
//!
//! # Example
//! ```
//! use session_config::SessionOptions;
//!
//! let opts = SessionOptions { num_threads: 4, ..Default::default() };
//! let tokens = opts.create_serialized_options();
//! assert_eq!(SessionOptions::from_hex_tokens(&tokens).unwrap(), opts);
//! ```

mod error;
pub mod hex;
mod options;
pub mod proto;

pub use error::SessionConfigError;
pub use options::SessionOptions;
