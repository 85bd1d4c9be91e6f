// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # saved-model
//!
//! Reads and writes the metadata of TensorFlow SavedModel directories
//! without linking against TensorFlow.
//!
//! Only the part of `saved_model.pb` that describes *how to call* a model
//! is interpreted: meta-graph tags and serving signatures. Graph
//! definitions, object graphs and everything else are skipped while
//! decoding.
//!
//! - [`SavedModelDir`]: a loaded `saved_model.pb` plus meta-graph and
//!   signature lookup.
//! - [`SignatureDescriptor`]: the JSON-friendly view of one signature,
//!   produced by [`extract_signature`].
//! - [`SavedModelBuilder`]: writes a `saved_model.pb` with given tags and
//!   signatures (used by the model exporter and by tests).
//!
//! # Example
//! ```no_run
//! use saved_model::{extract_signature, SignatureOptions};
//! use std::path::Path;
//!
//! let sig = extract_signature(Path::new("./SavedModel"), &SignatureOptions::default()).unwrap();
//! for (key, spec) in &sig.inputs {
//!     println!("{key}: {} {:?}", spec.name, spec.shape);
//! }
//! ```

mod error;
mod fsutil;
mod loader;
pub mod proto;
mod signature;
mod writer;

pub use error::SavedModelError;
pub use fsutil::write_atomic;
pub use loader::{SavedModelDir, TagSet};
pub use signature::{extract_signature, SignatureDescriptor, SignatureOptions, TensorSpec};
pub use writer::{SavedModelBuilder, SignatureBuilder};

/// File holding the serialized `SavedModel` protobuf.
pub const SAVED_MODEL_FILENAME: &str = "saved_model.pb";

/// Text-format variant of [`SAVED_MODEL_FILENAME`]; recognised but not decoded.
pub const SAVED_MODEL_TEXT_FILENAME: &str = "saved_model.pbtxt";

/// File written next to `saved_model.pb` when signature dumping is enabled.
pub const SIGNATURE_DUMP_FILENAME: &str = "inout_sign.json";

/// Tag set of the graph variant used for serving.
pub const DEFAULT_TAG_SET: &str = "serve";

/// Key of the signature exported by default for serving.
pub const DEFAULT_SIGNATURE_KEY: &str = "serving_default";

/// `method_name` recorded on predict signatures.
pub const PREDICT_METHOD_NAME: &str = "tensorflow/serving/predict";
