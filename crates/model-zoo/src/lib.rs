// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-zoo
//!
//! A lightweight intermediate representation (IR) for image classifiers,
//! plus the EfficientNet family and an exporter to the SavedModel layout.
//!
//! - [`LayerType`] / [`LayerDef`]: Keras-style layers with weight shapes.
//! - [`ModelGraph`]: the model as a DAG of layers, with a **type-state
//!   pattern** (`Loaded` → `Validated`).
//! - [`EfficientNetBuilder`]: B0–B7 with the Keras layer names and
//!   parameter counts.
//! - [`ModelExporter`]: writes `saved_model.pb`, `model.json` and
//!   `variables/`, optionally verifying pretrained SafeTensors weights.
//! - [`ExportedModelLoader`]: reads such a directory back.
//!
//! # Example
//! ```no_run
//! use model_zoo::{EfficientNetVariant, ModelExporter};
//! use std::path::Path;
//!
//! let exporter = ModelExporter::efficientnet(EfficientNetVariant::B0, 1000).unwrap();
//! print!("{}", exporter.graph().render_summary());
//! exporter.export(Path::new("model")).unwrap();
//! ```

mod efficientnet;
mod error;
mod export;
pub mod graph;
mod layer;
mod loader;
mod manifest;
mod weights;

pub use efficientnet::{EfficientNetBuilder, EfficientNetVariant, IMAGENET_CLASSES};
pub use error::ModelError;
pub use export::{ExportSummary, ModelExporter, SERVING_OUTPUT_TENSOR};
pub use graph::ModelGraph;
pub use layer::{LayerDef, LayerType};
pub use loader::ExportedModelLoader;
pub use manifest::{ManifestLayer, ManifestWeight, ModelManifest};
pub use weights::{WeightFile, WeightMeta};

/// Architecture manifest inside an exported model directory.
pub const MANIFEST_FILE: &str = "model.json";

/// Directory holding the weight file.
pub const VARIABLES_DIR: &str = "variables";

/// Weight file inside [`VARIABLES_DIR`].
pub const WEIGHTS_FILE: &str = "variables.safetensors";
