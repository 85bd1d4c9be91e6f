// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Writing a validated graph to a SavedModel-layout directory.
//!
//! ```text
//! <dir>/
//!   saved_model.pb                   serving signature (tag "serve")
//!   model.json                       architecture manifest
//!   variables/
//!     variables.safetensors          only when pretrained weights were given
//! ```

use std::path::{Path, PathBuf};

use saved_model::{SavedModelBuilder, SignatureBuilder, DEFAULT_SIGNATURE_KEY, DEFAULT_TAG_SET};
use tensor_meta::DataType;

use crate::efficientnet::{EfficientNetBuilder, EfficientNetVariant};
use crate::graph::Validated;
use crate::weights::WeightFile;
use crate::{ModelError, ModelGraph, ModelManifest, MANIFEST_FILE, VARIABLES_DIR, WEIGHTS_FILE};

/// Graph-level name of the serving output tensor.
pub const SERVING_OUTPUT_TENSOR: &str = "StatefulPartitionedCall:0";

/// What [`ModelExporter::export`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub model_dir: PathBuf,
    pub saved_model: PathBuf,
    pub manifest: PathBuf,
    /// Copied weight file, if pretrained weights were supplied.
    pub weights: Option<PathBuf>,
    pub total_params: u64,
}

/// Exports a validated graph together with its serving signature.
#[derive(Debug, Clone)]
pub struct ModelExporter {
    graph: ModelGraph<Validated>,
    architecture: String,
    variant: Option<String>,
    weights: Option<PathBuf>,
}

impl ModelExporter {
    pub fn new(graph: ModelGraph<Validated>, architecture: &str) -> Self {
        Self {
            graph,
            architecture: architecture.to_string(),
            variant: None,
            weights: None,
        }
    }

    /// Builds and validates an EfficientNet classifier.
    pub fn efficientnet(variant: EfficientNetVariant, classes: u32) -> Result<Self, ModelError> {
        let graph = EfficientNetBuilder::new(variant).classes(classes).build().validate()?;
        Ok(Self {
            variant: Some(variant.as_str().to_string()),
            ..Self::new(graph, "efficientnet")
        })
    }

    /// Pretrained weights to verify and ship in `variables/`.
    pub fn with_weights(mut self, path: impl Into<PathBuf>) -> Self {
        self.weights = Some(path.into());
        self
    }

    pub fn graph(&self) -> &ModelGraph<Validated> {
        &self.graph
    }

    /// Serving signature: the input layer as `serving_default_<name>:0`,
    /// the last layer as [`SERVING_OUTPUT_TENSOR`].
    pub fn serving_signature(&self) -> SignatureBuilder {
        let input = self.graph.input_layer();
        let output = self.graph.output_layer();
        SignatureBuilder::predict()
            .input(
                &input.name,
                &format!("{DEFAULT_SIGNATURE_KEY}_{}:0", input.name),
                DataType::Float32,
                input.output_shape.clone(),
            )
            .output(
                &output.name,
                SERVING_OUTPUT_TENSOR,
                DataType::Float32,
                output.output_shape.clone(),
            )
    }

    pub fn manifest(&self) -> ModelManifest {
        ModelManifest::from_graph(&self.graph, &self.architecture, self.variant.as_deref())
    }

    /// Writes the model directory. Weights, when given, are verified before
    /// anything is written.
    pub fn export(&self, model_dir: &Path) -> Result<ExportSummary, ModelError> {
        if let Some(weights) = &self.weights {
            WeightFile::open(weights)?.verify(&self.graph)?;
        }

        let saved_model = SavedModelBuilder::new()
            .meta_graph(
                &[DEFAULT_TAG_SET],
                vec![(DEFAULT_SIGNATURE_KEY.to_string(), self.serving_signature())],
            )
            .write(model_dir)?;

        let manifest = model_dir.join(MANIFEST_FILE);
        self.manifest().write_to(&manifest)?;

        let variables = model_dir.join(VARIABLES_DIR);
        std::fs::create_dir_all(&variables).map_err(|e| ModelError::io(&variables, e))?;
        let weights = match &self.weights {
            Some(src) => {
                let dst = variables.join(WEIGHTS_FILE);
                std::fs::copy(src, &dst).map_err(|e| ModelError::io(&dst, e))?;
                tracing::info!("copied weights to {}", dst.display());
                Some(dst)
            }
            None => {
                tracing::warn!(
                    "no pretrained weights for '{}'; variables/ left empty",
                    self.graph.name
                );
                None
            }
        };

        tracing::info!(
            "exported '{}' ({} params) to {}",
            self.graph.name,
            self.graph.total_params(),
            model_dir.display()
        );
        Ok(ExportSummary {
            model_dir: model_dir.to_path_buf(),
            saved_model,
            manifest,
            weights,
            total_params: self.graph.total_params(),
        })
    }
}
