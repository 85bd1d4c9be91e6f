// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON architecture manifest written next to an exported model.
//!
//! The manifest (`model.json`) records every layer with its inbound
//! connections, output shape and weight shapes, which is enough to rebuild
//! the [`ModelGraph`] without TensorFlow.
//!
//! # Format
//! ```json
//! {
//!   "name": "efficientnetb0",
//!   "architecture": "efficientnet",
//!   "variant": "b0",
//!   "classes": 1000,
//!   "input_resolution": 224,
//!   "dtype": "float32",
//!   "total_params": 5330571,
//!   "layers": [
//!     { "name": "input_1", "layer_type": "InputLayer", "inbound": [],
//!       "output_shape": [-1, 224, 224, 3], "weights": [] },
//!     { "name": "stem_conv", "layer_type": "Conv2D", "inbound": ["stem_conv_pad"],
//!       "output_shape": [-1, 112, 112, 32],
//!       "weights": [{ "name": "stem_conv/kernel", "shape": [3, 3, 3, 32] }] },
//!     ...
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use tensor_meta::{DataType, TensorShape};

use crate::graph::{Loaded, Validated};
use crate::{LayerDef, LayerType, ModelError, ModelGraph};

/// Top-level model manifest, deserialized from `model.json`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    /// Model name (e.g., `"efficientnetb0"`).
    pub name: String,
    /// Architecture family (e.g., `"efficientnet"`).
    pub architecture: String,
    /// Variant within the family, if any.
    #[serde(default)]
    pub variant: Option<String>,
    /// Size of the classifier head.
    pub classes: u32,
    /// Square input resolution in pixels.
    pub input_resolution: u32,
    /// Data type for weights and computation.
    #[serde(default = "default_dtype")]
    pub dtype: String,
    /// Parameter count at export time, for cross-checking.
    #[serde(default)]
    pub total_params: u64,
    pub layers: Vec<ManifestLayer>,
}

fn default_dtype() -> String {
    DataType::Float32.as_str().to_string()
}

/// A single layer entry in the manifest.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestLayer {
    pub name: String,
    /// Layer type string (e.g., `"Conv2D"`, `"depthwise_conv2d"`).
    pub layer_type: String,
    #[serde(default)]
    pub inbound: Vec<String>,
    /// Output dims with `-1` for the batch axis.
    pub output_shape: Vec<i64>,
    #[serde(default)]
    pub weights: Vec<ManifestWeight>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestWeight {
    pub name: String,
    pub shape: Vec<i64>,
}

impl ModelManifest {
    /// Describes a validated graph.
    pub fn from_graph(
        graph: &ModelGraph<Validated>,
        architecture: &str,
        variant: Option<&str>,
    ) -> Self {
        let input = graph.input_layer();
        let output = graph.output_layer();
        let layers = graph
            .iter_layers()
            .map(|l| ManifestLayer {
                name: l.name.clone(),
                layer_type: l.layer_type.as_str().to_string(),
                inbound: l.inbound.clone(),
                output_shape: dims_of(&l.output_shape),
                weights: l
                    .weights()
                    .map(|(name, shape)| ManifestWeight {
                        name: name.to_string(),
                        shape: dims_of(shape),
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: graph.name.clone(),
            architecture: architecture.to_string(),
            variant: variant.map(str::to_string),
            classes: output.output_shape.feature_dim().unwrap_or(0).max(0) as u32,
            input_resolution: input.output_shape.feature_dim().unwrap_or(0).max(0) as u32,
            dtype: input.dtype.as_str().to_string(),
            total_params: graph.total_params(),
            layers,
        }
    }

    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the manifest atomically.
    pub fn write_to(&self, path: &Path) -> Result<(), ModelError> {
        let json = self.to_json_pretty()?;
        saved_model::write_atomic(path, json.as_bytes()).map_err(|e| ModelError::io(path, e))?;
        tracing::info!("wrote manifest {}", path.display());
        Ok(())
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks:
    /// - At least one layer is defined.
    /// - The dtype string is valid.
    /// - No duplicate layer names.
    /// - All layer type strings are recognised.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph("manifest contains no layers".into()));
        }

        self.data_type()?;

        let mut seen_names = HashSet::new();
        for layer in &self.layers {
            if !seen_names.insert(&layer.name) {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "duplicate layer name".into(),
                });
            }
            if LayerType::from_str_loose(&layer.layer_type).is_none() {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("unrecognised layer type '{}'", layer.layer_type),
                });
            }
        }
        Ok(())
    }

    /// Returns the total number of weight tensors across all layers.
    pub fn total_weight_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len()).sum()
    }

    fn data_type(&self) -> Result<DataType, ModelError> {
        DataType::from_name(&self.dtype).map_err(|e| ModelError::InvalidLayer {
            layer: self.name.clone(),
            detail: e.to_string(),
        })
    }

    /// Rebuilds the (unvalidated) graph the manifest describes.
    pub fn to_graph(&self) -> Result<ModelGraph<Loaded>, ModelError> {
        self.validate()?;
        let dtype = self.data_type()?;

        let mut layers = Vec::with_capacity(self.layers.len());
        for (index, ml) in self.layers.iter().enumerate() {
            let layer_type = LayerType::from_str_loose(&ml.layer_type).ok_or_else(|| {
                ModelError::InvalidLayer {
                    layer: ml.name.clone(),
                    detail: format!("unrecognised layer type '{}'", ml.layer_type),
                }
            })?;
            layers.push(LayerDef {
                name: ml.name.clone(),
                layer_type,
                index,
                inbound: ml.inbound.clone(),
                weight_names: ml.weights.iter().map(|w| w.name.clone()).collect(),
                weight_shapes: ml
                    .weights
                    .iter()
                    .map(|w| TensorShape::new(w.shape.clone()))
                    .collect(),
                dtype,
                output_shape: TensorShape::new(ml.output_shape.clone()),
            });
        }
        Ok(ModelGraph::new(self.name.clone(), layers))
    }
}

fn dims_of(shape: &TensorShape) -> Vec<i64> {
    shape.dims().map(<[i64]>::to_vec).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest_json() -> &'static str {
        r#"{
            "name": "tiny",
            "architecture": "mlp",
            "classes": 3,
            "input_resolution": 4,
            "layers": [
                { "name": "input", "layer_type": "InputLayer", "output_shape": [-1, 4] },
                {
                    "name": "dense", "layer_type": "dense", "inbound": ["input"],
                    "output_shape": [-1, 3],
                    "weights": [
                        { "name": "dense/kernel", "shape": [4, 3] },
                        { "name": "dense/bias", "shape": [3] }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.name, "tiny");
        assert_eq!(m.dtype, "float32");
        assert_eq!(m.variant, None);
        assert_eq!(m.total_weight_count(), 2);
        m.validate().unwrap();
    }

    #[test]
    fn test_to_graph() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        let graph = m.to_graph().unwrap().validate().unwrap();
        assert_eq!(graph.total_params(), 15);
        assert_eq!(graph.layer(1).unwrap().layer_type, LayerType::Dense);
    }

    #[test]
    fn test_validate_duplicate_names() {
        let mut m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        m.layers[1].name = "input".into();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_layer_type() {
        let mut m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        m.layers[1].layer_type = "attention".into();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_validate_bad_dtype() {
        let mut m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        m.dtype = "complex64".into();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_from_graph_roundtrip() {
        let graph = ModelManifest::from_json(sample_manifest_json())
            .unwrap()
            .to_graph()
            .unwrap()
            .validate()
            .unwrap();
        let m = ModelManifest::from_graph(&graph, "mlp", Some("v1"));
        assert_eq!(m.classes, 3);
        assert_eq!(m.input_resolution, 4);
        assert_eq!(m.total_params, 15);
        let back = ModelManifest::from_json(&m.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelManifest::from_file(&dir.path().join("model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
