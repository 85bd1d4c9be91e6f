// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Writing `saved_model.pb` files from tags and signature declarations.

use std::path::{Path, PathBuf};

use prost::Message;
use tensor_meta::{DataType, TensorShape};

use crate::proto::{MetaGraphDef, MetaInfoDef, SavedModel, SignatureDef, TensorInfo, TensorShapeProto};
use crate::{write_atomic, SavedModelError, PREDICT_METHOD_NAME, SAVED_MODEL_FILENAME};

/// Accumulates the inputs and outputs of one signature.
#[derive(Debug, Clone, Default)]
pub struct SignatureBuilder {
    def: SignatureDef,
}

impl SignatureBuilder {
    /// Starts a signature with the given `method_name`.
    pub fn new(method_name: &str) -> Self {
        Self {
            def: SignatureDef {
                method_name: method_name.to_string(),
                ..Default::default()
            },
        }
    }

    /// Starts a `tensorflow/serving/predict` signature.
    pub fn predict() -> Self {
        Self::new(PREDICT_METHOD_NAME)
    }

    /// Declares input `key`, bound to graph tensor `name`.
    pub fn input(mut self, key: &str, name: &str, dtype: DataType, shape: TensorShape) -> Self {
        self.def
            .inputs
            .insert(key.to_string(), tensor_info(name, dtype, &shape));
        self
    }

    /// Declares output `key`, bound to graph tensor `name`.
    pub fn output(mut self, key: &str, name: &str, dtype: DataType, shape: TensorShape) -> Self {
        self.def
            .outputs
            .insert(key.to_string(), tensor_info(name, dtype, &shape));
        self
    }

    pub fn build(self) -> SignatureDef {
        self.def
    }
}

fn tensor_info(name: &str, dtype: DataType, shape: &TensorShape) -> TensorInfo {
    TensorInfo {
        name: name.to_string(),
        dtype: dtype.code(),
        tensor_shape: Some(TensorShapeProto::from_shape(shape)),
    }
}

/// Builds a `SavedModel` protobuf holding one or more meta graphs.
///
/// # Example
/// ```no_run
/// use saved_model::{SavedModelBuilder, SignatureBuilder};
/// use tensor_meta::{DataType, TensorShape};
/// use std::path::Path;
///
/// SavedModelBuilder::new()
///     .meta_graph(&["serve"], vec![(
///         "serving_default".into(),
///         SignatureBuilder::predict()
///             .input("x", "serving_default_x:0", DataType::Float32, TensorShape::batched(&[4]))
///             .output("y", "StatefulPartitionedCall:0", DataType::Float32, TensorShape::batched(&[1])),
///     )])
///     .write(Path::new("./SavedModel"))
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SavedModelBuilder {
    proto: SavedModel,
    tensorflow_version: String,
}

impl Default for SavedModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedModelBuilder {
    pub fn new() -> Self {
        Self {
            proto: SavedModel {
                saved_model_schema_version: 1,
                meta_graphs: Vec::new(),
            },
            tensorflow_version: String::new(),
        }
    }

    /// Records the TensorFlow version string on meta graphs added afterwards.
    pub fn tensorflow_version(mut self, version: &str) -> Self {
        self.tensorflow_version = version.to_string();
        self
    }

    /// Appends a meta graph with `tags` and the given signatures.
    pub fn meta_graph(mut self, tags: &[&str], signatures: Vec<(String, SignatureBuilder)>) -> Self {
        let meta = MetaGraphDef {
            meta_info_def: Some(MetaInfoDef {
                meta_graph_version: String::new(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                tensorflow_version: self.tensorflow_version.clone(),
            }),
            signature_def: signatures
                .into_iter()
                .map(|(key, sig)| (key, sig.build()))
                .collect(),
        };
        self.proto.meta_graphs.push(meta);
        self
    }

    /// Returns the assembled protobuf.
    pub fn build(self) -> SavedModel {
        self.proto
    }

    /// Encodes the protobuf to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.proto.encode_to_vec()
    }

    /// Writes `saved_model.pb` into `model_dir`, creating the directory if
    /// needed. Returns the path of the written file.
    pub fn write(&self, model_dir: &Path) -> Result<PathBuf, SavedModelError> {
        std::fs::create_dir_all(model_dir).map_err(|e| SavedModelError::io(model_dir, e))?;
        let pb_path = model_dir.join(SAVED_MODEL_FILENAME);
        let bytes = self.to_bytes();
        write_atomic(&pb_path, &bytes).map_err(|e| SavedModelError::io(&pb_path, e))?;
        tracing::info!("wrote {} ({} bytes)", pb_path.display(), bytes.len());
        Ok(pb_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_encodes_decodable_proto() {
        let builder = SavedModelBuilder::new().tensorflow_version("2.15.0").meta_graph(
            &["serve"],
            vec![(
                "serving_default".into(),
                SignatureBuilder::predict().input(
                    "input_1",
                    "serving_default_input_1:0",
                    DataType::Float32,
                    TensorShape::batched(&[224, 224, 3]),
                ),
            )],
        );
        let decoded = SavedModel::decode(builder.to_bytes().as_slice()).unwrap();
        assert_eq!(decoded, builder.build());
        let meta = &decoded.meta_graphs[0];
        assert_eq!(meta.tags(), &["serve".to_string()]);
        assert_eq!(meta.meta_info_def.as_ref().unwrap().tensorflow_version, "2.15.0");
        let sig = &meta.signature_def["serving_default"];
        assert_eq!(sig.method_name, PREDICT_METHOD_NAME);
        assert_eq!(sig.inputs["input_1"].dtype, DataType::Float32.code());
        assert_eq!(sig.inputs["input_1"].shape(), TensorShape::batched(&[224, 224, 3]));
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("SavedModel");
        let path = SavedModelBuilder::new()
            .meta_graph(&["serve"], vec![])
            .write(&target)
            .unwrap();
        assert!(path.is_file());
        assert_eq!(path.file_name().unwrap(), SAVED_MODEL_FILENAME);
    }
}
