// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Loading `saved_model.pb` and locating meta graphs and signatures.
//!
//! A SavedModel may hold several meta graphs (e.g. one for `serve`, one for
//! `serve,gpu`). A meta graph is selected by its *tag set*: the requested
//! comma-separated tags must equal the graph's tags as a set.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use prost::Message;

use crate::proto::{MetaGraphDef, SavedModel, SignatureDef};
use crate::{SavedModelError, SAVED_MODEL_FILENAME, SAVED_MODEL_TEXT_FILENAME};

/// An unordered set of meta-graph tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Parses a comma-separated tag list (`"serve,gpu"`). Tags are taken
    /// verbatim, so `"serve, gpu"` names the tag `" gpu"`.
    pub fn parse(s: &str) -> Self {
        Self(s.split(',').map(str::to_string).collect())
    }

    /// Builds a tag set from a meta graph's tag list.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        Self(tags.iter().map(|t| t.as_ref().to_string()).collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(String::as_str).collect();
        f.write_str(&joined.join(","))
    }
}

/// A SavedModel directory whose `saved_model.pb` has been decoded.
#[derive(Debug, Clone)]
pub struct SavedModelDir {
    proto: SavedModel,
}

impl SavedModelDir {
    /// Loads `saved_model.pb` from `model_dir`.
    ///
    /// Fails with [`SavedModelError::NotFound`] when the directory or the
    /// protobuf file does not exist, and with [`SavedModelError::TextFormat`]
    /// when only `saved_model.pbtxt` is present.
    pub fn load(model_dir: &Path) -> Result<Self, SavedModelError> {
        let pb_path = model_dir.join(SAVED_MODEL_FILENAME);
        if !pb_path.is_file() {
            if model_dir.join(SAVED_MODEL_TEXT_FILENAME).is_file() {
                return Err(SavedModelError::TextFormat {
                    path: model_dir.to_path_buf(),
                });
            }
            return Err(SavedModelError::NotFound {
                path: model_dir.to_path_buf(),
            });
        }
        let bytes = std::fs::read(&pb_path).map_err(|e| SavedModelError::io(&pb_path, e))?;
        let proto = SavedModel::decode(bytes.as_slice())?;
        tracing::debug!(
            "loaded {} ({} bytes, {} meta graph(s))",
            pb_path.display(),
            bytes.len(),
            proto.meta_graphs.len(),
        );
        Ok(Self { proto })
    }

    /// Tag sets of all meta graphs, in file order.
    pub fn tag_sets(&self) -> Vec<TagSet> {
        self.proto
            .meta_graphs
            .iter()
            .map(|m| TagSet::from_tags(m.tags()))
            .collect()
    }

    /// Returns the meta graph whose tags equal `tag_set` (comma-separated).
    pub fn meta_graph(&self, tag_set: &str) -> Result<&MetaGraphDef, SavedModelError> {
        let wanted = TagSet::parse(tag_set);
        self.proto
            .meta_graphs
            .iter()
            .find(|m| TagSet::from_tags(m.tags()) == wanted)
            .ok_or_else(|| SavedModelError::TagSetNotFound {
                requested: tag_set.to_string(),
                available: self.tag_sets().iter().map(TagSet::to_string).collect(),
            })
    }

    /// Returns signature `key` of the meta graph selected by `tag_set`.
    pub fn signature(&self, tag_set: &str, key: &str) -> Result<&SignatureDef, SavedModelError> {
        let meta = self.meta_graph(tag_set)?;
        meta.signature_def
            .get(key)
            .ok_or_else(|| SavedModelError::SignatureNotFound {
                key: key.to_string(),
                available: meta.signature_def.keys().cloned().collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SavedModelBuilder, SignatureBuilder};
    use tensor_meta::{DataType, TensorShape};

    fn write_model(dir: &Path) {
        SavedModelBuilder::new()
            .meta_graph(
                &["serve"],
                vec![(
                    "serving_default".to_string(),
                    SignatureBuilder::predict()
                        .input("x", "serving_default_x:0", DataType::Float32, TensorShape::batched(&[2]))
                        .output("y", "StatefulPartitionedCall:0", DataType::Float32, TensorShape::batched(&[1])),
                )],
            )
            .meta_graph(&["serve", "gpu"], vec![])
            .write(dir)
            .unwrap();
    }

    #[test]
    fn test_tag_set_parse_is_unordered() {
        assert_eq!(TagSet::parse("serve,gpu"), TagSet::parse("gpu,serve"));
        assert_ne!(TagSet::parse("serve"), TagSet::parse("serve,gpu"));
        assert_eq!(TagSet::parse("gpu,serve").to_string(), "gpu,serve");
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = SavedModelDir::load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SavedModelError::NotFound { .. }));
        assert!(!err.is_lookup());
    }

    #[test]
    fn test_tag_set_whitespace_is_significant() {
        assert_ne!(TagSet::parse("serve, gpu"), TagSet::parse("serve,gpu"));

        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path());
        let model = SavedModelDir::load(dir.path()).unwrap();
        assert!(model.meta_graph("serve, gpu").unwrap_err().is_lookup());
        assert!(model.meta_graph(" serve").is_err());
    }

    #[test]
    fn test_load_text_format_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SAVED_MODEL_TEXT_FILENAME),
            "saved_model_schema_version: 1\n",
        )
        .unwrap();
        let err = SavedModelDir::load(dir.path()).unwrap_err();
        assert!(matches!(err, SavedModelError::TextFormat { .. }));
        assert!(err.to_string().contains("text-format"));
    }

    #[test]
    fn test_load_garbage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SAVED_MODEL_FILENAME), [0xff, 0xff, 0xff]).unwrap();
        let err = SavedModelDir::load(dir.path()).unwrap_err();
        assert!(matches!(err, SavedModelError::Decode(_)));
    }

    #[test]
    fn test_meta_graph_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path());
        let model = SavedModelDir::load(dir.path()).unwrap();
        assert_eq!(model.tag_sets().len(), 2);
        assert_eq!(model.meta_graph("serve").unwrap().signature_def.len(), 1);
        assert!(model.meta_graph("gpu,serve").unwrap().signature_def.is_empty());
    }

    #[test]
    fn test_unknown_tag_set() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path());
        let model = SavedModelDir::load(dir.path()).unwrap();
        let err = model.meta_graph("train").unwrap_err();
        assert!(err.is_lookup());
        match err {
            SavedModelError::TagSetNotFound { available, .. } => {
                assert_eq!(available, vec!["serve".to_string(), "gpu,serve".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_signature() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path());
        let model = SavedModelDir::load(dir.path()).unwrap();
        let err = model.signature("serve", "predict").unwrap_err();
        assert!(matches!(err, SavedModelError::SignatureNotFound { ref available, .. } if available == &["serving_default"]));
    }
}
