// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Serving-signature extraction.
//!
//! A [`SignatureDescriptor`] is the JSON view of one signature:
//!
//! ```json
//! {
//!   "inputs":  { "input_1":     { "shape": ["-1", "224", "224", "3"], "name": "serving_default_input_1:0" } },
//!   "outputs": { "predictions": { "shape": ["-1", "1000"],            "name": "StatefulPartitionedCall:0" } }
//! }
//! ```
//!
//! Entries are keyed by the tensor's key within the signature and kept
//! sorted, so repeated extractions serialise to identical bytes.

use std::collections::BTreeMap;
use std::path::Path;

use crate::proto::{SignatureDef, TensorInfo};
use crate::{
    write_atomic, SavedModelDir, SavedModelError, DEFAULT_SIGNATURE_KEY, DEFAULT_TAG_SET,
    SIGNATURE_DUMP_FILENAME,
};

/// Which signature to extract, and whether to persist it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignatureOptions {
    /// Comma-separated tag set of the meta graph (default `"serve"`).
    #[serde(default = "default_tag_set")]
    pub tag_set: String,
    /// Signature key within the meta graph (default `"serving_default"`).
    #[serde(default = "default_signature_key")]
    pub signature_key: String,
    /// Write the descriptor to `inout_sign.json` in the model directory.
    #[serde(default)]
    pub dump: bool,
}

fn default_tag_set() -> String {
    DEFAULT_TAG_SET.to_string()
}

fn default_signature_key() -> String {
    DEFAULT_SIGNATURE_KEY.to_string()
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            tag_set: default_tag_set(),
            signature_key: default_signature_key(),
            dump: false,
        }
    }
}

/// Name and declared shape of one signature tensor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorSpec {
    /// Dimension sizes as text; `"-1"` marks an unknown extent.
    pub shape: Vec<String>,
    /// Fully-qualified graph tensor name (e.g. `"serving_default_x:0"`).
    pub name: String,
}

impl TensorSpec {
    fn from_info(info: &TensorInfo) -> Self {
        Self {
            shape: info.shape().to_text_dims(),
            name: info.name.clone(),
        }
    }

    /// Parses dimension `index` of the recorded shape.
    pub fn dim(&self, index: usize) -> Option<i64> {
        self.shape.get(index).and_then(|d| d.parse().ok())
    }

    /// Feature width: the dimension after the batch axis.
    pub fn feature_dim(&self) -> Option<i64> {
        self.dim(1)
    }
}

/// Inputs and outputs of one serving signature.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SignatureDescriptor {
    pub inputs: BTreeMap<String, TensorSpec>,
    pub outputs: BTreeMap<String, TensorSpec>,
}

impl SignatureDescriptor {
    /// Builds the descriptor of a decoded signature.
    pub fn from_signature_def(def: &SignatureDef) -> Self {
        let convert = |section: &BTreeMap<String, TensorInfo>| {
            section
                .iter()
                .map(|(key, info)| (key.clone(), TensorSpec::from_info(info)))
                .collect()
        };
        Self {
            inputs: convert(&def.inputs),
            outputs: convert(&def.outputs),
        }
    }

    /// The two sections, named as they appear in JSON.
    pub fn sections(&self) -> [(&'static str, &BTreeMap<String, TensorSpec>); 2] {
        [("inputs", &self.inputs), ("outputs", &self.outputs)]
    }

    /// Finds a tensor by its graph name in either section.
    pub fn find_by_name(&self, name: &str) -> Option<&TensorSpec> {
        self.inputs
            .values()
            .chain(self.outputs.values())
            .find(|spec| spec.name == name)
    }

    /// Renders the descriptor as 2-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, SavedModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the descriptor to `path` as indented JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), SavedModelError> {
        let json = self.to_json_pretty()?;
        write_atomic(path, json.as_bytes()).map_err(|e| SavedModelError::io(path, e))?;
        tracing::info!("wrote signature descriptor {}", path.display());
        Ok(())
    }
}

/// Extracts the serving signature of the SavedModel in `model_dir`.
///
/// # Errors
/// - [`SavedModelError::NotFound`] if `model_dir` holds no `saved_model.pb`.
/// - [`SavedModelError::TagSetNotFound`] / [`SavedModelError::SignatureNotFound`]
///   if the tag set or signature key does not exist.
pub fn extract_signature(
    model_dir: &Path,
    options: &SignatureOptions,
) -> Result<SignatureDescriptor, SavedModelError> {
    let model = SavedModelDir::load(model_dir)?;
    let def = model.signature(&options.tag_set, &options.signature_key)?;
    let descriptor = SignatureDescriptor::from_signature_def(def);
    tracing::debug!(
        "signature '{}' [{}]: {} input(s), {} output(s)",
        options.signature_key,
        options.tag_set,
        descriptor.inputs.len(),
        descriptor.outputs.len(),
    );

    if options.dump {
        descriptor.write_to(&model_dir.join(SIGNATURE_DUMP_FILENAME))?;
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SavedModelBuilder, SignatureBuilder};
    use tensor_meta::{DataType, TensorShape};

    fn write_two_input_model(dir: &Path) {
        SavedModelBuilder::new()
            .meta_graph(
                &["serve"],
                vec![(
                    "serving_default".to_string(),
                    SignatureBuilder::predict()
                        .input("velocity", "serving_default_velocity:0", DataType::Float32, TensorShape::batched(&[3]))
                        .input("position", "serving_default_position:0", DataType::Float32, TensorShape::batched(&[2]))
                        .output("output_0", "StatefulPartitionedCall:0", DataType::Float32, TensorShape::batched(&[5])),
                )],
            )
            .write(dir)
            .unwrap();
    }

    #[test]
    fn test_extract_sorted_by_key() {
        let dir = tempfile::tempdir().unwrap();
        write_two_input_model(dir.path());
        let sig = extract_signature(dir.path(), &SignatureOptions::default()).unwrap();

        let keys: Vec<_> = sig.inputs.keys().collect();
        assert_eq!(keys, ["position", "velocity"]);
        assert_eq!(sig.inputs["position"].shape, vec!["-1", "2"]);
        assert_eq!(sig.inputs["position"].name, "serving_default_position:0");
        assert_eq!(sig.outputs["output_0"].feature_dim(), Some(5));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write_two_input_model(dir.path());
        let opts = SignatureOptions::default();
        let a = extract_signature(dir.path(), &opts).unwrap().to_json_pretty().unwrap();
        let b = extract_signature(dir.path(), &opts).unwrap().to_json_pretty().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dump_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        write_two_input_model(dir.path());
        let opts = SignatureOptions {
            dump: true,
            ..Default::default()
        };
        let sig = extract_signature(dir.path(), &opts).unwrap();

        let dumped = std::fs::read_to_string(dir.path().join(SIGNATURE_DUMP_FILENAME)).unwrap();
        let back: SignatureDescriptor = serde_json::from_str(&dumped).unwrap();
        assert_eq!(back, sig);
        assert!(dumped.starts_with("{\n  \"inputs\""));
    }

    #[test]
    fn test_no_dump_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write_two_input_model(dir.path());
        extract_signature(dir.path(), &SignatureOptions::default()).unwrap();
        assert!(!dir.path().join(SIGNATURE_DUMP_FILENAME).exists());
    }

    #[test]
    fn test_missing_signature_key() {
        let dir = tempfile::tempdir().unwrap();
        write_two_input_model(dir.path());
        let opts = SignatureOptions {
            signature_key: "classify".into(),
            ..Default::default()
        };
        let err = extract_signature(dir.path(), &opts).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn test_not_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_signature(dir.path(), &SignatureOptions::default()).unwrap_err();
        assert!(matches!(err, SavedModelError::NotFound { .. }));
    }

    #[test]
    fn test_find_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write_two_input_model(dir.path());
        let sig = extract_signature(dir.path(), &SignatureOptions::default()).unwrap();
        assert!(sig.find_by_name("StatefulPartitionedCall:0").is_some());
        assert!(sig.find_by_name("missing:0").is_none());
    }

    #[test]
    fn test_options_from_partial_json() {
        let opts: SignatureOptions = serde_json::from_str(r#"{ "dump": true }"#).unwrap();
        assert_eq!(opts.tag_set, "serve");
        assert_eq!(opts.signature_key, "serving_default");
        assert!(opts.dump);
    }
}
