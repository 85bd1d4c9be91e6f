// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Descriptor generation from a model's serving signature.

use std::path::{Component, Path, PathBuf};

use saved_model::{extract_signature, SignatureDescriptor, SignatureOptions};
use serde_json::Value;

use crate::{DescriptorError, DescriptorFile, INPFILE_NAME};

/// Computes the `<section>_id` / `<section>_dim` entries of a signature.
///
/// Entries come back in write order: `inputs_id`, `inputs_dim`,
/// `outputs_id`, `outputs_dim`. Tensors within a section follow the
/// signature's key order, so ids and dims stay aligned.
pub fn signature_entries(
    signature: &SignatureDescriptor,
) -> Result<Vec<(String, Value)>, DescriptorError> {
    let mut entries = Vec::with_capacity(4);
    for (section, tensors) in signature.sections() {
        let mut ids = Vec::with_capacity(tensors.len());
        let mut dims = Vec::with_capacity(tensors.len());
        for (key, spec) in tensors {
            // Recorded as the shape's text entry (`"224"`), like the signature.
            let dim = match (spec.shape.get(1), spec.feature_dim()) {
                (Some(text), Some(_)) => text.clone(),
                _ => {
                    return Err(DescriptorError::MissingFeatureDim {
                        section: section.to_string(),
                        key: key.clone(),
                        shape: spec.shape.clone(),
                    })
                }
            };
            ids.push(Value::from(spec.name.clone()));
            dims.push(Value::from(dim));
        }
        entries.push((format!("{section}_id"), Value::Array(ids)));
        entries.push((format!("{section}_dim"), Value::Array(dims)));
    }
    Ok(entries)
}

/// Writes the signature-derived keys into `<model_dir>/inpfile.json`.
///
/// An existing descriptor is loaded first and only `path_to_model` and the
/// four id/dim arrays are replaced; anything else in the file (for example a
/// `config` written earlier) survives. Returns the descriptor path.
pub fn generate(model_dir: &Path, options: &SignatureOptions) -> Result<PathBuf, DescriptorError> {
    let signature = extract_signature(model_dir, options)?;
    let entries = signature_entries(&signature)?;

    let absolute = absolutize(model_dir).map_err(|e| DescriptorError::io(model_dir, e))?;
    let inpfile = model_dir.join(INPFILE_NAME);

    let mut file = DescriptorFile::open_or_empty(&inpfile)?;
    file.set("path_to_model", absolute.to_string_lossy())?;
    for (key, value) in entries {
        file.set(&key, value)?;
    }
    file.save()?;

    tracing::info!(
        "descriptor for {}: {} input(s), {} output(s)",
        absolute.display(),
        signature.inputs.len(),
        signature.outputs.len()
    );
    Ok(inpfile)
}

/// Lexical absolute path: joins the working directory and folds `.`/`..`
/// without touching the filesystem or resolving symlinks.
fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saved_model::{SavedModelBuilder, SignatureBuilder};
    use serde_json::json;
    use tensor_meta::{DataType, TensorShape};

    fn write_model(dir: &Path, outputs: &[(&str, &str, &[i64])]) {
        let mut sig = SignatureBuilder::predict().input(
            "x",
            "serving_default_x:0",
            DataType::Float32,
            TensorShape::batched(&[2]),
        );
        for (key, name, dims) in outputs {
            sig = sig.output(*key, *name, DataType::Float32, TensorShape::new(dims.to_vec()));
        }
        SavedModelBuilder::new()
            .meta_graph(&["serve"], vec![("serving_default".to_string(), sig)])
            .write(dir)
            .unwrap();
    }

    #[test]
    fn test_signature_entries_order() {
        let dir = tempfile::tempdir().unwrap();
        write_model(
            dir.path(),
            &[
                ("output_1", "StatefulPartitionedCall:0", &[-1, 1]),
                ("output_2", "StatefulPartitionedCall:1", &[-1, 3]),
            ],
        );
        let sig = extract_signature(dir.path(), &SignatureOptions::default()).unwrap();
        let entries = signature_entries(&sig).unwrap();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["inputs_id", "inputs_dim", "outputs_id", "outputs_dim"]);
        assert_eq!(entries[2].1, json!(["StatefulPartitionedCall:0", "StatefulPartitionedCall:1"]));
        assert_eq!(entries[3].1, json!(["1", "3"]));
    }

    #[test]
    fn test_rank_one_output_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), &[("score", "StatefulPartitionedCall:0", &[-1])]);
        let err = generate(dir.path(), &SignatureOptions::default()).unwrap_err();
        match err {
            DescriptorError::MissingFeatureDim { section, key, shape } => {
                assert_eq!(section, "outputs");
                assert_eq!(key, "score");
                assert_eq!(shape, vec!["-1".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join(INPFILE_NAME).exists());
    }

    #[test]
    fn test_generate_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), &[("y", "StatefulPartitionedCall:0", &[-1, 4])]);
        std::fs::write(
            dir.path().join(INPFILE_NAME),
            r#"{"config": ["10", "08"], "inputs_dim": [99]}"#,
        )
        .unwrap();

        generate(dir.path(), &SignatureOptions::default()).unwrap();
        let file = DescriptorFile::open(&dir.path().join(INPFILE_NAME)).unwrap();
        assert_eq!(file.get("config"), Some(&json!(["10", "08"])));
        assert_eq!(file.get("inputs_dim"), Some(&json!(["2"])));
        assert_eq!(file.get("outputs_dim"), Some(&json!(["4"])));
    }

    #[test]
    fn test_absolutize_folds_dots() {
        let p = absolutize(Path::new("/a/b/./c/../d")).unwrap();
        assert_eq!(p, PathBuf::from("/a/b/d"));
        assert!(absolutize(Path::new("rel")).unwrap().is_absolute());
    }
}
