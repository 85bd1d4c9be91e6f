// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pretrained-weight files in SafeTensors format.
//!
//! Only the header is interpreted: tensor names, shapes and dtypes are
//! compared against the weights a [`ModelGraph`] declares. Tensor data is
//! never copied into memory; the file is memory-mapped for header parsing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tensor_meta::{DataType, TensorShape};

use crate::graph::Validated;
use crate::{ModelError, ModelGraph};

/// Metadata for a single tensor extracted from the SafeTensors header.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMeta {
    /// Tensor name (key in the SafeTensors file).
    pub name: String,
    pub shape: TensorShape,
    pub dtype: DataType,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Header view of a SafeTensors weight file.
#[derive(Debug, Clone)]
pub struct WeightFile {
    path: PathBuf,
    tensors: HashMap<String, WeightMeta>,
}

impl WeightFile {
    /// Reads the SafeTensors header at `path`.
    pub fn open(path: &Path) -> Result<Self, ModelError> {
        let file = std::fs::File::open(path).map_err(|e| ModelError::io(path, e))?;

        // SAFETY: the map is read-only and dropped before this function
        // returns; the file is not expected to change while it is parsed.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| ModelError::SafeTensors(format!("mmap of '{}' failed: {e}", path.display())))?;

        let st = safetensors::SafeTensors::deserialize(&mmap).map_err(|e| {
            ModelError::SafeTensors(format!("'{}': {e}", path.display()))
        })?;

        let mut tensors = HashMap::new();
        for (name, view) in st.tensors() {
            let dims: Vec<i64> = view.shape().iter().map(|&d| d as i64).collect();
            let shape = TensorShape::new(dims);
            let dtype = convert_safetensor_dtype(view.dtype())?;
            tensors.insert(
                name.clone(),
                WeightMeta {
                    name,
                    shape,
                    dtype,
                    size_bytes: view.data().len() as u64,
                },
            );
        }
        tracing::debug!("read {} tensor headers from {}", tensors.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            tensors,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&WeightMeta> {
        self.tensors.get(name)
    }

    /// Total bytes of tensor data.
    pub fn total_bytes(&self) -> u64 {
        self.tensors.values().map(|m| m.size_bytes).sum()
    }

    /// Checks that every weight of `graph` is present with the expected
    /// shape. Returns the number of tensors checked.
    pub fn verify(&self, graph: &ModelGraph<Validated>) -> Result<usize, ModelError> {
        let mut checked = 0;
        for (name, expected) in graph.iter_weights() {
            let meta = self.get(name).ok_or_else(|| ModelError::WeightNotFound {
                name: name.to_string(),
            })?;
            if &meta.shape != expected {
                return Err(ModelError::WeightShapeMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    found: meta.shape.to_string(),
                });
            }
            if meta.dtype != DataType::Float32 {
                tracing::warn!("weight '{name}' is stored as {}", meta.dtype);
            }
            checked += 1;
        }

        let extra = self.len().saturating_sub(checked);
        if extra > 0 {
            tracing::warn!(
                "{} tensor(s) in {} are not used by '{}'",
                extra,
                self.path.display(),
                graph.name
            );
        }
        tracing::info!("verified {checked} weights against {}", self.path.display());
        Ok(checked)
    }
}

/// Converts a SafeTensors `Dtype` to our [`DataType`].
fn convert_safetensor_dtype(st_dtype: safetensors::Dtype) -> Result<DataType, ModelError> {
    match st_dtype {
        safetensors::Dtype::F32 => Ok(DataType::Float32),
        safetensors::Dtype::F64 => Ok(DataType::Float64),
        safetensors::Dtype::F16 => Ok(DataType::Float16),
        safetensors::Dtype::BF16 => Ok(DataType::BFloat16),
        safetensors::Dtype::I8 => Ok(DataType::Int8),
        safetensors::Dtype::I16 => Ok(DataType::Int16),
        safetensors::Dtype::I32 => Ok(DataType::Int32),
        safetensors::Dtype::I64 => Ok(DataType::Int64),
        safetensors::Dtype::U8 => Ok(DataType::UInt8),
        safetensors::Dtype::BOOL => Ok(DataType::Bool),
        other => Err(ModelError::SafeTensors(format!(
            "unsupported SafeTensors dtype: {other:?}"
        ))),
    }
}

/// Writes zero-filled f32 tensors with the given shapes.
#[cfg(test)]
pub(crate) fn write_test_weights(path: &Path, tensors: &[(&str, Vec<usize>)]) {
    let buffers: Vec<Vec<u8>> = tensors
        .iter()
        .map(|(_, shape)| vec![0u8; shape.iter().product::<usize>() * 4])
        .collect();
    let views: Vec<(String, safetensors::tensor::TensorView<'_>)> = tensors
        .iter()
        .zip(&buffers)
        .map(|((name, shape), data)| {
            let view =
                safetensors::tensor::TensorView::new(safetensors::Dtype::F32, shape.clone(), data)
                    .unwrap();
            (name.to_string(), view)
        })
        .collect();
    let bytes = safetensors::serialize(views, &None).unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayerDef, LayerType};

    fn tiny_graph() -> ModelGraph<Validated> {
        let layers = vec![
            LayerDef {
                name: "input".into(),
                layer_type: LayerType::InputLayer,
                index: 0,
                inbound: vec![],
                weight_names: vec![],
                weight_shapes: vec![],
                dtype: DataType::Float32,
                output_shape: TensorShape::batched(&[4]),
            },
            LayerDef {
                name: "dense".into(),
                layer_type: LayerType::Dense,
                index: 1,
                inbound: vec!["input".into()],
                weight_names: vec!["dense/kernel".into(), "dense/bias".into()],
                weight_shapes: vec![TensorShape::matrix(4, 3), TensorShape::vector(3)],
                dtype: DataType::Float32,
                output_shape: TensorShape::batched(&[3]),
            },
        ];
        ModelGraph::new("tiny".into(), layers).validate().unwrap()
    }

    #[test]
    fn test_read_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.safetensors");
        write_test_weights(&path, &[("dense/kernel", vec![4, 3]), ("dense/bias", vec![3])]);

        let file = WeightFile::open(&path).unwrap();
        assert_eq!(file.len(), 2);
        let kernel = file.get("dense/kernel").unwrap();
        assert_eq!(kernel.shape, TensorShape::matrix(4, 3));
        assert_eq!(kernel.dtype, DataType::Float32);
        assert_eq!(kernel.size_bytes, 48);
        assert_eq!(file.total_bytes(), 60);
    }

    #[test]
    fn test_verify_ok_with_extra_tensor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.safetensors");
        write_test_weights(
            &path,
            &[("dense/kernel", vec![4, 3]), ("dense/bias", vec![3]), ("unused", vec![1])],
        );
        let checked = WeightFile::open(&path).unwrap().verify(&tiny_graph()).unwrap();
        assert_eq!(checked, 2);
    }

    #[test]
    fn test_verify_missing_weight() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.safetensors");
        write_test_weights(&path, &[("dense/kernel", vec![4, 3])]);
        let err = WeightFile::open(&path).unwrap().verify(&tiny_graph()).unwrap_err();
        assert!(matches!(err, ModelError::WeightNotFound { name } if name == "dense/bias"));
    }

    #[test]
    fn test_verify_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.safetensors");
        write_test_weights(&path, &[("dense/kernel", vec![3, 4]), ("dense/bias", vec![3])]);
        let err = WeightFile::open(&path).unwrap().verify(&tiny_graph()).unwrap_err();
        assert!(matches!(err, ModelError::WeightShapeMismatch { .. }));
    }

    #[test]
    fn test_open_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.safetensors");
        std::fs::write(&path, b"not a safetensors file").unwrap();
        assert!(matches!(WeightFile::open(&path), Err(ModelError::SafeTensors(_))));
    }
}
