// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Loading an exported model directory back into a validated graph.

use std::path::Path;

use crate::graph::Validated;
use crate::weights::WeightFile;
use crate::{ModelError, ModelGraph, ModelManifest, MANIFEST_FILE, VARIABLES_DIR, WEIGHTS_FILE};

/// Rebuilds graphs from directories written by [`crate::ModelExporter`].
///
/// # Example
/// ```no_run
/// use model_zoo::ExportedModelLoader;
/// use std::path::Path;
///
/// let graph = ExportedModelLoader::load(Path::new("./model")).unwrap();
/// println!("{}", graph.render_summary());
/// ```
pub struct ExportedModelLoader;

impl ExportedModelLoader {
    /// Loads and validates the model in `model_dir`.
    ///
    /// Steps:
    /// 1. Parse `model.json` and rebuild the layer graph.
    /// 2. Validate the graph and compare its parameter count with the one
    ///    recorded at export time.
    /// 3. If `variables/variables.safetensors` exists, check every weight
    ///    against it.
    pub fn load(model_dir: &Path) -> Result<ModelGraph<Validated>, ModelError> {
        let manifest = Self::load_manifest(model_dir)?;
        let graph = manifest.to_graph()?.validate()?;

        if manifest.total_params != 0 && manifest.total_params != graph.total_params() {
            return Err(ModelError::InvalidGraph(format!(
                "manifest records {} params but its layers hold {}",
                manifest.total_params,
                graph.total_params()
            )));
        }

        let weights_path = model_dir.join(VARIABLES_DIR).join(WEIGHTS_FILE);
        if weights_path.is_file() {
            WeightFile::open(&weights_path)?.verify(&graph)?;
        } else {
            tracing::debug!("no weight file at {}", weights_path.display());
        }
        Ok(graph)
    }

    /// Parses `model.json` without building the graph.
    pub fn load_manifest(model_dir: &Path) -> Result<ModelManifest, ModelError> {
        ModelManifest::from_file(&model_dir.join(MANIFEST_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EfficientNetVariant, ModelExporter};

    #[test]
    fn test_load_exported_b0() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ModelExporter::efficientnet(EfficientNetVariant::B0, 1000).unwrap();
        exporter.export(dir.path()).unwrap();

        let graph = ExportedModelLoader::load(dir.path()).unwrap();
        assert_eq!(graph.name, "efficientnetb0");
        assert_eq!(graph.total_params(), 5_330_571);
        assert_eq!(graph.layers, exporter.graph().layers);
    }

    #[test]
    fn test_param_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ModelExporter::efficientnet(EfficientNetVariant::B0, 10).unwrap();
        exporter.export(dir.path()).unwrap();

        let mut manifest = ExportedModelLoader::load_manifest(dir.path()).unwrap();
        manifest.total_params += 1;
        manifest.write_to(&dir.path().join(MANIFEST_FILE)).unwrap();

        let err = ExportedModelLoader::load(dir.path()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidGraph(_)));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ExportedModelLoader::load(dir.path()),
            Err(ModelError::Io { .. })
        ));
    }
}
