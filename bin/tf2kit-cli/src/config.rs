// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Toolkit configuration loaded from TOML files or built from defaults.
//!
//! Every section and field is optional; the defaults reproduce the paths
//! and values the workflow has always used.
//!
//! # TOML Format
//! ```toml
//! [model]
//! path = "./SavedModel"
//! tag_set = "serve"
//! signature_key = "serving_default"
//! dump_signature = false
//!
//! [session]
//! inpfile = "./inpfile.json"
//! allow_growth = true
//! num_threads = 8
//! memory_fraction = 0.3
//! visible_device_list = "0"
//!
//! [export]
//! variant = "b0"
//! classes = 1000
//! output = "model"
//!
//! [plot]
//! truth_file = "true.csv"
//! prediction_file = "../output/pred.csv"
//! output_dir = "../output"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use descriptor::RuntimeKeys;
use model_zoo::EfficientNetVariant;
use result_plot::PlotConfig;
use saved_model::{SignatureOptions, DEFAULT_SIGNATURE_KEY, DEFAULT_TAG_SET};
use session_config::SessionOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialise error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete toolkit configuration.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    pub model: ModelSection,
    pub session: SessionSection,
    pub export: ExportSection,
    pub plot: PlotConfig,
}

/// Which model directory and signature the descriptor commands use.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub path: PathBuf,
    pub tag_set: String,
    pub signature_key: String,
    /// Also write `inout_sign.json` when extracting the signature.
    pub dump_signature: bool,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./SavedModel"),
            tag_set: DEFAULT_TAG_SET.to_string(),
            signature_key: DEFAULT_SIGNATURE_KEY.to_string(),
            dump_signature: false,
        }
    }
}

impl ModelSection {
    pub fn signature_options(&self) -> SignatureOptions {
        SignatureOptions {
            tag_set: self.tag_set.clone(),
            signature_key: self.signature_key.clone(),
            dump: self.dump_signature,
        }
    }
}

/// Session configuration and consumer settings injected into the descriptor.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub inpfile: PathBuf,
    pub allow_growth: bool,
    pub num_threads: i32,
    pub memory_fraction: f64,
    pub visible_device_list: String,
    pub allow_soft_placement: bool,
    pub log_device_placement: bool,
    pub rowmajor: Option<bool>,
    pub batch_size: Option<i32>,
    pub env: BTreeMap<String, String>,
}

impl Default for SessionSection {
    fn default() -> Self {
        let options = SessionOptions::default();
        Self {
            inpfile: PathBuf::from("./inpfile.json"),
            allow_growth: options.allow_growth,
            num_threads: options.num_threads,
            memory_fraction: options.memory_fraction,
            visible_device_list: options.visible_device_list,
            allow_soft_placement: options.allow_soft_placement,
            log_device_placement: options.log_device_placement,
            rowmajor: None,
            batch_size: None,
            env: BTreeMap::new(),
        }
    }
}

impl SessionSection {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            allow_growth: self.allow_growth,
            num_threads: self.num_threads,
            memory_fraction: self.memory_fraction,
            visible_device_list: self.visible_device_list.clone(),
            allow_soft_placement: self.allow_soft_placement,
            log_device_placement: self.log_device_placement,
        }
    }

    pub fn runtime_keys(&self) -> RuntimeKeys {
        RuntimeKeys {
            rowmajor: self.rowmajor,
            batch_size: self.batch_size,
            env: self.env.clone(),
        }
    }
}

/// Which architecture to export and where.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub variant: String,
    pub classes: u32,
    pub output: PathBuf,
    /// Pretrained SafeTensors weights to verify and ship.
    pub weights: Option<PathBuf>,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            variant: EfficientNetVariant::B0.as_str().to_string(),
            classes: model_zoo::IMAGENET_CLASSES,
            output: PathBuf::from("model"),
            weights: None,
        }
    }
}

impl ExportSection {
    pub fn parse_variant(&self) -> Result<EfficientNetVariant, ConfigError> {
        EfficientNetVariant::from_str_loose(&self.variant).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "unknown variant '{}'; expected one of b0..b7",
                self.variant
            ))
        })
    }
}

impl ToolkitConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                tracing::debug!("loading config {}", p.display());
                Self::from_file(p)
            }
            None => Ok(Self::default()),
        }
    }

    /// Checks values that would otherwise only fail deep inside a command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.export.parse_variant()?;
        if self.export.classes == 0 {
            return Err(ConfigError::Invalid("export.classes must be at least 1".into()));
        }
        if self.session.num_threads < 0 {
            return Err(ConfigError::Invalid(format!(
                "session.num_threads must not be negative, got {}",
                self.session.num_threads
            )));
        }
        if self.plot.value_columns.is_empty() {
            return Err(ConfigError::Invalid("plot.value_columns is empty".into()));
        }
        Ok(())
    }
}
