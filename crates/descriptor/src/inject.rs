// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Writers for the keys the descriptor does not derive from the model.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};
use session_config::SessionOptions;

use crate::{DescriptorError, DescriptorFile, CONFIG_KEY};

/// Serialises `options` and stores the hex tokens under `config`.
///
/// The descriptor must already exist; every other key is kept as-is.
/// Returns the tokens that were written.
pub fn set_session_config(
    inpfile: &Path,
    options: &SessionOptions,
) -> Result<Vec<String>, DescriptorError> {
    let mut file = DescriptorFile::open(inpfile)?;
    let tokens = options.create_serialized_options();
    tracing::debug!(
        "session config: growth={} threads={} fraction={} devices='{}' ({} bytes)",
        options.allow_growth,
        options.num_threads,
        options.memory_fraction,
        options.visible_device_list,
        tokens.len()
    );
    file.set(CONFIG_KEY, &tokens)?;
    file.save()?;
    Ok(tokens)
}

/// Consumer settings stored alongside the generated keys.
///
/// `None` fields leave the corresponding key untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeKeys {
    #[serde(default)]
    pub rowmajor: Option<bool>,
    #[serde(default)]
    pub batch_size: Option<i32>,
    /// Merged into any existing `env` object.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl RuntimeKeys {
    pub fn is_empty(&self) -> bool {
        self.rowmajor.is_none() && self.batch_size.is_none() && self.env.is_empty()
    }
}

/// Applies `keys` to an existing descriptor.
pub fn set_runtime_keys(inpfile: &Path, keys: &RuntimeKeys) -> Result<(), DescriptorError> {
    if keys.is_empty() {
        tracing::debug!("no runtime keys to write");
        return Ok(());
    }
    let mut file = DescriptorFile::open(inpfile)?;

    if let Some(rowmajor) = keys.rowmajor {
        file.set("rowmajor", rowmajor)?;
    }
    if let Some(batch_size) = keys.batch_size {
        file.set("batch_size", batch_size)?;
    }
    if !keys.env.is_empty() {
        let mut env = match file.get("env") {
            Some(Value::Object(existing)) => existing.clone(),
            Some(other) => {
                tracing::warn!("replacing non-object env value {other}");
                Map::new()
            }
            None => Map::new(),
        };
        for (k, v) in &keys.env {
            env.insert(k.clone(), Value::from(v.clone()));
        }
        file.set("env", env)?;
    }
    file.save()
}
