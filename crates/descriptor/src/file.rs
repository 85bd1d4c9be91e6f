// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Load-merge-write access to a descriptor file.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{DescriptorError, InputDescriptor};

/// A descriptor JSON object together with the path it belongs to.
///
/// Keys keep their original order; updated keys stay in place and new keys
/// are appended.
#[derive(Debug, Clone)]
pub struct DescriptorFile {
    path: PathBuf,
    data: Map<String, Value>,
}

impl DescriptorFile {
    /// Loads an existing descriptor. The file must exist and hold a JSON object.
    pub fn open(path: &Path) -> Result<Self, DescriptorError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DescriptorError::io(path, e))?;
        let value: Value =
            serde_json::from_str(&content).map_err(|source| DescriptorError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        match value {
            Value::Object(data) => Ok(Self {
                path: path.to_path_buf(),
                data,
            }),
            _ => Err(DescriptorError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Loads the descriptor at `path`, or starts an empty one if the file
    /// does not exist yet.
    pub fn open_or_empty(path: &Path) -> Result<Self, DescriptorError> {
        if path.exists() {
            Self::open(path)
        } else {
            tracing::debug!("'{}' does not exist; starting empty descriptor", path.display());
            Ok(Self {
                path: path.to_path_buf(),
                data: Map::new(),
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw JSON object.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Sets `key`, replacing any previous value.
    pub fn set<T: serde::Serialize>(&mut self, key: &str, value: T) -> Result<(), DescriptorError> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Parses the object into the typed view.
    pub fn typed(&self) -> Result<InputDescriptor, DescriptorError> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }

    /// Renders the object as 2-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    /// Writes the whole object back to its path.
    pub fn save(&self) -> Result<(), DescriptorError> {
        let json = self.to_json_pretty()?;
        saved_model::write_atomic(&self.path, json.as_bytes())
            .map_err(|e| DescriptorError::io(&self.path, e))?;
        tracing::info!("wrote descriptor {} ({} keys)", self.path.display(), self.data.len());
        Ok(())
    }
}
