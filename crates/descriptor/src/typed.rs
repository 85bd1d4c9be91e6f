// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed, read-only view of a descriptor.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use session_config::{SessionConfigError, SessionOptions};

/// The keys a downstream consumer reads from `inpfile.json`.
///
/// Every field is optional so that partially-populated descriptors (e.g.
/// before `generate` ran) still parse.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, Deserialize)]
pub struct InputDescriptor {
    #[serde(default)]
    pub path_to_model: Option<PathBuf>,
    #[serde(default)]
    pub inputs_id: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_dims")]
    pub inputs_dim: Vec<i64>,
    #[serde(default)]
    pub outputs_id: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_dims")]
    pub outputs_dim: Vec<i64>,
    /// Hex tokens of the serialised session configuration.
    #[serde(default)]
    pub config: Option<Vec<String>>,
    /// Input/output buffers are row-major (consumer default: `true`).
    #[serde(default)]
    pub rowmajor: Option<bool>,
    /// Points per inference call; `<= 0` disables batching.
    #[serde(default)]
    pub batch_size: Option<i32>,
    /// Environment variables the consumer exports before loading the model.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Dims are recorded as text (`"2"`); hand-written files may use numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum DimRepr {
    Int(i64),
    Text(String),
}

fn deserialize_dims<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
    Vec::<DimRepr>::deserialize(deserializer)?
        .into_iter()
        .map(|repr| match repr {
            DimRepr::Int(v) => Ok(v),
            DimRepr::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid dimension '{s}'"))),
        })
        .collect()
}

impl InputDescriptor {
    /// Decodes the stored session configuration, if any.
    pub fn session_options(&self) -> Option<Result<SessionOptions, SessionConfigError>> {
        self.config
            .as_ref()
            .map(|tokens| SessionOptions::from_hex_tokens(tokens))
    }

    /// Sum of input feature widths: values per point across all inputs.
    pub fn input_total_dim(&self) -> i64 {
        self.inputs_dim.iter().sum()
    }

    /// Sum of output feature widths.
    pub fn output_total_dim(&self) -> i64 {
        self.outputs_dim.iter().sum()
    }

    /// Whether the consumer will split calls into batches.
    pub fn is_batched(&self) -> bool {
        self.batch_size.is_some_and(|b| b > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let json = r#"{
            "path_to_model": "/models/msd",
            "inputs_id": ["serving_default_x:0"],
            "inputs_dim": [2],
            "outputs_id": ["StatefulPartitionedCall:0", "StatefulPartitionedCall:1"],
            "outputs_dim": [1, 3],
            "rowmajor": false,
            "batch_size": 64,
            "env": { "TF_CPP_MIN_LOG_LEVEL": "2" },
            "custom": { "kept": true }
        }"#;
        let d: InputDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.path_to_model, Some(PathBuf::from("/models/msd")));
        assert_eq!(d.input_total_dim(), 2);
        assert_eq!(d.output_total_dim(), 4);
        assert_eq!(d.rowmajor, Some(false));
        assert!(d.is_batched());
        assert_eq!(d.env["TF_CPP_MIN_LOG_LEVEL"], "2");
        assert!(d.session_options().is_none());
    }

    #[test]
    fn test_parse_text_dims() {
        let d: InputDescriptor =
            serde_json::from_str(r#"{ "inputs_dim": ["2", " 3"], "outputs_dim": [4] }"#).unwrap();
        assert_eq!(d.inputs_dim, vec![2, 3]);
        assert_eq!(d.outputs_dim, vec![4]);
    }

    #[test]
    fn test_reject_bad_dims() {
        let r: Result<InputDescriptor, _> = serde_json::from_str(r#"{ "inputs_dim": ["two"] }"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_empty_object() {
        let d: InputDescriptor = serde_json::from_str("{}").unwrap();
        assert_eq!(d, InputDescriptor::default());
        assert!(!d.is_batched());
    }

    #[test]
    fn test_session_options_decode() {
        let d = InputDescriptor {
            config: Some(SessionOptions::default().create_serialized_options()),
            ..Default::default()
        };
        assert_eq!(d.session_options().unwrap().unwrap(), SessionOptions::default());
    }
}
