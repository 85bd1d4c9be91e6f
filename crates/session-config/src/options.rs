// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Session options and their `ConfigProto` encoding.
//!
//! # TOML Format
//! ```toml
//! allow_growth = true
//! num_threads = 8
//! memory_fraction = 0.3
//! visible_device_list = "0"
//! ```

use prost::Message;

use crate::proto::{ConfigProto, GpuOptions};
use crate::{hex, SessionConfigError};

/// Device-memory and threading options for a TensorFlow session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Grow GPU memory on demand instead of reserving it up front.
    pub allow_growth: bool,
    /// Thread count, applied to both intra-op and inter-op parallelism.
    pub num_threads: i32,
    /// Fraction of each visible GPU's memory to reserve (0.0–1.0).
    ///
    /// Not range-checked here; TensorFlow validates it when the
    /// configuration is applied.
    pub memory_fraction: f64,
    /// Comma-separated GPU indices visible to the session (e.g. `"0,1"`).
    pub visible_device_list: String,
    /// Fall back to another device when an op has no kernel for the
    /// requested one.
    pub allow_soft_placement: bool,
    /// Log the device each op is placed on.
    pub log_device_placement: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            allow_growth: true,
            num_threads: 8,
            memory_fraction: 0.3,
            visible_device_list: "0".to_string(),
            allow_soft_placement: false,
            log_device_placement: false,
        }
    }
}

impl SessionOptions {
    /// Builds the `ConfigProto` these options describe.
    pub fn to_config_proto(&self) -> ConfigProto {
        ConfigProto {
            intra_op_parallelism_threads: self.num_threads,
            inter_op_parallelism_threads: self.num_threads,
            gpu_options: Some(GpuOptions {
                per_process_gpu_memory_fraction: self.memory_fraction,
                allow_growth: self.allow_growth,
                visible_device_list: self.visible_device_list.clone(),
            }),
            allow_soft_placement: self.allow_soft_placement,
            log_device_placement: self.log_device_placement,
        }
    }

    /// Recovers options from a decoded `ConfigProto`.
    ///
    /// The thread count is taken from `intra_op_parallelism_threads`.
    pub fn from_config_proto(proto: &ConfigProto) -> Self {
        if proto.intra_op_parallelism_threads != proto.inter_op_parallelism_threads {
            tracing::warn!(
                "intra-op ({}) and inter-op ({}) thread counts differ; keeping intra-op",
                proto.intra_op_parallelism_threads,
                proto.inter_op_parallelism_threads,
            );
        }
        let gpu = proto.gpu_options.clone().unwrap_or_default();
        Self {
            allow_growth: gpu.allow_growth,
            num_threads: proto.intra_op_parallelism_threads,
            memory_fraction: gpu.per_process_gpu_memory_fraction,
            visible_device_list: gpu.visible_device_list,
            allow_soft_placement: proto.allow_soft_placement,
            log_device_placement: proto.log_device_placement,
        }
    }

    /// Serialises the `ConfigProto` with the canonical protobuf encoding.
    pub fn serialize(&self) -> Vec<u8> {
        self.to_config_proto().encode_to_vec()
    }

    /// Serialises and renders each byte as a hex token.
    pub fn create_serialized_options(&self) -> Vec<String> {
        hex::encode_tokens(&self.serialize())
    }

    /// Parses serialised `ConfigProto` bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionConfigError> {
        let proto = ConfigProto::decode(bytes)?;
        Ok(Self::from_config_proto(&proto))
    }

    /// Parses a hex-token list produced by
    /// [`create_serialized_options`](Self::create_serialized_options).
    pub fn from_hex_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, SessionConfigError> {
        let bytes = hex::decode_tokens(tokens)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_serialization_bytes() {
        // intra=8, inter=8, gpu_options{fraction=0.3, allow_growth, devices="0"}
        let expected: Vec<u8> = vec![
            0x10, 0x08, // field 2
            0x28, 0x08, // field 5
            0x32, 0x0e, // field 6, 14 bytes
            0x09, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0xd3, 0x3f, // 0.3
            0x20, 0x01, // allow_growth
            0x2a, 0x01, 0x30, // "0"
        ];
        assert_eq!(SessionOptions::default().serialize(), expected);
    }

    #[test]
    fn test_one_token_per_byte() {
        let opts = SessionOptions {
            num_threads: 300,
            visible_device_list: "0,1,2".into(),
            ..Default::default()
        };
        let bytes = opts.serialize();
        let tokens = opts.create_serialized_options();
        assert_eq!(tokens.len(), bytes.len());
        assert!(tokens
            .iter()
            .all(|t| t.len() == 2 && t.chars().all(|c| c.is_ascii_hexdigit())));
        assert_eq!(tokens.concat().len() % 2, 0);
    }

    #[test]
    fn test_hex_roundtrip() {
        let opts = SessionOptions {
            allow_growth: false,
            num_threads: 2,
            memory_fraction: 0.75,
            visible_device_list: "1,3".into(),
            allow_soft_placement: true,
            log_device_placement: false,
        };
        let back = SessionOptions::from_hex_tokens(&opts.create_serialized_options()).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn test_legacy_token_form_roundtrip() {
        let legacy: Vec<String> = SessionOptions::default()
            .serialize()
            .iter()
            .map(|b| format!("{b:#x}"))
            .collect();
        assert_eq!(legacy[1], "0x8");
        let back = SessionOptions::from_hex_tokens(&legacy).unwrap();
        assert_eq!(back, SessionOptions::default());
    }

    #[test]
    fn test_out_of_range_fraction_passes_through() {
        let opts = SessionOptions {
            memory_fraction: 1.5,
            ..Default::default()
        };
        let back = SessionOptions::from_bytes(&opts.serialize()).unwrap();
        assert_eq!(back.memory_fraction, 1.5);
    }

    #[test]
    fn test_serialization_is_stable() {
        let opts = SessionOptions::default();
        assert_eq!(opts.create_serialized_options(), opts.create_serialized_options());
    }

    #[test]
    fn test_gpu_options_always_present() {
        let opts = SessionOptions {
            allow_growth: false,
            num_threads: 0,
            memory_fraction: 0.0,
            visible_device_list: String::new(),
            ..Default::default()
        };
        // Empty GPUOptions sub-message: tag 6, length 0.
        assert_eq!(opts.serialize(), vec![0x32, 0x00]);
    }

    #[test]
    fn test_corrupt_bytes() {
        assert!(matches!(
            SessionOptions::from_bytes(&[0x32, 0x7f]),
            Err(SessionConfigError::Decode(_))
        ));
    }

    #[test]
    fn test_partial_toml_like_json() {
        let opts: SessionOptions = serde_json::from_str(r#"{ "num_threads": 4 }"#).unwrap();
        assert_eq!(opts.num_threads, 4);
        assert!(opts.allow_growth);
        assert_eq!(opts.visible_device_list, "0");
    }
}
