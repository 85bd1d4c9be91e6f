// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Consistency checks between a descriptor and a model signature.
//!
//! These are the conditions a consumer rejects at load time: tensor ids
//! the model does not expose, recorded widths that disagree with the
//! signature, and batched inference on multi-input/multi-output models.

use std::collections::BTreeMap;

use saved_model::{SignatureDescriptor, TensorSpec};

use crate::InputDescriptor;

/// One inconsistency found by [`InputDescriptor::check_against`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorIssue {
    #[error("{section}: {ids} id(s) but {dims} dim(s)")]
    LengthMismatch {
        section: &'static str,
        ids: usize,
        dims: usize,
    },

    #[error("{section}: tensor '{name}' is not part of the signature")]
    UnknownTensor { section: &'static str, name: String },

    #[error("{section}: tensor '{name}' recorded with width {recorded}, signature declares {declared:?}")]
    DimMismatch {
        section: &'static str,
        name: String,
        recorded: i64,
        declared: Option<i64>,
    },

    #[error("batch_size is set but the model has {inputs} input(s) and {outputs} output(s); batched inference needs exactly one of each")]
    BatchedMultiTensor { inputs: usize, outputs: usize },

    #[error("config cannot be decoded: {0}")]
    UnreadableConfig(String),
}

impl InputDescriptor {
    /// Compares the descriptor with the signature it claims to describe.
    /// An empty result means the descriptor is usable as-is.
    pub fn check_against(&self, signature: &SignatureDescriptor) -> Vec<DescriptorIssue> {
        let mut issues = Vec::new();
        check_section(
            "inputs",
            &self.inputs_id,
            &self.inputs_dim,
            &signature.inputs,
            &mut issues,
        );
        check_section(
            "outputs",
            &self.outputs_id,
            &self.outputs_dim,
            &signature.outputs,
            &mut issues,
        );

        if self.is_batched() && (self.inputs_id.len() > 1 || self.outputs_id.len() > 1) {
            issues.push(DescriptorIssue::BatchedMultiTensor {
                inputs: self.inputs_id.len(),
                outputs: self.outputs_id.len(),
            });
        }

        if let Some(Err(e)) = self.session_options() {
            issues.push(DescriptorIssue::UnreadableConfig(e.to_string()));
        }
        issues
    }
}

/// Free-function form of [`InputDescriptor::check_against`].
pub fn check_descriptor(
    descriptor: &InputDescriptor,
    signature: &SignatureDescriptor,
) -> Vec<DescriptorIssue> {
    descriptor.check_against(signature)
}

fn check_section(
    section: &'static str,
    ids: &[String],
    dims: &[i64],
    declared: &BTreeMap<String, TensorSpec>,
    issues: &mut Vec<DescriptorIssue>,
) {
    if ids.len() != dims.len() {
        issues.push(DescriptorIssue::LengthMismatch {
            section,
            ids: ids.len(),
            dims: dims.len(),
        });
    }

    for (i, name) in ids.iter().enumerate() {
        let Some(spec) = declared.values().find(|s| &s.name == name) else {
            issues.push(DescriptorIssue::UnknownTensor {
                section,
                name: name.clone(),
            });
            continue;
        };
        if let Some(&recorded) = dims.get(i) {
            let declared_dim = spec.feature_dim();
            if declared_dim != Some(recorded) {
                issues.push(DescriptorIssue::DimMismatch {
                    section,
                    name: name.clone(),
                    recorded,
                    declared: declared_dim,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, shape: &[&str]) -> TensorSpec {
        TensorSpec {
            shape: shape.iter().map(|s| s.to_string()).collect(),
            name: name.to_string(),
        }
    }

    fn signature() -> SignatureDescriptor {
        let mut sig = SignatureDescriptor::default();
        sig.inputs
            .insert("x".into(), spec("serving_default_x:0", &["-1", "2"]));
        sig.outputs
            .insert("y".into(), spec("StatefulPartitionedCall:0", &["-1", "3"]));
        sig.outputs
            .insert("z".into(), spec("StatefulPartitionedCall:1", &["-1", "1"]));
        sig
    }

    fn consistent() -> InputDescriptor {
        InputDescriptor {
            inputs_id: vec!["serving_default_x:0".into()],
            inputs_dim: vec![2],
            outputs_id: vec![
                "StatefulPartitionedCall:0".into(),
                "StatefulPartitionedCall:1".into(),
            ],
            outputs_dim: vec![3, 1],
            ..Default::default()
        }
    }

    #[test]
    fn test_consistent_descriptor() {
        assert!(check_descriptor(&consistent(), &signature()).is_empty());
    }

    #[test]
    fn test_unknown_tensor() {
        let mut d = consistent();
        d.inputs_id[0] = "serving_default_q:0".into();
        let issues = d.check_against(&signature());
        assert_eq!(
            issues,
            vec![DescriptorIssue::UnknownTensor {
                section: "inputs",
                name: "serving_default_q:0".into()
            }]
        );
    }

    #[test]
    fn test_dim_mismatch_and_length() {
        let mut d = consistent();
        d.outputs_dim = vec![4];
        let issues = d.check_against(&signature());
        assert!(issues.contains(&DescriptorIssue::LengthMismatch {
            section: "outputs",
            ids: 2,
            dims: 1
        }));
        assert!(issues.iter().any(|i| matches!(
            i,
            DescriptorIssue::DimMismatch { recorded: 4, declared: Some(3), .. }
        )));
    }

    #[test]
    fn test_batched_multi_output() {
        let d = InputDescriptor {
            batch_size: Some(32),
            ..consistent()
        };
        let issues = d.check_against(&signature());
        assert_eq!(
            issues,
            vec![DescriptorIssue::BatchedMultiTensor { inputs: 1, outputs: 2 }]
        );
    }

    #[test]
    fn test_unreadable_config() {
        let d = InputDescriptor {
            config: Some(vec!["zz".into()]),
            ..consistent()
        };
        let issues = d.check_against(&signature());
        assert!(matches!(issues.as_slice(), [DescriptorIssue::UnreadableConfig(_)]));
    }
}
