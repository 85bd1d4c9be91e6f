// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Protobuf messages for the metadata subset of `saved_model.proto`,
//! `meta_graph.proto` and `tensor_shape.proto`.
//!
//! Field numbers match TensorFlow's definitions, so files written by
//! TensorFlow decode here (unknown fields such as `graph_def` are skipped)
//! and files written here decode in TensorFlow. Maps use `BTreeMap` so
//! that encoding is deterministic.

use std::collections::BTreeMap;

use tensor_meta::TensorShape;

/// `tensorflow.SavedModel`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SavedModel {
    #[prost(int64, tag = "1")]
    pub saved_model_schema_version: i64,
    #[prost(message, repeated, tag = "2")]
    pub meta_graphs: Vec<MetaGraphDef>,
}

/// `tensorflow.MetaGraphDef` (metadata fields only).
#[derive(Clone, PartialEq, prost::Message)]
pub struct MetaGraphDef {
    #[prost(message, optional, tag = "1")]
    pub meta_info_def: Option<MetaInfoDef>,
    #[prost(btree_map = "string, message", tag = "5")]
    pub signature_def: BTreeMap<String, SignatureDef>,
}

/// `tensorflow.MetaGraphDef.MetaInfoDef` (subset).
#[derive(Clone, PartialEq, prost::Message)]
pub struct MetaInfoDef {
    #[prost(string, tag = "1")]
    pub meta_graph_version: String,
    #[prost(string, repeated, tag = "4")]
    pub tags: Vec<String>,
    #[prost(string, tag = "5")]
    pub tensorflow_version: String,
}

/// `tensorflow.SignatureDef`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignatureDef {
    #[prost(btree_map = "string, message", tag = "1")]
    pub inputs: BTreeMap<String, TensorInfo>,
    #[prost(btree_map = "string, message", tag = "2")]
    pub outputs: BTreeMap<String, TensorInfo>,
    #[prost(string, tag = "3")]
    pub method_name: String,
}

/// `tensorflow.TensorInfo`, dense encoding only.
///
/// `name` is the `encoding` oneof's dense variant; sparse and composite
/// encodings are not interpreted.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorInfo {
    #[prost(string, tag = "1")]
    pub name: String,
    /// `tensorflow.DataType` enum code.
    #[prost(int32, tag = "2")]
    pub dtype: i32,
    #[prost(message, optional, tag = "3")]
    pub tensor_shape: Option<TensorShapeProto>,
}

/// `tensorflow.TensorShapeProto`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorShapeProto {
    #[prost(message, repeated, tag = "2")]
    pub dim: Vec<tensor_shape_proto::Dim>,
    #[prost(bool, tag = "3")]
    pub unknown_rank: bool,
}

pub mod tensor_shape_proto {
    /// One dimension; `size == -1` marks an unknown extent.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Dim {
        #[prost(int64, tag = "1")]
        pub size: i64,
        #[prost(string, tag = "2")]
        pub name: String,
    }
}

impl MetaGraphDef {
    /// Tags of this meta graph (empty when `meta_info_def` is absent).
    pub fn tags(&self) -> &[String] {
        self.meta_info_def
            .as_ref()
            .map(|m| m.tags.as_slice())
            .unwrap_or_default()
    }
}

impl TensorInfo {
    /// Declared shape. A missing `tensor_shape` reads as rank 0, the
    /// protobuf default.
    pub fn shape(&self) -> TensorShape {
        match &self.tensor_shape {
            Some(proto) => proto.to_shape(),
            None => TensorShape::scalar(),
        }
    }
}

impl TensorShapeProto {
    /// Converts to a [`TensorShape`].
    pub fn to_shape(&self) -> TensorShape {
        if self.unknown_rank {
            TensorShape::unknown_rank()
        } else {
            TensorShape::new(self.dim.iter().map(|d| d.size).collect())
        }
    }

    /// Builds the protobuf form of a [`TensorShape`].
    pub fn from_shape(shape: &TensorShape) -> Self {
        match shape.dims() {
            Some(dims) => Self {
                dim: dims
                    .iter()
                    .map(|&size| tensor_shape_proto::Dim {
                        size,
                        name: String::new(),
                    })
                    .collect(),
                unknown_rank: false,
            },
            None => Self {
                dim: Vec::new(),
                unknown_rank: true,
            },
        }
    }
}
