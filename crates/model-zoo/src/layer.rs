// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer definitions for the classifier IR.
//!
//! Each [`LayerDef`] describes a single Keras-style layer: its type, the
//! layers feeding it, its output shape and the names and shapes of its
//! weights. Weight data is **not** stored here; names are keys into the
//! SafeTensors file holding pretrained values.

use tensor_meta::{DataType, TensorShape};

/// Last path segments of weights that are updated by statistics rather
/// than by the optimiser.
const NON_TRAINABLE_SUFFIXES: [&str; 5] = ["moving_mean", "moving_variance", "mean", "variance", "count"];

/// The kind of computation a layer performs, named after its Keras class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LayerType {
    InputLayer,
    Rescaling,
    Normalization,
    ZeroPadding2D,
    Conv2D,
    DepthwiseConv2D,
    BatchNormalization,
    Activation,
    GlobalAveragePooling2D,
    Reshape,
    Multiply,
    Dropout,
    Add,
    Dense,
}

impl LayerType {
    /// Parses a layer type from a manifest string.
    ///
    /// Accepts the Keras class name in any case as well as snake_case
    /// (`"depthwise_conv2d"`) and a few short aliases (`"bn"`, `"gap"`).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "").as_str() {
            "inputlayer" | "input" => Some(Self::InputLayer),
            "rescaling" => Some(Self::Rescaling),
            "normalization" => Some(Self::Normalization),
            "zeropadding2d" | "pad" => Some(Self::ZeroPadding2D),
            "conv2d" | "conv" => Some(Self::Conv2D),
            "depthwiseconv2d" | "dwconv" => Some(Self::DepthwiseConv2D),
            "batchnormalization" | "batchnorm" | "bn" => Some(Self::BatchNormalization),
            "activation" => Some(Self::Activation),
            "globalaveragepooling2d" | "gap" => Some(Self::GlobalAveragePooling2D),
            "reshape" => Some(Self::Reshape),
            "multiply" => Some(Self::Multiply),
            "dropout" => Some(Self::Dropout),
            "add" => Some(Self::Add),
            "dense" | "linear" => Some(Self::Dense),
            _ => None,
        }
    }

    /// Returns the Keras class name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputLayer => "InputLayer",
            Self::Rescaling => "Rescaling",
            Self::Normalization => "Normalization",
            Self::ZeroPadding2D => "ZeroPadding2D",
            Self::Conv2D => "Conv2D",
            Self::DepthwiseConv2D => "DepthwiseConv2D",
            Self::BatchNormalization => "BatchNormalization",
            Self::Activation => "Activation",
            Self::GlobalAveragePooling2D => "GlobalAveragePooling2D",
            Self::Reshape => "Reshape",
            Self::Multiply => "Multiply",
            Self::Dropout => "Dropout",
            Self::Add => "Add",
            Self::Dense => "Dense",
        }
    }

    /// Whether layers of this type merge several inbound tensors.
    pub fn is_merge(&self) -> bool {
        matches!(self, Self::Add | Self::Multiply)
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing a single layer in the model graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Unique identifier for this layer (e.g., `"block2a_dwconv"`).
    pub name: String,
    /// The type of computation this layer performs.
    pub layer_type: LayerType,
    /// Index in the execution order (0-based).
    pub index: usize,
    /// Names of the layers whose outputs feed this one.
    pub inbound: Vec<String>,
    /// Names of weight tensors (e.g., `"stem_conv/kernel"`).
    pub weight_names: Vec<String>,
    /// Shapes of the weight tensors (parallel to `weight_names`).
    pub weight_shapes: Vec<TensorShape>,
    /// Element type of weights and activations.
    pub dtype: DataType,
    /// Shape of the output activation, batch axis unknown.
    pub output_shape: TensorShape,
}

impl LayerDef {
    /// Number of scalar parameters across all weights.
    pub fn num_params(&self) -> u64 {
        self.weight_shapes
            .iter()
            .filter_map(TensorShape::num_elements)
            .sum()
    }

    /// Parameters not updated by the optimiser (normalisation statistics).
    pub fn non_trainable_params(&self) -> u64 {
        self.weight_names
            .iter()
            .zip(&self.weight_shapes)
            .filter(|(name, _)| is_non_trainable(name))
            .filter_map(|(_, shape)| shape.num_elements())
            .sum()
    }

    pub fn trainable_params(&self) -> u64 {
        self.num_params() - self.non_trainable_params()
    }

    /// Memory required for this layer's weights in bytes.
    pub fn weight_bytes(&self) -> u64 {
        self.weight_shapes
            .iter()
            .filter_map(|s| s.size_bytes(self.dtype))
            .sum()
    }

    /// Iterates over `(name, shape)` pairs of the layer's weights.
    pub fn weights(&self) -> impl Iterator<Item = (&str, &TensorShape)> {
        self.weight_names
            .iter()
            .map(String::as_str)
            .zip(&self.weight_shapes)
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} ({}) -> {}, {} params",
            self.index,
            self.name,
            self.layer_type,
            self.output_shape,
            self.num_params(),
        )
    }
}

fn is_non_trainable(weight_name: &str) -> bool {
    let last = weight_name.rsplit('/').next().unwrap_or(weight_name);
    NON_TRAINABLE_SUFFIXES.contains(&last)
}
