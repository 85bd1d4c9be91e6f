// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! EfficientNet B0–B7 in the Keras layer layout.
//!
//! The builder reproduces `tf.keras.applications.EfficientNetB*` with
//! `include_top=True`: a rescaling/normalisation stem, seven MBConv stages
//! with squeeze-and-excitation, a 1x1 head convolution and a softmax
//! classifier. Layer names, weight names and parameter counts match the
//! Keras model, so a SafeTensors dump of Keras weights can be checked
//! against the graph.

use tensor_meta::{DataType, TensorShape};

use crate::graph::{Loaded, ModelGraph};
use crate::{LayerDef, LayerType, ModelError};

/// Classes of the ImageNet classifier head.
pub const IMAGENET_CLASSES: u32 = 1000;

const DEPTH_DIVISOR: u32 = 8;
const DROP_CONNECT_RATE: f64 = 0.2;
const SE_RATIO: f64 = 0.25;
const STEM_FILTERS: u32 = 32;
const TOP_FILTERS: u32 = 1280;

/// One MBConv stage before width/depth scaling.
#[derive(Debug, Clone, Copy)]
struct BlockArgs {
    kernel: i64,
    repeats: u32,
    filters_in: u32,
    filters_out: u32,
    expand_ratio: u32,
    stride: u32,
}

const fn stage(
    kernel: i64,
    repeats: u32,
    filters_in: u32,
    filters_out: u32,
    expand_ratio: u32,
    stride: u32,
) -> BlockArgs {
    BlockArgs {
        kernel,
        repeats,
        filters_in,
        filters_out,
        expand_ratio,
        stride,
    }
}

const DEFAULT_BLOCKS: [BlockArgs; 7] = [
    stage(3, 1, 32, 16, 1, 1),
    stage(3, 2, 16, 24, 6, 2),
    stage(5, 2, 24, 40, 6, 2),
    stage(3, 3, 40, 80, 6, 2),
    stage(5, 3, 80, 112, 6, 1),
    stage(5, 4, 112, 192, 6, 2),
    stage(3, 1, 192, 320, 6, 1),
];

/// Compound-scaled EfficientNet variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficientNetVariant {
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
}

impl EfficientNetVariant {
    pub const ALL: [Self; 8] = [
        Self::B0,
        Self::B1,
        Self::B2,
        Self::B3,
        Self::B4,
        Self::B5,
        Self::B6,
        Self::B7,
    ];

    /// Accepts `"b3"`, `"B3"`, `"efficientnetb3"` and `"EfficientNet-B3"`.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase().replace(['-', '_'], "");
        let short = lower.strip_prefix("efficientnet").unwrap_or(&lower);
        Self::ALL.into_iter().find(|v| v.as_str() == short)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::B0 => "b0",
            Self::B1 => "b1",
            Self::B2 => "b2",
            Self::B3 => "b3",
            Self::B4 => "b4",
            Self::B5 => "b5",
            Self::B6 => "b6",
            Self::B7 => "b7",
        }
    }

    /// Width coefficient.
    pub fn width(&self) -> f64 {
        self.coefficients().0
    }

    /// Depth coefficient.
    pub fn depth(&self) -> f64 {
        self.coefficients().1
    }

    /// Default input resolution (square).
    pub fn resolution(&self) -> u32 {
        self.coefficients().2
    }

    /// Dropout rate before the classifier.
    pub fn dropout(&self) -> f64 {
        self.coefficients().3
    }

    /// Keras model name, e.g. `"efficientnetb0"`.
    pub fn model_name(&self) -> String {
        format!("efficientnet{}", self.as_str())
    }

    fn coefficients(&self) -> (f64, f64, u32, f64) {
        match self {
            Self::B0 => (1.0, 1.0, 224, 0.2),
            Self::B1 => (1.0, 1.1, 240, 0.2),
            Self::B2 => (1.1, 1.2, 260, 0.3),
            Self::B3 => (1.2, 1.4, 300, 0.3),
            Self::B4 => (1.4, 1.8, 380, 0.4),
            Self::B5 => (1.6, 2.2, 456, 0.4),
            Self::B6 => (1.8, 2.6, 528, 0.5),
            Self::B7 => (2.0, 3.1, 600, 0.5),
        }
    }

    /// Filter count after width scaling, rounded to a multiple of 8.
    fn round_filters(&self, filters: u32) -> u32 {
        let scaled = f64::from(filters) * self.width();
        let divisor = f64::from(DEPTH_DIVISOR);
        let mut rounded =
            DEPTH_DIVISOR.max(((scaled + divisor / 2.0) as u32) / DEPTH_DIVISOR * DEPTH_DIVISOR);
        if f64::from(rounded) < 0.9 * scaled {
            rounded += DEPTH_DIVISOR;
        }
        rounded
    }

    fn round_repeats(&self, repeats: u32) -> u32 {
        (self.depth() * f64::from(repeats)).ceil() as u32
    }
}

impl std::str::FromStr for EfficientNetVariant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| ModelError::UnknownVariant(s.to_string()))
    }
}

impl std::fmt::Display for EfficientNetVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the layer graph of an EfficientNet variant.
#[derive(Debug, Clone)]
pub struct EfficientNetBuilder {
    variant: EfficientNetVariant,
    classes: u32,
}

impl EfficientNetBuilder {
    pub fn new(variant: EfficientNetVariant) -> Self {
        Self {
            variant,
            classes: IMAGENET_CLASSES,
        }
    }

    /// Overrides the size of the classifier head.
    pub fn classes(mut self, classes: u32) -> Self {
        self.classes = classes;
        self
    }

    pub fn variant(&self) -> EfficientNetVariant {
        self.variant
    }

    /// Produces the unvalidated graph.
    pub fn build(&self) -> ModelGraph<Loaded> {
        let v = self.variant;
        let res = i64::from(v.resolution());
        let mut g = GraphBuilder::default();

        // Stem.
        g.push("input_1", LayerType::InputLayer, vec![], vec![], TensorShape::batched(&[res, res, 3]));
        g.chain("rescaling", LayerType::Rescaling, vec![], spatial(res, 3));
        g.chain(
            "normalization",
            LayerType::Normalization,
            vec![
                ("mean", TensorShape::vector(3)),
                ("variance", TensorShape::vector(3)),
                ("count", TensorShape::scalar()),
            ],
            spatial(res, 3),
        );

        let stem = i64::from(v.round_filters(STEM_FILTERS));
        g.chain("stem_conv_pad", LayerType::ZeroPadding2D, vec![], spatial(padded(res, 3), 3));
        let mut hw = halve(res);
        g.chain(
            "stem_conv",
            LayerType::Conv2D,
            vec![("kernel", kernel(3, 3, stem))],
            spatial(hw, stem),
        );
        g.batch_norm("stem_bn", hw, stem);
        g.chain("stem_activation", LayerType::Activation, vec![], spatial(hw, stem));

        // MBConv stages.
        let total_blocks: u32 = DEFAULT_BLOCKS.iter().map(|b| v.round_repeats(b.repeats)).sum();
        let mut block_index = 0u32;
        for (stage_index, args) in DEFAULT_BLOCKS.iter().enumerate() {
            let mut args = BlockArgs {
                filters_in: v.round_filters(args.filters_in),
                filters_out: v.round_filters(args.filters_out),
                ..*args
            };
            for j in 0..v.round_repeats(args.repeats) {
                if j > 0 {
                    args.stride = 1;
                    args.filters_in = args.filters_out;
                }
                let drop_rate = DROP_CONNECT_RATE * f64::from(block_index) / f64::from(total_blocks);
                let letter = char::from(b'a' + j as u8);
                let prefix = format!("block{}{}_", stage_index + 1, letter);
                hw = g.mb_conv(&prefix, &args, hw, drop_rate);
                block_index += 1;
            }
        }

        // Head.
        let last = i64::from(v.round_filters(DEFAULT_BLOCKS[6].filters_out));
        let top = i64::from(v.round_filters(TOP_FILTERS));
        g.chain(
            "top_conv",
            LayerType::Conv2D,
            vec![("kernel", kernel(1, last, top))],
            spatial(hw, top),
        );
        g.batch_norm("top_bn", hw, top);
        g.chain("top_activation", LayerType::Activation, vec![], spatial(hw, top));
        g.chain("avg_pool", LayerType::GlobalAveragePooling2D, vec![], TensorShape::batched(&[top]));
        if v.dropout() > 0.0 {
            g.chain("top_dropout", LayerType::Dropout, vec![], TensorShape::batched(&[top]));
        }
        let classes = i64::from(self.classes);
        g.chain(
            "predictions",
            LayerType::Dense,
            vec![
                ("kernel", TensorShape::matrix(top, classes)),
                ("bias", TensorShape::vector(classes)),
            ],
            TensorShape::batched(&[classes]),
        );

        tracing::debug!(
            "built {} with {} layers ({} MBConv blocks)",
            v.model_name(),
            g.layers.len(),
            total_blocks
        );
        ModelGraph::new(v.model_name(), g.layers)
    }
}

// ── Shape helpers ──────────────────────────────────────────────────

fn spatial(hw: i64, channels: i64) -> TensorShape {
    TensorShape::batched(&[hw, hw, channels])
}

fn kernel(k: i64, c_in: i64, c_out: i64) -> TensorShape {
    TensorShape::new(vec![k, k, c_in, c_out])
}

/// Extent after Keras' `correct_pad` for a stride-2 `valid` convolution.
fn padded(hw: i64, k: i64) -> i64 {
    let adjust = 1 - hw % 2;
    hw + (k / 2 - adjust) + k / 2
}

/// Extent after a stride-2 convolution on the padded input.
fn halve(hw: i64) -> i64 {
    (hw + 1) / 2
}

// ── Graph assembly ─────────────────────────────────────────────────

#[derive(Default)]
struct GraphBuilder {
    layers: Vec<LayerDef>,
}

impl GraphBuilder {
    fn push(
        &mut self,
        name: &str,
        layer_type: LayerType,
        inbound: Vec<String>,
        weights: Vec<(&str, TensorShape)>,
        output_shape: TensorShape,
    ) {
        let (weight_names, weight_shapes) = weights
            .into_iter()
            .map(|(w, shape)| (format!("{name}/{w}"), shape))
            .unzip();
        self.layers.push(LayerDef {
            name: name.to_string(),
            layer_type,
            index: self.layers.len(),
            inbound,
            weight_names,
            weight_shapes,
            dtype: DataType::Float32,
            output_shape,
        });
    }

    /// Appends a layer fed by the previous one.
    fn chain(
        &mut self,
        name: &str,
        layer_type: LayerType,
        weights: Vec<(&str, TensorShape)>,
        output_shape: TensorShape,
    ) {
        let inbound = self.last_name().into_iter().collect();
        self.push(name, layer_type, inbound, weights, output_shape);
    }

    fn last_name(&self) -> Option<String> {
        self.layers.last().map(|l| l.name.clone())
    }

    fn batch_norm(&mut self, name: &str, hw: i64, channels: i64) {
        let stats = ["gamma", "beta", "moving_mean", "moving_variance"];
        self.chain(
            name,
            LayerType::BatchNormalization,
            stats.map(|s| (s, TensorShape::vector(channels))).to_vec(),
            spatial(hw, channels),
        );
    }

    /// Mobile inverted bottleneck with squeeze-and-excitation. Returns the
    /// spatial extent of the block output.
    fn mb_conv(&mut self, prefix: &str, args: &BlockArgs, hw_in: i64, drop_rate: f64) -> i64 {
        let block_input = self.last_name().unwrap_or_default();
        let c_in = i64::from(args.filters_in);
        let c_out = i64::from(args.filters_out);
        let expanded = c_in * i64::from(args.expand_ratio);
        let k = args.kernel;
        let n = |suffix: &str| format!("{prefix}{suffix}");

        if args.expand_ratio != 1 {
            self.chain(
                &n("expand_conv"),
                LayerType::Conv2D,
                vec![("kernel", kernel(1, c_in, expanded))],
                spatial(hw_in, expanded),
            );
            self.batch_norm(&n("expand_bn"), hw_in, expanded);
            self.chain(&n("expand_activation"), LayerType::Activation, vec![], spatial(hw_in, expanded));
        }

        let hw = if args.stride == 2 {
            self.chain(
                &n("dwconv_pad"),
                LayerType::ZeroPadding2D,
                vec![],
                spatial(padded(hw_in, k), expanded),
            );
            halve(hw_in)
        } else {
            hw_in
        };
        self.chain(
            &n("dwconv"),
            LayerType::DepthwiseConv2D,
            vec![("depthwise_kernel", kernel(k, expanded, 1))],
            spatial(hw, expanded),
        );
        self.batch_norm(&n("bn"), hw, expanded);
        self.chain(&n("activation"), LayerType::Activation, vec![], spatial(hw, expanded));
        let activation = n("activation");

        let squeezed = ((args.filters_in as f64 * SE_RATIO) as i64).max(1);
        self.chain(&n("se_squeeze"), LayerType::GlobalAveragePooling2D, vec![], TensorShape::batched(&[expanded]));
        self.chain(&n("se_reshape"), LayerType::Reshape, vec![], spatial(1, expanded));
        self.chain(
            &n("se_reduce"),
            LayerType::Conv2D,
            vec![
                ("kernel", kernel(1, expanded, squeezed)),
                ("bias", TensorShape::vector(squeezed)),
            ],
            spatial(1, squeezed),
        );
        self.chain(
            &n("se_expand"),
            LayerType::Conv2D,
            vec![
                ("kernel", kernel(1, squeezed, expanded)),
                ("bias", TensorShape::vector(expanded)),
            ],
            spatial(1, expanded),
        );
        self.push(
            &n("se_excite"),
            LayerType::Multiply,
            vec![activation, n("se_expand")],
            vec![],
            spatial(hw, expanded),
        );

        self.chain(
            &n("project_conv"),
            LayerType::Conv2D,
            vec![("kernel", kernel(1, expanded, c_out))],
            spatial(hw, c_out),
        );
        self.batch_norm(&n("project_bn"), hw, c_out);

        if args.stride == 1 && args.filters_in == args.filters_out {
            if drop_rate > 0.0 {
                self.chain(&n("drop"), LayerType::Dropout, vec![], spatial(hw, c_out));
            }
            let residual = self.last_name().unwrap_or_default();
            self.push(
                &n("add"),
                LayerType::Add,
                vec![residual, block_input],
                vec![],
                spatial(hw, c_out),
            );
        }
        hw
    }
}
