// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: the classifier as a DAG of layers in execution order.
//!
//! # Type-State Pattern
//!
//! The graph transitions through states enforced at compile time:
//!
//! ```text
//! ModelGraph<Loaded>     : layers built or parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated>  : structure verified, ready for export.
//! ```
//!
//! The exporter only accepts `ModelGraph<Validated>`, so an inconsistent
//! graph can never reach disk.

use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;

use crate::{LayerDef, LayerType, ModelError};

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been built but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and can be exported.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// The complete model represented as an ordered sequence of layers.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Model name as Keras reports it (e.g., `"efficientnetb0"`).
    pub name: String,
    /// Ordered list of layer definitions.
    pub layers: Vec<LayerDef>,
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(name: String, layers: Vec<LayerDef>) -> Self {
        Self {
            name,
            layers,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph is non-empty and starts with an `InputLayer`.
    /// - Layer indices are consecutive starting from 0.
    /// - Layer names are unique.
    /// - Every inbound name refers to an earlier layer; merge layers have
    ///   at least two inbound layers, all others exactly one.
    /// - `weight_names` and `weight_shapes` are parallel.
    /// - No output or weight shape has a zero-sized dimension.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        let Some(first) = self.layers.first() else {
            return Err(ModelError::InvalidGraph(
                "model graph contains no layers".into(),
            ));
        };
        if first.layer_type != LayerType::InputLayer {
            return Err(ModelError::InvalidGraph(format!(
                "first layer '{}' is a {}, expected InputLayer",
                first.name, first.layer_type
            )));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.index != i {
                return Err(invalid(layer, format!("expected index {i}, got {}", layer.index)));
            }

            for src in &layer.inbound {
                if !seen.contains(src.as_str()) {
                    return Err(invalid(
                        layer,
                        format!("inbound layer '{src}' is not defined before it"),
                    ));
                }
            }
            let expected_inbound = match layer.layer_type {
                LayerType::InputLayer => layer.inbound.is_empty(),
                t if t.is_merge() => layer.inbound.len() >= 2,
                _ => layer.inbound.len() == 1,
            };
            if !expected_inbound {
                return Err(invalid(
                    layer,
                    format!("{} inbound layer(s) for a {}", layer.inbound.len(), layer.layer_type),
                ));
            }

            if !seen.insert(layer.name.as_str()) {
                return Err(invalid(layer, "duplicate layer name".into()));
            }

            if layer.weight_names.len() != layer.weight_shapes.len() {
                return Err(invalid(
                    layer,
                    format!(
                        "{} weight names but {} weight shapes",
                        layer.weight_names.len(),
                        layer.weight_shapes.len()
                    ),
                ));
            }

            if has_zero_dim(&layer.output_shape) {
                return Err(invalid(layer, "output shape has a zero-sized dimension".into()));
            }
            if let Some((name, _)) = layer.weights().find(|(_, s)| has_zero_dim(s)) {
                return Err(invalid(layer, format!("weight '{name}' has a zero-sized dimension")));
            }
        }

        Ok(ModelGraph {
            name: self.name,
            layers: self.layers,
            _state: std::marker::PhantomData,
        })
    }
}

fn invalid(layer: &LayerDef, detail: String) -> ModelError {
    ModelError::InvalidLayer {
        layer: layer.name.clone(),
        detail,
    }
}

fn has_zero_dim(shape: &tensor_meta::TensorShape) -> bool {
    shape.dims().is_some_and(|d| d.contains(&0))
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Returns the total number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total scalar parameters.
    pub fn total_params(&self) -> u64 {
        self.layers.iter().map(LayerDef::num_params).sum()
    }

    pub fn trainable_params(&self) -> u64 {
        self.layers.iter().map(LayerDef::trainable_params).sum()
    }

    pub fn non_trainable_params(&self) -> u64 {
        self.layers.iter().map(LayerDef::non_trainable_params).sum()
    }

    /// Returns the total memory for all weights in bytes.
    pub fn total_weight_bytes(&self) -> u64 {
        self.layers.iter().map(LayerDef::weight_bytes).sum()
    }

    /// Returns an iterator over the layers in execution order.
    pub fn iter_layers(&self) -> impl Iterator<Item = &LayerDef> {
        self.layers.iter()
    }

    /// Returns a reference to a layer by index.
    pub fn layer(&self, index: usize) -> Option<&LayerDef> {
        self.layers.get(index)
    }

    /// Looks a layer up by name.
    pub fn layer_by_name(&self, name: &str) -> Option<&LayerDef> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// The model input. Validation guarantees it exists.
    pub fn input_layer(&self) -> &LayerDef {
        &self.layers[0]
    }

    /// The model output: the last layer in execution order.
    pub fn output_layer(&self) -> &LayerDef {
        &self.layers[self.layers.len() - 1]
    }

    /// Iterates over every `(name, shape)` weight in execution order.
    pub fn iter_weights(&self) -> impl Iterator<Item = (&str, &tensor_meta::TensorShape)> {
        self.layers.iter().flat_map(LayerDef::weights)
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        let total_weight_mb = self.total_weight_bytes() as f64 / (1024.0 * 1024.0);
        format!(
            "Model '{}': {} layers, {} params, {:.1} MB weights",
            self.name,
            self.num_layers(),
            group_thousands(self.total_params()),
            total_weight_mb,
        )
    }

    /// Renders a Keras-style layer table.
    pub fn render_summary(&self) -> String {
        const RULE_WIDTH: usize = 98;
        let rule = "_".repeat(RULE_WIDTH);
        let double = "=".repeat(RULE_WIDTH);

        let mut out = String::new();
        let _ = writeln!(out, "Model: \"{}\"", self.name);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            " {:<38} {:<22} {:<11} {}",
            "Layer (type)", "Output Shape", "Param #", "Connected to"
        );
        let _ = writeln!(out, "{double}");
        for (i, layer) in self.layers.iter().enumerate() {
            let label = format!("{} ({})", layer.name, layer.layer_type);
            let connected = if layer.inbound.is_empty() {
                "[]".to_string()
            } else {
                format!("[{}]", layer.inbound.join(", "))
            };
            let _ = writeln!(
                out,
                " {:<38} {:<22} {:<11} {}",
                label,
                keras_shape(&layer.output_shape),
                layer.num_params(),
                connected
            );
            if i + 1 < self.layers.len() {
                let _ = writeln!(out);
            }
        }
        let _ = writeln!(out, "{double}");
        let _ = writeln!(out, "Total params: {}", group_thousands(self.total_params()));
        let _ = writeln!(out, "Trainable params: {}", group_thousands(self.trainable_params()));
        let _ = writeln!(
            out,
            "Non-trainable params: {}",
            group_thousands(self.non_trainable_params())
        );
        let _ = writeln!(out, "{rule}");
        out
    }
}

/// Formats a shape the way Keras prints it: `(None, 224, 224, 3)`.
fn keras_shape(shape: &tensor_meta::TensorShape) -> String {
    let Some(dims) = shape.dims() else {
        return "?".to_string();
    };
    let parts: Vec<String> = dims
        .iter()
        .map(|&d| if d < 0 { "None".to_string() } else { d.to_string() })
        .collect();
    format!("({})", parts.join(", "))
}

/// `5330571` → `"5,330,571"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModelGraph '{}' ({} layers):", self.name, self.layers.len())?;
        for layer in &self.layers {
            writeln!(f, "  {}", layer.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_meta::{DataType, TensorShape};

    fn layer(index: usize, name: &str, layer_type: LayerType, inbound: &[&str]) -> LayerDef {
        LayerDef {
            name: name.into(),
            layer_type,
            index,
            inbound: inbound.iter().map(|s| s.to_string()).collect(),
            weight_names: vec![],
            weight_shapes: vec![],
            dtype: DataType::Float32,
            output_shape: TensorShape::batched(&[4]),
        }
    }

    /// input → dense → dense_1 → add(dense, dense_1)
    fn make_layers() -> Vec<LayerDef> {
        let mut dense = layer(1, "dense", LayerType::Dense, &["input"]);
        dense.weight_names = vec!["dense/kernel".into(), "dense/bias".into()];
        dense.weight_shapes = vec![TensorShape::matrix(4, 4), TensorShape::vector(4)];
        vec![
            layer(0, "input", LayerType::InputLayer, &[]),
            dense,
            layer(2, "dense_1", LayerType::Dense, &["dense"]),
            layer(3, "add", LayerType::Add, &["dense", "dense_1"]),
        ]
    }

    #[test]
    fn test_validate_ok() {
        let validated = ModelGraph::new("test".into(), make_layers()).validate().unwrap();
        assert_eq!(validated.num_layers(), 4);
        assert_eq!(validated.total_params(), 20);
        assert_eq!(validated.input_layer().name, "input");
        assert_eq!(validated.output_layer().name, "add");
    }

    #[test]
    fn test_validate_empty() {
        let graph = ModelGraph::new("empty".into(), vec![]);
        assert!(matches!(graph.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_validate_bad_index() {
        let mut layers = make_layers();
        layers[1].index = 5;
        assert!(ModelGraph::new("bad".into(), layers).validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_name() {
        let mut layers = make_layers();
        layers[2].name = "dense".into();
        layers[3].inbound = vec!["dense".into(), "input".into()];
        let err = ModelGraph::new("dup".into(), layers).validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_forward_reference() {
        let mut layers = make_layers();
        layers[1].inbound = vec!["dense_1".into()];
        assert!(ModelGraph::new("fwd".into(), layers).validate().is_err());
    }

    #[test]
    fn test_validate_merge_arity() {
        let mut layers = make_layers();
        layers[3].inbound = vec!["dense_1".into()];
        assert!(ModelGraph::new("add".into(), layers).validate().is_err());
    }

    #[test]
    fn test_validate_unparallel_weights() {
        let mut layers = make_layers();
        layers[1].weight_shapes.pop();
        assert!(ModelGraph::new("w".into(), layers).validate().is_err());
    }

    #[test]
    fn test_validate_zero_shape() {
        let mut layers = make_layers();
        layers[2].output_shape = TensorShape::new(vec![-1, 0]);
        assert!(ModelGraph::new("zero".into(), layers).validate().is_err());
    }

    #[test]
    fn test_render_summary() {
        let validated = ModelGraph::new("tiny".into(), make_layers()).validate().unwrap();
        let table = validated.render_summary();
        assert!(table.starts_with("Model: \"tiny\""));
        assert!(table.contains("dense (Dense)"));
        assert!(table.contains("(None, 4)"));
        assert!(table.contains("[dense, dense_1]"));
        assert!(table.contains("Total params: 20"));
        assert!(table.contains("Non-trainable params: 0"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(5_330_571), "5,330,571");
    }

    #[test]
    fn test_display() {
        let display = format!("{}", ModelGraph::new("test".into(), make_layers()));
        assert!(display.contains("dense_1"));
    }
}
