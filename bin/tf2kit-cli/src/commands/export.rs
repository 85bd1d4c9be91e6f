// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tf2kit export` command: build an EfficientNet classifier, print its
//! layer table and write the model directory.

use std::path::PathBuf;

use anyhow::Context;

use crate::config::ExportSection;

pub fn execute(
    mut section: ExportSection,
    variant: Option<String>,
    classes: Option<u32>,
    output: Option<PathBuf>,
    weights: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(v) = variant {
        section.variant = v;
    }
    if let Some(c) = classes {
        anyhow::ensure!(c > 0, "--classes must be at least 1");
        section.classes = c;
    }
    if let Some(o) = output {
        section.output = o;
    }
    if weights.is_some() {
        section.weights = weights;
    }
    let variant = section.parse_variant()?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               tf2kit · Model Exporter               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut exporter = model_zoo::ModelExporter::efficientnet(variant, section.classes)
        .with_context(|| format!("failed to build {}", variant.model_name()))?;
    if let Some(w) = &section.weights {
        exporter = exporter.with_weights(w.clone());
    }

    println!("{}", exporter.graph().render_summary());

    let summary = exporter
        .export(&section.output)
        .with_context(|| format!("failed to export to '{}'", section.output.display()))?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Exported:     {}", summary.model_dir.display());
    println!("  SavedModel:   {}", summary.saved_model.display());
    println!("  Manifest:     {}", summary.manifest.display());
    match &summary.weights {
        Some(w) => println!("  Weights:      {}", w.display()),
        None => println!("  Weights:      none (architecture only)"),
    }
    println!(
        "  Parameters:   {}",
        model_zoo::graph::group_thousands(summary.total_params)
    );
    println!();
    Ok(())
}
