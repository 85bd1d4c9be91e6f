// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tf2kit inspect` command: display a model's serving signature, check
//! its `inpfile.json` against it and summarise the architecture.

use std::path::{Path, PathBuf};

use anyhow::Context;
use descriptor::{DescriptorFile, INPFILE_NAME};
use saved_model::{SignatureOptions, TensorSpec};

pub fn execute((model, mut options): (PathBuf, SignatureOptions)) -> anyhow::Result<()> {
    options.dump = false;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              tf2kit · Model Inspector               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let signature = saved_model::extract_signature(&model, &options)
        .with_context(|| format!("failed to read signature from '{}'", model.display()))?;

    // ── Signature ──────────────────────────────────────────────
    println!("  Model: {}", model.display());
    println!(
        "  {:<8} {:<16} {:<36} {:>16}",
        "Section", "Key", "Tensor", "Shape"
    );
    println!("  {}", "-".repeat(80));
    for (section, specs) in signature.sections() {
        for (key, spec) in specs {
            println!(
                "  {:<8} {:<16} {:<36} {:>16}",
                section,
                truncate(key, 16),
                truncate(&spec.name, 36),
                format_shape(spec),
            );
        }
    }
    println!();

    // ── Descriptor ─────────────────────────────────────────────
    let inpfile = model.join(INPFILE_NAME);
    if inpfile.is_file() {
        report_descriptor(&inpfile, &signature)?;
    } else {
        println!("  Descriptor: none ({INPFILE_NAME} not found)");
    }
    println!();

    // ── Architecture ───────────────────────────────────────────
    if model.join(model_zoo::MANIFEST_FILE).is_file() {
        let graph = model_zoo::ExportedModelLoader::load(&model)
            .with_context(|| format!("failed to load model from '{}'", model.display()))?;
        println!("  {}", graph.summary());
        println!(
            "  Weights: {:.2} MB",
            graph.total_weight_bytes() as f64 / (1024.0 * 1024.0),
        );
    } else {
        println!("  Architecture: unknown (no {})", model_zoo::MANIFEST_FILE);
    }
    println!();
    Ok(())
}

fn report_descriptor(
    inpfile: &Path,
    signature: &saved_model::SignatureDescriptor,
) -> anyhow::Result<()> {
    let file = DescriptorFile::open(inpfile)?;
    let typed = file.typed()?;
    println!("  Descriptor: {}", inpfile.display());
    println!(
        "   inputs:  {} tensor(s), {} value(s) per point",
        typed.inputs_id.len(),
        typed.input_total_dim()
    );
    println!(
        "   outputs: {} tensor(s), {} value(s) per point",
        typed.outputs_id.len(),
        typed.output_total_dim()
    );
    match typed.session_options() {
        Some(Ok(opts)) => println!(
            "   config:  growth={} threads={} fraction={} devices='{}'",
            opts.allow_growth, opts.num_threads, opts.memory_fraction, opts.visible_device_list
        ),
        Some(Err(_)) => println!("   config:  unreadable"),
        None => println!("   config:  not set"),
    }

    let issues = descriptor::check_descriptor(&typed, signature);
    if issues.is_empty() {
        println!("   consistent with signature");
    } else {
        for issue in &issues {
            println!("   ! {issue}");
        }
    }
    Ok(())
}

fn format_shape(spec: &TensorSpec) -> String {
    format!("[{}]", spec.shape.join(", "))
}

/// Truncates a string to `max_len` with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("serving_default", 16), "serving_default");
        assert_eq!(truncate("serving_default_input_1:0", 16), "serving_defau...");
    }

    #[test]
    fn test_inspect_exported_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model");
        model_zoo::ModelExporter::efficientnet(model_zoo::EfficientNetVariant::B0, 10)
            .unwrap()
            .export(&model)
            .unwrap();
        descriptor::generate(&model, &SignatureOptions::default()).unwrap();
        execute((model, SignatureOptions::default())).unwrap();
    }
}
