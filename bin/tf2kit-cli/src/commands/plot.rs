// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tf2kit plot` command: render prediction-vs-truth charts.

use std::path::PathBuf;

use anyhow::Context;
use result_plot::PlotConfig;

pub fn execute(
    mut config: PlotConfig,
    truth: Option<PathBuf>,
    pred: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    font: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(t) = truth {
        config.truth_file = t;
    }
    if let Some(p) = pred {
        config.prediction_file = p;
    }
    if let Some(o) = output_dir {
        config.output_dir = o;
    }
    if font.is_some() {
        config.font_path = font;
    }

    let written = result_plot::render_all(&config).with_context(|| {
        format!(
            "failed to plot '{}' against '{}'",
            config.prediction_file.display(),
            config.truth_file.display()
        )
    })?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}
