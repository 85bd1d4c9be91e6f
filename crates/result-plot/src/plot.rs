// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Truth vs. prediction comparison figures.
//!
//! Each [`PlotGroup`] becomes one PNG: a log-scaled time axis, a solid
//! line per channel for the truth and a dashed line with triangle markers
//! for the prediction, both in the channel's color.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::font::{ensure_font, FONT_FAMILY};
use crate::table::{read_prediction, read_truth, Matrix, TruthTable};
use crate::PlotError;

/// The `tab10` categorical palette.
pub const TAB10_COLORS: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

const DASH_SIZE: u32 = 6;
const DASH_SPACING: u32 = 4;
const MARKER_SIZE: i32 = 4;

/// One figure: a subset of value channels sharing a y axis.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlotGroup {
    /// Short name, used in log messages.
    pub key: String,
    /// Indices into the value channels (truth value columns and
    /// prediction columns alike).
    pub columns: Vec<usize>,
    /// Legend entry per column.
    pub legends: Vec<String>,
    pub y_label: String,
    /// Output file name inside the output directory.
    pub file_name: String,
}

impl PlotGroup {
    pub fn new(key: &str, columns: &[usize], legends: &[&str], y_label: &str) -> Self {
        Self {
            key: key.to_string(),
            columns: columns.to_vec(),
            legends: legends.iter().map(|l| l.to_string()).collect(),
            y_label: y_label.to_string(),
            file_name: format!("{key}.png"),
        }
    }
}

/// Inputs, outputs and styling of a plotting run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub truth_file: PathBuf,
    pub prediction_file: PathBuf,
    pub output_dir: PathBuf,
    /// 0-based column of the time axis in the truth CSV.
    pub time_column: usize,
    /// 0-based columns of the tracked values in the truth CSV.
    pub value_columns: Vec<usize>,
    pub width: u32,
    pub height: u32,
    /// Draw a prediction marker every this many points.
    pub marker_every: usize,
    /// TrueType font for labels; system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
    pub groups: Vec<PlotGroup>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            truth_file: PathBuf::from("true.csv"),
            prediction_file: PathBuf::from("../output/pred.csv"),
            output_dir: PathBuf::from("../output"),
            time_column: 4,
            value_columns: vec![5, 6, 7, 8],
            width: 800,
            height: 600,
            marker_every: 200,
            font_path: None,
            groups: vec![
                PlotGroup::new("mass", &[0, 1], &["Y_O", "Y_O2"], "Y"),
                PlotGroup::new("temp", &[2, 3], &["T_h", "T_v"], "T [K]"),
            ],
        }
    }
}

/// Verifies that `prediction` lines up with `truth` for every group.
pub fn check_shapes(
    truth: &TruthTable,
    prediction: &Matrix,
    groups: &[PlotGroup],
) -> Result<(), PlotError> {
    if truth.time.len() != prediction.nrows() {
        return Err(PlotError::ShapeMismatch(format!(
            "truth has {} rows, prediction has {}",
            truth.time.len(),
            prediction.nrows()
        )));
    }
    for group in groups {
        if group.legends.len() != group.columns.len() {
            return Err(PlotError::ShapeMismatch(format!(
                "group '{}' has {} columns but {} legends",
                group.key,
                group.columns.len(),
                group.legends.len()
            )));
        }
        if let Some(&col) = group.columns.iter().max() {
            if col >= prediction.ncols() || col >= truth.values.ncols() {
                return Err(PlotError::ShapeMismatch(format!(
                    "group '{}' uses channel {col}; truth has {} and prediction {} channel(s)",
                    group.key,
                    truth.values.ncols(),
                    prediction.ncols()
                )));
            }
        }
    }
    Ok(())
}

/// Reads both tables and writes one PNG per group. Returns the written
/// paths in group order.
pub fn render_all(config: &PlotConfig) -> Result<Vec<PathBuf>, PlotError> {
    let truth = read_truth(&config.truth_file, config.time_column, &config.value_columns)?;
    let prediction = read_prediction(&config.prediction_file)?;
    check_shapes(&truth, &prediction, &config.groups)?;

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| PlotError::io(&config.output_dir, e))?;
    let with_text = ensure_font(config.font_path.as_deref());

    let mut written = Vec::with_capacity(config.groups.len());
    for group in &config.groups {
        let path = config.output_dir.join(&group.file_name);
        render_group(&truth, &prediction, group, config, with_text, &path)?;
        tracing::info!("wrote {} plot {}", group.key, path.display());
        written.push(path);
    }
    Ok(written)
}

/// Draws a single group. `with_text` must only be set once a font is
/// registered.
pub fn render_group(
    truth: &TruthTable,
    prediction: &Matrix,
    group: &PlotGroup,
    config: &PlotConfig,
    with_text: bool,
    path: &Path,
) -> Result<(), PlotError> {
    let series = GroupSeries::collect(truth, prediction, group);
    let Some((x_range, y_range)) = series.ranges() else {
        return Err(PlotError::Empty(format!(
            "group '{}' has no rows with t > 0",
            group.key
        )));
    };

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    draw(&root, &series, group, config, with_text, x_range, y_range).map_err(|message| {
        PlotError::Render {
            path: path.to_path_buf(),
            message,
        }
    })
}

fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    series: &GroupSeries,
    group: &PlotGroup,
    config: &PlotConfig,
    with_text: bool,
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) -> Result<(), String> {
    let err = |e: &dyn std::fmt::Display| e.to_string();
    root.fill(&WHITE).map_err(|e| err(&e))?;

    let (x_area, y_area) = if with_text { (40, 60) } else { (0, 0) };
    let mut chart = ChartBuilder::on(root)
        .margin(12)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d((x_min..x_max).log_scale(), y_min..y_max)
        .map_err(|e| err(&e))?;

    if with_text {
        chart
            .configure_mesh()
            .x_desc("t [s]")
            .y_desc(group.y_label.as_str())
            .x_label_formatter(&|x| format!("{x:.0e}"))
            .label_style((FONT_FAMILY, 14))
            .axis_desc_style((FONT_FAMILY, 16))
            .draw()
            .map_err(|e| err(&e))?;
    } else {
        chart
            .plotting_area()
            .draw(&Rectangle::new([(x_min, y_min), (x_max, y_max)], BLACK.stroke_width(1)))
            .map_err(|e| err(&e))?;
    }

    let every = config.marker_every.max(1);
    for (i, channel) in series.channels.iter().enumerate() {
        let color = TAB10_COLORS[i % TAB10_COLORS.len()];

        chart
            .draw_series(LineSeries::new(channel.truth.iter().copied(), color.stroke_width(1)))
            .map_err(|e| err(&e))?;
        chart
            .draw_series(DashedLineSeries::new(
                channel.prediction.iter().copied(),
                DASH_SIZE,
                DASH_SPACING,
                color.stroke_width(1),
            ))
            .map_err(|e| err(&e))?;
        chart
            .draw_series(
                channel
                    .prediction
                    .iter()
                    .step_by(every)
                    .map(|&p| TriangleMarker::new(p, MARKER_SIZE, color.filled())),
            )
            .map_err(|e| err(&e))?;
    }

    if with_text {
        chart
            .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), BLACK))
            .map_err(|e| err(&e))?
            .label("True")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
        chart
            .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), BLACK))
            .map_err(|e| err(&e))?
            .label("Pred")
            .legend(|(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (6, 0)], BLACK)
                    + PathElement::new(vec![(12, 0), (20, 0)], BLACK)
                    + TriangleMarker::new((10, 0), MARKER_SIZE, BLACK.filled())
            });
        for (i, legend) in group.legends.iter().enumerate() {
            let color = TAB10_COLORS[i % TAB10_COLORS.len()];
            chart
                .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), color))
                .map_err(|e| err(&e))?
                .label(legend.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        chart
            .configure_series_labels()
            .label_font((FONT_FAMILY, 14))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| err(&e))?;
    }

    root.present().map_err(|e| err(&e))
}

struct ChannelSeries {
    truth: Vec<(f64, f64)>,
    prediction: Vec<(f64, f64)>,
}

/// Points of one group, restricted to rows with `t > 0` (log axis).
struct GroupSeries {
    channels: Vec<ChannelSeries>,
}

impl GroupSeries {
    fn collect(truth: &TruthTable, prediction: &Matrix, group: &PlotGroup) -> Self {
        let rows: Vec<usize> = (0..truth.time.len())
            .filter(|&r| truth.time[r] > 0.0 && truth.time[r].is_finite())
            .collect();
        let channels = group
            .columns
            .iter()
            .map(|&c| {
                let points = |m: &Matrix| -> Vec<(f64, f64)> {
                    rows.iter()
                        .filter_map(|&r| {
                            let y = m.row(r).and_then(|row| row.get(c))?;
                            Some((truth.time[r], *y))
                        })
                        .filter(|(_, y)| y.is_finite())
                        .collect()
                };
                ChannelSeries {
                    truth: points(&truth.values),
                    prediction: points(prediction),
                }
            })
            .collect();
        Self { channels }
    }

    /// Data extents with a 5% vertical margin, or `None` if empty.
    fn ranges(&self) -> Option<((f64, f64), (f64, f64))> {
        let points = || {
            self.channels
                .iter()
                .flat_map(|c| c.truth.iter().chain(&c.prediction))
        };
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points() {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !x_min.is_finite() {
            return None;
        }
        if x_max <= x_min {
            x_max = x_min * 10.0;
        }
        let pad = if y_max > y_min {
            (y_max - y_min) * 0.05
        } else {
            y_min.abs().max(1.0) * 0.05
        };
        Some(((x_min, x_max), (y_min - pad, y_max + pad)))
    }
}
