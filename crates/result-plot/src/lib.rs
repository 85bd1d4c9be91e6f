// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # result-plot
//!
//! Compares a model's predictions against ground truth over time.
//!
//! The ground truth is a CSV with a header row; one column holds the time
//! axis and a handful of columns hold the tracked values. The prediction
//! table holds the same values, row-aligned with the truth, one column per
//! tracked value. [`render_all`] writes one PNG per [`PlotGroup`].
//!
//! ```no_run
//! use result_plot::{render_all, PlotConfig};
//!
//! let written = render_all(&PlotConfig::default()).unwrap();
//! assert_eq!(written.len(), 2);
//! ```

mod error;
pub mod font;
mod plot;
mod table;

pub use error::PlotError;
pub use plot::{check_shapes, render_all, render_group, PlotConfig, PlotGroup, TAB10_COLORS};
pub use table::{read_prediction, read_truth, Matrix, TruthTable};
