// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Readers for the ground-truth CSV and the prediction table.

use std::path::Path;

use csv::ReaderBuilder;

use crate::PlotError;

/// Dense row-major table of `f64`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
    ncols: usize,
}

impl Matrix {
    /// Builds a matrix from rows of equal width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncols) {
            return None;
        }
        Some(Self { rows, ncols })
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.rows.get(i).map(Vec::as_slice)
    }

    /// Copies column `j`, or `None` if it is out of range.
    pub fn column(&self, j: usize) -> Option<Vec<f64>> {
        (j < self.ncols).then(|| self.rows.iter().map(|r| r[j]).collect())
    }
}

/// Time axis and tracked values read from the ground-truth CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct TruthTable {
    pub time: Vec<f64>,
    /// One column per configured value column, in configuration order.
    pub values: Matrix,
}

/// Reads the ground-truth CSV: a header row, then numeric records. Picks
/// `time_column` and `value_columns` (0-based) from each record.
pub fn read_truth(
    path: &Path,
    time_column: usize,
    value_columns: &[usize],
) -> Result<TruthTable, PlotError> {
    let csv_err = |source| PlotError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let needed = value_columns.iter().copied().chain([time_column]).max().unwrap_or(0) + 1;
    let mut time = Vec::new();
    let mut rows = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let line = record.position().map_or(i + 2, |p| p.line() as usize);
        if record.len() < needed {
            return Err(PlotError::MissingColumn {
                path: path.to_path_buf(),
                line,
                expected: needed,
                found: record.len(),
            });
        }
        let field = |j: usize| parse_field(path, line, &record[j]);
        time.push(field(time_column)?);
        rows.push(
            value_columns
                .iter()
                .map(|&j| field(j))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }

    tracing::debug!("read {} truth rows from {}", time.len(), path.display());
    Ok(TruthTable {
        time,
        values: Matrix {
            rows,
            ncols: value_columns.len(),
        },
    })
}

/// Reads a whitespace- or comma-separated numeric table. Blank lines and
/// lines starting with `#` are skipped; every row must have the same width.
pub fn read_prediction(path: &Path) -> Result<Matrix, PlotError> {
    let content = std::fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
    parse_prediction(path, &content)
}

fn parse_prediction(path: &Path, content: &str) -> Result<Matrix, PlotError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .map(|f| parse_field(path, i + 1, f))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(PlotError::MissingColumn {
                    path: path.to_path_buf(),
                    line: i + 1,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        rows.push(row);
    }

    tracing::debug!("read {} prediction rows from {}", rows.len(), path.display());
    let ncols = rows.first().map_or(0, Vec::len);
    Ok(Matrix { rows, ncols })
}

fn parse_field(path: &Path, line: usize, value: &str) -> Result<f64, PlotError> {
    value.trim().parse().map_err(|_| PlotError::Parse {
        path: path.to_path_buf(),
        line,
        value: value.to_string(),
    })
}
