// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-meta
//!
//! Metadata describing tensors as a saved model declares them, without
//! holding any tensor data.
//!
//! This crate provides:
//! - [`DataType`]: element types with their TensorFlow `DataType` enum codes.
//! - [`TensorShape`]: shapes whose dimensions may be unknown (`-1`) and
//!   whose rank may itself be unknown.
//!
//! Both are shared by the SavedModel reader/writer, the descriptor
//! generator and the model exporter.

mod dtype;
mod error;
mod shape;

pub use dtype::DataType;
pub use error::TensorMetaError;
pub use shape::{TensorShape, UNKNOWN_DIM};
