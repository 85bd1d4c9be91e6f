// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Protobuf messages for the subset of `tensorflow/core/protobuf/config.proto`
//! that session options touch.
//!
//! Fields are declared in field-number order. prost encodes them in
//! declaration order and omits proto3 defaults, which yields the same bytes
//! as TensorFlow's `SerializeToString()`.

/// `tensorflow.ConfigProto` (subset).
#[derive(Clone, PartialEq, prost::Message)]
pub struct ConfigProto {
    #[prost(int32, tag = "2")]
    pub intra_op_parallelism_threads: i32,
    #[prost(int32, tag = "5")]
    pub inter_op_parallelism_threads: i32,
    #[prost(message, optional, tag = "6")]
    pub gpu_options: Option<GpuOptions>,
    #[prost(bool, tag = "7")]
    pub allow_soft_placement: bool,
    #[prost(bool, tag = "8")]
    pub log_device_placement: bool,
}

/// `tensorflow.GPUOptions` (subset).
#[derive(Clone, PartialEq, prost::Message)]
pub struct GpuOptions {
    #[prost(double, tag = "1")]
    pub per_process_gpu_memory_fraction: f64,
    #[prost(bool, tag = "4")]
    pub allow_growth: bool,
    #[prost(string, tag = "5")]
    pub visible_device_list: String,
}
