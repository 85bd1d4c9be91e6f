// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for session-option serialisation and hex transport.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use session_config::SessionOptions;

fn bench_create_serialized_options(c: &mut Criterion) {
    let opts = SessionOptions {
        visible_device_list: "0,1,2,3".into(),
        ..Default::default()
    };
    c.bench_function("create_serialized_options", |b| {
        b.iter(|| black_box(&opts).create_serialized_options())
    });
}

fn bench_from_hex_tokens(c: &mut Criterion) {
    let tokens = SessionOptions::default().create_serialized_options();
    c.bench_function("from_hex_tokens", |b| {
        b.iter(|| SessionOptions::from_hex_tokens(black_box(&tokens)).unwrap())
    });
}

criterion_group!(benches, bench_create_serialized_options, bench_from_hex_tokens);
criterion_main!(benches);
