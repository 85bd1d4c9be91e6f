// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tf2kit generate` command: write `inpfile.json` for a model.

use std::path::PathBuf;

use anyhow::Context;
use saved_model::SignatureOptions;

pub fn execute((model, options): (PathBuf, SignatureOptions)) -> anyhow::Result<()> {
    let path = descriptor::generate(&model, &options).with_context(|| {
        format!("failed to generate descriptor for '{}'", model.display())
    })?;
    println!("{}", path.display());
    Ok(())
}
