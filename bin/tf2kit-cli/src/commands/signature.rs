// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tf2kit signature` command: print a model's serving signature.

use std::path::PathBuf;

use anyhow::Context;
use saved_model::{SignatureOptions, SIGNATURE_DUMP_FILENAME};

pub fn execute((model, mut options): (PathBuf, SignatureOptions), dump: bool) -> anyhow::Result<()> {
    options.dump |= dump;
    let signature = saved_model::extract_signature(&model, &options).with_context(|| {
        format!("failed to read signature from '{}'", model.display())
    })?;

    println!("{}", signature.to_json_pretty()?);
    if options.dump {
        eprintln!("wrote {}", model.join(SIGNATURE_DUMP_FILENAME).display());
    }
    Ok(())
}
