// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tf2kit set-config` command: store the session configuration (and
//! optional consumer settings) in an existing `inpfile.json`.

use std::path::PathBuf;

use anyhow::Context;

use crate::config::SessionSection;

#[derive(Debug, Default, clap::Args)]
pub struct SetConfigArgs {
    /// Descriptor to update; it must already exist.
    #[arg(short, long)]
    pub inpfile: Option<PathBuf>,

    /// Let the GPU allocator grow on demand.
    #[arg(long)]
    pub growth: Option<bool>,

    /// Intra- and inter-op thread count (0 lets TensorFlow decide).
    #[arg(long)]
    pub threads: Option<i32>,

    /// Fraction of GPU memory each process may take.
    #[arg(long)]
    pub memory_fraction: Option<f64>,

    /// Comma-separated visible GPU ids, e.g. "0,1".
    #[arg(long)]
    pub devices: Option<String>,

    /// Whether the consumer feeds inputs row-major.
    #[arg(long)]
    pub rowmajor: Option<bool>,

    /// Points per inference call on the consumer side.
    #[arg(long)]
    pub batch_size: Option<i32>,

    /// Environment variable for the consumer, as KEY=VALUE (repeatable).
    #[arg(long = "env", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

impl SetConfigArgs {
    /// Overlays the flags on the `[session]` section.
    pub fn apply(self, section: &mut SessionSection) {
        if let Some(p) = self.inpfile {
            section.inpfile = p;
        }
        if let Some(g) = self.growth {
            section.allow_growth = g;
        }
        if let Some(t) = self.threads {
            section.num_threads = t;
        }
        if let Some(f) = self.memory_fraction {
            section.memory_fraction = f;
        }
        if let Some(d) = self.devices {
            section.visible_device_list = d;
        }
        if self.rowmajor.is_some() {
            section.rowmajor = self.rowmajor;
        }
        if self.batch_size.is_some() {
            section.batch_size = self.batch_size;
        }
        section.env.extend(self.env);
    }
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

pub fn execute(mut section: SessionSection, args: SetConfigArgs) -> anyhow::Result<()> {
    args.apply(&mut section);
    anyhow::ensure!(
        section.num_threads >= 0,
        "thread count must not be negative, got {}",
        section.num_threads
    );

    let options = section.session_options();
    let tokens = descriptor::set_session_config(&section.inpfile, &options).with_context(|| {
        format!("failed to set session config in '{}'", section.inpfile.display())
    })?;

    let keys = section.runtime_keys();
    descriptor::set_runtime_keys(&section.inpfile, &keys).with_context(|| {
        format!("failed to set runtime keys in '{}'", section.inpfile.display())
    })?;

    println!("{}", tokens.join(","));
    tracing::info!(
        "stored {} config bytes in {}",
        tokens.len(),
        section.inpfile.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_pair() {
        assert_eq!(
            parse_env_pair("TF_CPP_MIN_LOG_LEVEL=2").unwrap(),
            ("TF_CPP_MIN_LOG_LEVEL".to_string(), "2".to_string())
        );
        assert_eq!(parse_env_pair("A=b=c").unwrap().1, "b=c");
        assert!(parse_env_pair("novalue").is_err());
        assert!(parse_env_pair("=x").is_err());
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let mut section = SessionSection::default();
        SetConfigArgs {
            threads: Some(4),
            devices: Some("0,1".into()),
            env: vec![("K".into(), "V".into())],
            ..Default::default()
        }
        .apply(&mut section);

        assert_eq!(section.num_threads, 4);
        assert_eq!(section.visible_device_list, "0,1");
        assert!(section.allow_growth);
        assert_eq!(section.memory_fraction, 0.3);
        assert_eq!(section.env["K"], "V");
        assert!(section.rowmajor.is_none());
    }

    #[test]
    fn test_execute_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        let inpfile = dir.path().join("inpfile.json");
        std::fs::write(&inpfile, r#"{"inputs_id": ["x:0"]}"#).unwrap();

        let args = SetConfigArgs {
            inpfile: Some(inpfile.clone()),
            batch_size: Some(16),
            ..Default::default()
        };
        execute(SessionSection::default(), args).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&inpfile).unwrap()).unwrap();
        assert_eq!(value["inputs_id"][0], "x:0");
        assert_eq!(value["batch_size"], 16);
        assert_eq!(value["config"].as_array().unwrap().len(), 20);
    }

    #[test]
    fn test_execute_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = SetConfigArgs {
            inpfile: Some(dir.path().join("inpfile.json")),
            ..Default::default()
        };
        assert!(execute(SessionSection::default(), args).is_err());
        assert!(!dir.path().join("inpfile.json").exists());
    }
}
