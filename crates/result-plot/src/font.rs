// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! TrueType font registration for the bitmap backend.
//!
//! The `ab_glyph` text backend has no built-in fonts: a family must be
//! registered from raw font bytes before any text is drawn. Registration
//! happens at most once per process.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{register_font, FontStyle};

/// Family name text styles refer to.
pub const FONT_FAMILY: &str = "sans-serif";

/// Fonts tried when no explicit path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Registers [`FONT_FAMILY`] from `preferred` or the first readable system
/// candidate. Returns whether text can be drawn.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| {
            let candidates = preferred
                .into_iter()
                .map(Path::to_path_buf)
                .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));
            for path in candidates {
                if try_register(&path) {
                    tracing::debug!("registered font {}", path.display());
                    return Some(path);
                }
            }
            tracing::warn!("no usable TrueType font found; plots are rendered without text");
            None
        })
        .is_some()
}

fn try_register(path: &Path) -> bool {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::trace!("font {} unavailable: {e}", path.display());
            return false;
        }
    };
    // The backend keeps a `'static` reference; the font lives for the rest
    // of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!("font {} is not a valid TrueType font", path.display());
            false
        }
    }
}
