// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration, persisted as pretty-printed JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scheme::ScrambleScheme;

/// Image format used when writing restored images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Reuse the input file's extension.
    #[default]
    Keep,
    Png,
    Webp,
    Jpeg,
}

impl OutputFormat {
    /// File extension for this format, or `None` for [`OutputFormat::Keep`].
    pub fn extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Keep => None,
            OutputFormat::Png => Some("png"),
            OutputFormat::Webp => Some("webp"),
            OutputFormat::Jpeg => Some("jpg"),
        }
    }
}

/// Persistent settings for restore runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Format for restored images written by batch runs.
    pub output_format: OutputFormat,
    /// JPEG quality (1-100) when `output_format` is JPEG.
    pub jpeg_quality: u8,
    /// Worker threads for batch restores. `None` uses one per core.
    pub threads: Option<usize>,
    /// Overwrite existing output files instead of skipping them.
    pub overwrite: bool,
    /// Protocol constants. Only change these if the upstream scheme moves.
    pub scheme: ScrambleScheme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Keep,
            jpeg_quality: 90,
            threads: None,
            overwrite: false,
            scheme: ScrambleScheme::default(),
        }
    }
}

impl AppConfig {
    /// Read a config file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
