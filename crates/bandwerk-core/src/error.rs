// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bandwerk.

use thiserror::Error;

/// Top-level error type for all Bandwerk operations.
///
/// Every variant is local to a single image: nothing here is transient, so
/// callers never retry. Batch callers isolate one image's error from the rest.
#[derive(Debug, Error)]
pub enum BandwerkError {
    // -- Codec errors --
    #[error("cannot cut {height} rows into {band_count} bands")]
    InvalidDimensions { band_count: u32, height: u32 },

    #[error("image must have non-zero size, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, image geometry needs {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("unsupported colour type: {0}")]
    UnsupportedColor(String),

    // -- Keys and protocol constants --
    #[error("invalid scramble key: {0}")]
    InvalidKey(String),

    #[error("invalid scramble scheme: {0}")]
    InvalidScheme(String),

    // -- Image decode / encode (delegated to the `image` crate) --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Batch execution --
    #[error("worker pool setup failed: {0}")]
    WorkerPool(String),

    #[error("output {} is already claimed by an earlier job", .0.display())]
    DuplicateOutput(std::path::PathBuf),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BandwerkError>;
