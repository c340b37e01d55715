// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bandwerk — Core types, protocol constants, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod keys;
pub mod scheme;
pub mod types;

pub use config::{AppConfig, OutputFormat};
pub use error::{BandwerkError, Result};
pub use scheme::{ModulusRange, ScrambleScheme};
pub use types::*;
