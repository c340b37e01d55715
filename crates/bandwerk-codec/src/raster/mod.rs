// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — bridge between encoded images and raw band buffers.

pub mod convert;
pub mod processor;

pub use processor::Descrambler;
