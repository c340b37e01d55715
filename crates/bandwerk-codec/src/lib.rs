// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bandwerk-codec — Reconstruction of images that were cut into horizontal
// bands and pasted back in reverse order.
//
// Provides segment-count resolution from a scramble key, the band transform
// over raw row-major buffers, a bridge to decoded `image` buffers, and a
// parallel batch restorer that isolates per-image failures.

pub mod batch;
pub mod digest;
pub mod raster;
pub mod reassemble;
pub mod segment;

// Re-export the primary entry points so callers can use `bandwerk_codec::resolve` etc.
pub use batch::{
    BatchJob, BatchOptions, BatchOutcome, BatchStatus, BatchSummary, plan_directory, restore_batch,
};
pub use digest::digest_hex;
pub use raster::convert::{from_raster, to_raster};
pub use raster::processor::{Descrambler, restore_image, restore_image_from_file};
pub use reassemble::{BandMove, band_layout, reassemble, scramble};
pub use segment::{resolve, resolve_with, segment_plan};
