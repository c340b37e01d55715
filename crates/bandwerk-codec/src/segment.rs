// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segment-count resolution: album id + photo id → number of bands.
//
// The album id's decimal form and the photo id are concatenated, digested,
// and the code point of the final hex character is reduced by a
// range-dependent modulus into the scheme's band-count table.

use bandwerk_core::scheme::ScrambleScheme;
use bandwerk_core::types::{ScrambleKey, SegmentPlan};
use tracing::trace;

use crate::digest::digest_hex;

/// Band count for an image under the observed upstream scheme.
///
/// Returns `0` for albums below the scramble threshold. Total over all
/// inputs: `photo_id` is hashed as opaque bytes, never parsed.
pub fn resolve(album_id: u64, photo_id: &str) -> u32 {
    resolve_with(&ScrambleScheme::default(), album_id, photo_id)
}

/// Band count for an image under an explicit scheme.
pub fn resolve_with(scheme: &ScrambleScheme, album_id: u64, photo_id: &str) -> u32 {
    if !scheme.is_scrambled(album_id) {
        return 0;
    }

    let digest = digest_hex(format!("{album_id}{photo_id}").as_bytes());
    // A 16-byte digest always renders as 32 hex characters.
    let code = u32::from(digest.as_bytes()[digest.len() - 1]);
    let modulus = scheme.modulus_for(album_id);
    let index = code % modulus;
    let band_count = scheme.band_count_at(index as usize);

    trace!(album_id, photo_id, code, modulus, index, band_count, "segment count resolved");
    band_count
}

/// Segment plan for a key under `scheme`.
pub fn segment_plan(key: &ScrambleKey, scheme: &ScrambleScheme) -> SegmentPlan {
    SegmentPlan::new(resolve_with(scheme, key.album_id, &key.photo_id))
}
