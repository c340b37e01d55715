// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyed digest used to derive band counts. Only the low bits of the hex
// rendering are consumed; this is not a security boundary.

use md5::{Digest, Md5};

/// Compute the MD5 digest of `data` and return it as a lowercase hex string.
pub fn digest_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}
