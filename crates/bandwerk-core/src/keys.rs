// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scramble key extraction from album page URLs, image URLs, and local file
// names. Pure string parsing: nothing here touches the network.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BandwerkError, Result};
use crate::types::ScrambleKey;

static ALBUM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/photo/(\d+)").expect("album id pattern is valid"));

static PHOTO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)\.\w+$").expect("photo id pattern is valid"));

/// Extract the album id from an album page URL such as
/// `https://example.invalid/photo/1223474`.
pub fn album_id_from_url(url: &str) -> Result<u64> {
    let digits = ALBUM_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| BandwerkError::InvalidKey(format!("no album id in {url}")))?;
    digits
        .as_str()
        .parse()
        .map_err(|err| BandwerkError::InvalidKey(format!("album id in {url}: {err}")))
}

/// Extract the photo id from an image URL such as `.../1223474/00001.webp`.
///
/// The id is returned verbatim, leading zeros included.
pub fn photo_id_from_url(url: &str) -> Result<String> {
    PHOTO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| BandwerkError::InvalidKey(format!("no photo id in {url}")))
}

/// Use the file stem of a downloaded image as its photo id.
pub fn photo_id_from_path(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            BandwerkError::InvalidKey(format!("no usable file stem in {}", path.display()))
        })?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BandwerkError::InvalidKey(format!(
            "file stem {stem:?} is not a numeric photo id"
        )));
    }
    Ok(stem.to_owned())
}

impl ScrambleKey {
    /// Build a key from the album page URL and one of its image URLs.
    pub fn from_urls(album_url: &str, image_url: &str) -> Result<Self> {
        Ok(Self::new(
            album_id_from_url(album_url)?,
            photo_id_from_url(image_url)?,
        ))
    }
}
