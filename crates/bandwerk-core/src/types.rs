// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: scramble keys, segment plans, and raw raster buffers.

use serde::{Deserialize, Serialize};

use crate::error::{BandwerkError, Result};

/// The two identifiers that together decide how an image was sliced.
///
/// `photo_id` is kept verbatim (leading zeros matter) because it is only ever
/// hashed, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrambleKey {
    /// Numeric identifier of the originating album.
    pub album_id: u64,
    /// Per-image token, e.g. `"00001"`.
    pub photo_id: String,
}

impl ScrambleKey {
    pub fn new(album_id: u64, photo_id: impl Into<String>) -> Self {
        Self {
            album_id,
            photo_id: photo_id.into(),
        }
    }
}

impl std::fmt::Display for ScrambleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.album_id, self.photo_id)
    }
}

/// Number of horizontal bands an image was cut into.
///
/// A band count of zero means the image was never scrambled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SegmentPlan {
    band_count: u32,
}

impl SegmentPlan {
    pub fn new(band_count: u32) -> Self {
        Self { band_count }
    }

    /// Plan for an image that needs no reconstruction.
    pub fn passthrough() -> Self {
        Self { band_count: 0 }
    }

    pub fn band_count(&self) -> u32 {
        self.band_count
    }

    pub fn is_scrambled(&self) -> bool {
        self.band_count > 0
    }
}

/// Pixel layout of a [`RasterImage`] buffer.
///
/// Only the bytes-per-pixel matters to the band transform; the mode is
/// carried so the buffer can be turned back into an encodable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    L8,
    La8,
    Rgb8,
    Rgba8,
    L16,
    La16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

impl ColorMode {
    /// Width in bytes of one pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorMode::L8 => 1,
            ColorMode::La8 => 2,
            ColorMode::Rgb8 => 3,
            ColorMode::Rgba8 => 4,
            ColorMode::L16 => 2,
            ColorMode::La16 => 4,
            ColorMode::Rgb16 => 6,
            ColorMode::Rgba16 => 8,
            ColorMode::Rgb32F => 12,
            ColorMode::Rgba32F => 16,
        }
    }
}

/// A decoded image as a row-major byte buffer.
///
/// The buffer length always equals `width * height * bytes_per_pixel`; this is
/// checked once at construction so row arithmetic never has to re-validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    color_mode: ColorMode,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an owned pixel buffer, checking it against the declared geometry.
    pub fn new(width: u32, height: u32, color_mode: ColorMode, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BandwerkError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize * color_mode.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(BandwerkError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            color_mode,
            pixels,
        })
    }

    /// Allocate a zero-filled image with the same geometry and mode as `self`.
    pub fn blank_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            color_mode: self.color_mode,
            pixels: vec![0; self.pixels.len()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Number of bytes in one full-width row.
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.color_mode.bytes_per_pixel()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Borrow row `y`. Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.row_stride())
    }
}
