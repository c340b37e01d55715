// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion between `image::DynamicImage` and `RasterImage`.
//
// Sample types wider than one byte are flattened to native-endian bytes so the
// band transform can treat every mode as opaque rows.

use bandwerk_core::error::{BandwerkError, Result};
use bandwerk_core::types::{ColorMode, RasterImage};
use image::{DynamicImage, ImageBuffer};

/// Take ownership of a decoded image's samples as a raw raster buffer.
pub fn to_raster(image: DynamicImage) -> Result<RasterImage> {
    let (width, height) = (image.width(), image.height());
    let (mode, pixels) = match image {
        DynamicImage::ImageLuma8(buf) => (ColorMode::L8, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (ColorMode::La8, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (ColorMode::Rgb8, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (ColorMode::Rgba8, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => (ColorMode::L16, u16_to_bytes(buf.into_raw())),
        DynamicImage::ImageLumaA16(buf) => (ColorMode::La16, u16_to_bytes(buf.into_raw())),
        DynamicImage::ImageRgb16(buf) => (ColorMode::Rgb16, u16_to_bytes(buf.into_raw())),
        DynamicImage::ImageRgba16(buf) => (ColorMode::Rgba16, u16_to_bytes(buf.into_raw())),
        DynamicImage::ImageRgb32F(buf) => (ColorMode::Rgb32F, f32_to_bytes(buf.into_raw())),
        DynamicImage::ImageRgba32F(buf) => (ColorMode::Rgba32F, f32_to_bytes(buf.into_raw())),
        other => {
            return Err(BandwerkError::UnsupportedColor(format!(
                "{:?}",
                other.color()
            )));
        }
    };
    RasterImage::new(width, height, mode, pixels)
}

/// Rebuild a `DynamicImage` from a raster buffer, keeping its colour mode.
pub fn from_raster(raster: RasterImage) -> Result<DynamicImage> {
    let (width, height, mode) = (raster.width(), raster.height(), raster.color_mode());
    rebuild(width, height, mode, raster.into_pixels())
}

fn rebuild(width: u32, height: u32, mode: ColorMode, pixels: Vec<u8>) -> Result<DynamicImage> {
    let byte_len = pixels.len();
    let image = match mode {
        ColorMode::L8 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        ColorMode::La8 => {
            ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8)
        }
        ColorMode::Rgb8 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        ColorMode::Rgba8 => {
            ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
        }
        ColorMode::L16 => ImageBuffer::from_raw(width, height, bytes_to_u16(&pixels))
            .map(DynamicImage::ImageLuma16),
        ColorMode::La16 => ImageBuffer::from_raw(width, height, bytes_to_u16(&pixels))
            .map(DynamicImage::ImageLumaA16),
        ColorMode::Rgb16 => ImageBuffer::from_raw(width, height, bytes_to_u16(&pixels))
            .map(DynamicImage::ImageRgb16),
        ColorMode::Rgba16 => ImageBuffer::from_raw(width, height, bytes_to_u16(&pixels))
            .map(DynamicImage::ImageRgba16),
        ColorMode::Rgb32F => ImageBuffer::from_raw(width, height, bytes_to_f32(&pixels))
            .map(DynamicImage::ImageRgb32F),
        ColorMode::Rgba32F => ImageBuffer::from_raw(width, height, bytes_to_f32(&pixels))
            .map(DynamicImage::ImageRgba32F),
    };

    // RasterImage guarantees the length, so this only fires when the mode's
    // sample width disagrees with the buffer it was built with.
    image.ok_or_else(|| {
        BandwerkError::UnsupportedColor(format!("{mode:?} buffer of {byte_len} bytes"))
    })
}

fn u16_to_bytes(samples: Vec<u16>) -> Vec<u8> {
    samples.into_iter().flat_map(u16::to_ne_bytes).collect()
}

fn f32_to_bytes(samples: Vec<f32>) -> Vec<u8> {
    samples.into_iter().flat_map(f32::to_ne_bytes).collect()
}

fn bytes_to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

fn bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
