// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Band reassembly over raw row-major buffers.
//
// Upstream cuts an image of height H into N bands top to bottom and pastes
// them back in reverse order. The H % N leftover rows stay attached to the
// bottom-most original band, which lands at the top of the scrambled image.
// Reassembly walks destination bands top to bottom and pulls each one from
// its bottom-up source offset. The layout depends only on (H, N).

use bandwerk_core::error::{BandwerkError, Result};
use bandwerk_core::types::RasterImage;
use tracing::{debug, instrument};

/// One band copy: `rows` full-width rows from `src_top` in the scrambled
/// image to `dest_top` in the restored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandMove {
    pub src_top: u32,
    pub dest_top: u32,
    pub rows: u32,
}

/// Compute the band moves that restore an image of `height` rows cut into
/// `band_count` bands.
///
/// Band 0 absorbs the `height % band_count` leftover rows; every later band
/// is shifted down by them. A band count of zero yields no moves. A band
/// count larger than `height` would produce zero-row bands and is rejected.
pub fn band_layout(height: u32, band_count: u32) -> Result<Vec<BandMove>> {
    if band_count == 0 {
        return Ok(Vec::new());
    }
    if band_count > height {
        return Err(BandwerkError::InvalidDimensions { band_count, height });
    }

    let slice = height / band_count;
    let remainder = height % band_count;

    Ok((0..band_count)
        .map(|g| {
            // Never underflows: for g = N - 1 this is H - slice * N - remainder = 0.
            let src_top = height - slice * (g + 1) - remainder;
            if g == 0 {
                BandMove {
                    src_top,
                    dest_top: 0,
                    rows: slice + remainder,
                }
            } else {
                BandMove {
                    src_top,
                    dest_top: slice * g + remainder,
                    rows: slice,
                }
            }
        })
        .collect())
}

/// Restore a scrambled image cut into `band_count` bands.
///
/// `band_count == 0` returns a byte-identical copy. The result is always a
/// fresh allocation; the source buffer is only read.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn reassemble(image: &RasterImage, band_count: u32) -> Result<RasterImage> {
    if band_count == 0 {
        debug!("image not scrambled, passing through");
        return Ok(image.clone());
    }

    let layout = band_layout(image.height(), band_count)?;
    let mut restored = image.blank_like();
    for band in &layout {
        copy_rows(image, &mut restored, band.src_top, band.dest_top, band.rows);
    }

    debug!(bands = layout.len(), "bands reassembled");
    Ok(restored)
}

/// Apply the upstream scrambling transform: the exact inverse of
/// [`reassemble`] for the same `band_count`.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn scramble(image: &RasterImage, band_count: u32) -> Result<RasterImage> {
    if band_count == 0 {
        return Ok(image.clone());
    }

    let layout = band_layout(image.height(), band_count)?;
    let mut scrambled = image.blank_like();
    for band in &layout {
        copy_rows(image, &mut scrambled, band.dest_top, band.src_top, band.rows);
    }
    Ok(scrambled)
}

/// Copy `rows` full rows between two images of identical geometry.
fn copy_rows(src: &RasterImage, dst: &mut RasterImage, src_top: u32, dest_top: u32, rows: u32) {
    let stride = src.row_stride();
    let from = src_top as usize * stride;
    let to = dest_top as usize * stride;
    let len = rows as usize * stride;
    dst.pixels_mut()[to..to + len].copy_from_slice(&src.pixels()[from..from + len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandwerk_core::types::ColorMode;
    use proptest::prelude::*;

    /// RGBA8 image whose every pixel in row `y` encodes `y` as little-endian
    /// bytes, so each row is distinct and identifies its origin.
    fn tagged_image(width: u32, height: u32) -> RasterImage {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for _ in 0..width {
                pixels.extend_from_slice(&y.to_le_bytes());
            }
        }
        RasterImage::new(width, height, ColorMode::Rgba8, pixels).unwrap()
    }

    fn row_tag(image: &RasterImage, y: u32) -> u32 {
        let row = image.row(y);
        u32::from_le_bytes([row[0], row[1], row[2], row[3]])
    }

    #[test]
    fn layout_places_remainder_in_first_band() {
        let layout = band_layout(100, 3).unwrap();
        assert_eq!(
            layout,
            vec![
                BandMove { src_top: 66, dest_top: 0, rows: 34 },
                BandMove { src_top: 33, dest_top: 34, rows: 33 },
                BandMove { src_top: 0, dest_top: 67, rows: 33 },
            ]
        );
    }

    #[test]
    fn layout_even_split() {
        let layout = band_layout(12, 4).unwrap();
        let tops: Vec<(u32, u32)> = layout.iter().map(|m| (m.src_top, m.dest_top)).collect();
        assert_eq!(tops, vec![(9, 0), (6, 3), (3, 6), (0, 9)]);
        assert!(layout.iter().all(|m| m.rows == 3));
    }

    #[test]
    fn layout_rejects_more_bands_than_rows() {
        let err = band_layout(5, 6).unwrap_err();
        assert!(matches!(
            err,
            BandwerkError::InvalidDimensions { band_count: 6, height: 5 }
        ));
    }

    #[test]
    fn layout_one_row_per_band() {
        let layout = band_layout(4, 4).unwrap();
        let srcs: Vec<u32> = layout.iter().map(|m| m.src_top).collect();
        assert_eq!(srcs, vec![3, 2, 1, 0]);
    }

    #[test]
    fn zero_bands_is_byte_identical() {
        let img = tagged_image(3, 7);
        assert_eq!(reassemble(&img, 0).unwrap(), img);
    }

    #[test]
    fn single_band_is_identity() {
        let img = tagged_image(3, 7);
        assert_eq!(reassemble(&img, 1).unwrap(), img);
    }

    #[test]
    fn reassemble_rows_for_known_geometry() {
        let img = tagged_image(2, 100);
        let out = reassemble(&img, 3).unwrap();

        assert_eq!(row_tag(&out, 0), 66);
        assert_eq!(row_tag(&out, 33), 99);
        assert_eq!(row_tag(&out, 34), 33);
        assert_eq!(row_tag(&out, 66), 65);
        assert_eq!(row_tag(&out, 67), 0);
        assert_eq!(row_tag(&out, 99), 32);
    }

    #[test]
    fn reassemble_rejects_oversized_plan() {
        let img = tagged_image(2, 3);
        assert!(matches!(
            reassemble(&img, 4),
            Err(BandwerkError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn layout_ignores_width_and_mode() {
        let narrow = RasterImage::new(1, 10, ColorMode::L8, (0..10).collect()).unwrap();
        let out = reassemble(&narrow, 4).unwrap();
        // slice 2, remainder 2: band 0 takes source rows 6..10.
        assert_eq!(out.pixels(), &[6, 7, 8, 9, 4, 5, 2, 3, 0, 1]);
    }

    proptest! {
        #[test]
        fn reassemble_is_a_row_permutation(
            width in 1u32..6,
            height in 1u32..120,
            bands in 1u32..=20,
        ) {
            prop_assume!(bands <= height);
            let img = tagged_image(width, height);
            let out = reassemble(&img, bands).unwrap();

            prop_assert_eq!(out.width(), width);
            prop_assert_eq!(out.height(), height);

            let mut tags: Vec<u32> = (0..height).map(|y| row_tag(&out, y)).collect();
            tags.sort_unstable();
            prop_assert_eq!(tags, (0..height).collect::<Vec<_>>());
        }

        #[test]
        fn reassemble_inverts_scramble(
            width in 1u32..6,
            height in 1u32..120,
            bands in 1u32..=20,
        ) {
            prop_assume!(bands <= height);
            let img = tagged_image(width, height);
            let scrambled = scramble(&img, bands).unwrap();
            prop_assert_eq!(reassemble(&scrambled, bands).unwrap(), img);
        }

        #[test]
        fn layout_covers_every_row_once(height in 1u32..500, bands in 1u32..=20) {
            prop_assume!(bands <= height);
            let layout = band_layout(height, bands).unwrap();
            let mut src = vec![0u8; height as usize];
            let mut dst = vec![0u8; height as usize];
            for m in &layout {
                for r in 0..m.rows {
                    src[(m.src_top + r) as usize] += 1;
                    dst[(m.dest_top + r) as usize] += 1;
                }
            }
            prop_assert!(src.iter().all(|&c| c == 1));
            prop_assert!(dst.iter().all(|&c| c == 1));
            prop_assert_eq!(layout[layout.len() - 1].src_top, 0);
        }
    }
}
