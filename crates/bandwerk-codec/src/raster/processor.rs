// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Descrambler — decode an image, undo its band scrambling, and re-encode it.
// Decoding and encoding are delegated to the `image` crate; the band
// transform itself runs on raw rows in `crate::reassemble`.

use std::path::Path;

use bandwerk_core::error::{BandwerkError, Result};
use bandwerk_core::scheme::ScrambleScheme;
use bandwerk_core::types::{ScrambleKey, SegmentPlan};
use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::{debug, info, instrument};

use crate::raster::convert::{from_raster, to_raster};
use crate::reassemble::reassemble;
use crate::segment::segment_plan;

/// Single-image restore pipeline.
///
/// Each step consumes `self` and returns a new `Descrambler`, so calls chain:
///
/// ```ignore
/// let png = Descrambler::from_bytes(&data)?
///     .restore(&ScrambleKey::new(1223474, "00001"))?
///     .to_png_bytes()?;
/// ```
#[derive(Debug)]
pub struct Descrambler {
    /// The current working image.
    image: DynamicImage,
    /// Format the image was decoded from, when known.
    source_format: Option<ImageFormat>,
}

impl Descrambler {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// The decoder is picked from the file contents, falling back to the
    /// extension only when the signature is unknown, so mislabelled downloads
    /// still decode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| open_error(path, err))?;
        let source_format = reader.format();
        let img = reader.decode().map_err(|err| open_error(path, err))?;
        debug!(
            width = img.width(),
            height = img.height(),
            format = ?source_format,
            "Image loaded"
        );
        Ok(Self {
            image: img,
            source_format,
        })
    }

    /// Create a descrambler from raw encoded bytes (WebP, JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| BandwerkError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self {
            image: img,
            source_format: image::guess_format(data).ok(),
        })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image,
            source_format: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the descrambler and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Restoration ----------------------------------------------------------

    /// Restore the image using the observed upstream scheme.
    pub fn restore(self, key: &ScrambleKey) -> Result<Self> {
        self.restore_with(key, &ScrambleScheme::default())
    }

    /// Restore the image using an explicit scheme.
    #[instrument(skip_all, fields(key = %key))]
    pub fn restore_with(self, key: &ScrambleKey, scheme: &ScrambleScheme) -> Result<Self> {
        let plan = segment_plan(key, scheme);
        self.apply_plan(plan)
    }

    /// Reassemble according to a precomputed plan. An unscrambled plan leaves
    /// the image untouched.
    pub fn apply_plan(self, plan: SegmentPlan) -> Result<Self> {
        if !plan.is_scrambled() {
            debug!("Plan is pass-through, image left as decoded");
            return Ok(self);
        }

        info!(
            band_count = plan.band_count(),
            width = self.image.width(),
            height = self.image.height(),
            "Reassembling bands"
        );
        let raster = to_raster(self.image)?;
        let restored = reassemble(&raster, plan.band_count())?;
        Ok(Self {
            image: from_raster(restored)?,
            source_format: self.source_format,
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes(ImageFormat::Png, 100)
    }

    /// Encode the current image in `format`. `jpeg_quality` (1-100) is only
    /// used for JPEG.
    ///
    /// JPEG has no alpha channel and the WebP encoder only takes 8-bit
    /// samples, so those two formats go through an 8-bit conversion first.
    pub fn to_bytes(&self, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let rgb = self.image.to_rgb8();
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buffer,
                    jpeg_quality.clamp(1, 100),
                );
                rgb.write_with_encoder(encoder).map_err(|err| {
                    BandwerkError::Encode(format!("JPEG encoding failed: {}", err))
                })?;
            }
            ImageFormat::WebP => {
                let rgba = DynamicImage::ImageRgba8(self.image.to_rgba8());
                write_format(&rgba, ImageFormat::WebP, &mut buffer)?;
            }
            other => write_format(&self.image, other, &mut buffer)?,
        }
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<Path>, jpeg_quality: u8) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path).map_err(|err| {
            BandwerkError::Encode(format!("cannot pick a format for {}: {}", path.display(), err))
        })?;
        let bytes = self.to_bytes(format, jpeg_quality)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn open_error(path: &Path, err: impl std::fmt::Display) -> BandwerkError {
    BandwerkError::Decode(format!("failed to open {}: {}", path.display(), err))
}

/// Encode a `DynamicImage` into the specified format, appending to `buffer`.
fn write_format(image: &DynamicImage, format: ImageFormat, buffer: &mut Vec<u8>) -> Result<()> {
    let mut cursor = std::io::Cursor::new(buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| BandwerkError::Encode(format!("{:?} encoding failed: {}", format, err)))
}

/// Decode `scrambled` and restore it under the observed upstream scheme.
pub fn restore_image(scrambled: &[u8], key: &ScrambleKey) -> Result<DynamicImage> {
    Ok(Descrambler::from_bytes(scrambled)?.restore(key)?.into_dynamic())
}

/// Read a scrambled image from `input`, restore it, and write it to `output`
/// in the format implied by the output extension.
pub fn restore_image_from_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    key: &ScrambleKey,
) -> Result<()> {
    Descrambler::open(input)?.restore(key)?.save(output, 90)
}
