//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (PNG, JPEG, WebP, BMP, GIF, TIFF) | `image::load_from_memory` |
//! | Resize | `image::DynamicImage::resize_exact` with the configured filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → others | `image::DynamicImage::write_to` (WebP is lossless) |

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use super::params::ConvertParams;
use crate::format::TargetFormat;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Largest RGBA surface a conversion may allocate, matching the `image`
/// crate's default `Limits::max_alloc`.
const MAX_SURFACE_BYTES: u64 = 512 * 1024 * 1024;

fn surface_fits(width: u32, height: u32) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    (width as u64 * height as u64)
        .checked_mul(4)
        .is_some_and(|bytes| bytes <= MAX_SURFACE_BYTES)
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Match the pixel layout each encoder accepts.
///
/// JPEG has no alpha channel; every other target takes RGBA8.
fn normalize(img: DynamicImage, format: TargetFormat) -> DynamicImage {
    match format {
        TargetFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => DynamicImage::ImageRgba8(img.to_rgba8()),
    }
}

fn encode(img: &DynamicImage, format: TargetFormat, quality: u32) -> Result<Vec<u8>, BackendError> {
    let encode_err = |e: image::ImageError| BackendError::Encode {
        format,
        message: e.to_string(),
    };
    let mut buffer = Cursor::new(Vec::new());
    match format {
        TargetFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality as u8);
            img.write_with_encoder(encoder).map_err(encode_err)?;
        }
        other => img
            .write_to(&mut buffer, other.image_format())
            .map_err(encode_err)?,
    }
    Ok(buffer.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn convert(&self, params: &ConvertParams) -> Result<EncodedImage, BackendError> {
        if !surface_fits(params.width, params.height) {
            return Err(BackendError::InvalidDimensions {
                width: params.width,
                height: params.height,
            });
        }
        let img = decode(&params.source)?;
        let drawn = if img.width() == params.width && img.height() == params.height {
            img
        } else {
            img.resize_exact(params.width, params.height, params.filter.filter_type())
        };
        let surface = normalize(drawn, params.format);
        let bytes = encode(&surface, params.format, params.quality.value())?;
        Ok(EncodedImage {
            format: params.format,
            width: params.width,
            height: params.height,
            bytes,
        })
    }
}
