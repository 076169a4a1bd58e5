//! Supported raster formats.
//!
//! The set is fixed: PNG, JPEG, WebP, BMP, GIF and TIFF. Every format can be
//! both read and written, so the same enum serves as the admission whitelist
//! for incoming files and as the export target.
//!
//! | Format | MIME | Extension written | Extensions accepted |
//! |---|---|---|---|
//! | PNG | `image/png` | `png` | `png` |
//! | JPEG | `image/jpeg` | `jpg` | `jpg`, `jpeg` |
//! | WebP | `image/webp` | `webp` | `webp` |
//! | BMP | `image/bmp` | `bmp` | `bmp` |
//! | GIF | `image/gif` | `gif` | `gif` |
//! | TIFF | `image/tiff` | `tiff` | `tif`, `tiff` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    Jpeg,
    #[serde(rename = "webp")]
    WebP,
    Bmp,
    Gif,
    Tiff,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unsupported format '{0}' (expected one of: png, jpeg, webp, bmp, gif, tiff)")]
pub struct UnknownFormat(pub String);

impl TargetFormat {
    pub const ALL: [TargetFormat; 6] = [
        TargetFormat::Png,
        TargetFormat::Jpeg,
        TargetFormat::WebP,
        TargetFormat::Bmp,
        TargetFormat::Gif,
        TargetFormat::Tiff,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::WebP => "image/webp",
            TargetFormat::Bmp => "image/bmp",
            TargetFormat::Gif => "image/gif",
            TargetFormat::Tiff => "image/tiff",
        }
    }

    /// Extension used for written files.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpg",
            TargetFormat::WebP => "webp",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Gif => "gif",
            TargetFormat::Tiff => "tiff",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::WebP => "webp",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Gif => "gif",
            TargetFormat::Tiff => "tiff",
        }
    }

    /// Whether the encoder honours a lossy quality setting.
    pub fn is_lossy(self) -> bool {
        matches!(self, TargetFormat::Jpeg)
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(TargetFormat::Png),
            "image/jpeg" | "image/jpg" => Some(TargetFormat::Jpeg),
            "image/webp" => Some(TargetFormat::WebP),
            "image/bmp" => Some(TargetFormat::Bmp),
            "image/gif" => Some(TargetFormat::Gif),
            "image/tiff" => Some(TargetFormat::Tiff),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(TargetFormat::Png),
            "jpg" | "jpeg" => Some(TargetFormat::Jpeg),
            "webp" => Some(TargetFormat::WebP),
            "bmp" => Some(TargetFormat::Bmp),
            "gif" => Some(TargetFormat::Gif),
            "tif" | "tiff" => Some(TargetFormat::Tiff),
            _ => None,
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            TargetFormat::Png => image::ImageFormat::Png,
            TargetFormat::Jpeg => image::ImageFormat::Jpeg,
            TargetFormat::WebP => image::ImageFormat::WebP,
            TargetFormat::Bmp => image::ImageFormat::Bmp,
            TargetFormat::Gif => image::ImageFormat::Gif,
            TargetFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// MIME type a file declares through its extension.
///
/// Unknown extensions fall back to `application/octet-stream` so the caller
/// still has something to show in a rejection notice.
pub fn declared_mime(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(TargetFormat::from_extension)
        .map(|f| f.mime().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

pub fn is_supported_mime(mime: &str) -> bool {
    TargetFormat::from_mime(mime).is_some()
}
