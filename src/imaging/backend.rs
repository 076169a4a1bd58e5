//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and convert. Both work on in-memory bytes; nothing here
//! touches the filesystem.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the mock in this module's test section.

use super::params::ConvertParams;
use crate::format::TargetFormat;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode {format}: {message}")]
    Encode {
        format: TargetFormat,
        message: String,
    },
    #[error("Invalid target size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Bytes produced by a conversion, tagged with the format they are encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: TargetFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// Trait for image processing backends.
///
/// `Sync` is required because bulk export and registry admission fan out
/// over rayon's pool with a shared `&backend`.
pub trait ImageBackend: Sync {
    /// Natural dimensions of the encoded image in `bytes`.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, draw at the requested size, and re-encode.
    fn convert(&self, params: &ConvertParams) -> Result<EncodedImage, BackendError>;
}
