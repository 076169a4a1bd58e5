//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`export`](crate::export) orchestrator (which decides
//! what to convert and at which size) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing orchestration logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 80). Clamped on construction.
//! - [`Filter`]: Scaling filter used when the target size differs from the source.
//! - [`ConvertParams`]: Full specification for a conversion: source bytes, target format, size, quality, filter.

use crate::format::TargetFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Scaling filter applied when drawing the source onto the target surface.
///
/// `Triangle` (bilinear) is the default: plain scaling, no sharpening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl Filter {
    pub(crate) fn filter_type(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parameters for a single conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: Arc<[u8]>,
    pub format: TargetFormat,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub filter: Filter,
}
