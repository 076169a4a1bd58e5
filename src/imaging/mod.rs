//! Image conversion in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Convert** | decode → `resize_exact` → encode, all in memory |
//! | **Aspect math** | [`height_for_width`] / [`width_for_height`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a conversion
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use calculations::{height_for_width, width_for_height};
pub use params::{ConvertParams, Filter, Quality};
pub use rust_backend::RustBackend;
