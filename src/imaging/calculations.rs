//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Height that keeps `natural`'s aspect ratio at the given width.
///
/// Rounded to the nearest pixel and never below 1.
///
/// # Examples
/// ```
/// # use recast::imaging::{Dimensions, height_for_width};
/// let natural = Dimensions { width: 200, height: 50 };
/// assert_eq!(height_for_width(natural, 100), 25);
/// ```
pub fn height_for_width(natural: Dimensions, width: u32) -> u32 {
    if natural.width == 0 {
        return natural.height.max(1);
    }
    let h = (width as f64 * natural.height as f64 / natural.width as f64).round() as u32;
    h.max(1)
}

/// Width that keeps `natural`'s aspect ratio at the given height.
pub fn width_for_height(natural: Dimensions, height: u32) -> u32 {
    if natural.height == 0 {
        return natural.width.max(1);
    }
    let w = (height as f64 * natural.width as f64 / natural.height as f64).round() as u32;
    w.max(1)
}
