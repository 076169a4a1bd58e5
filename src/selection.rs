//! Target format and size chosen for a conversion run.
//!
//! A [`Selection`] is global: it applies to every record an export touches.
//! Its optional width/height override the per-record dimensions kept in the
//! [`Registry`](crate::registry::Registry); when neither is set each record
//! converts at its own current size.

use crate::format::TargetFormat;
use crate::imaging::{Dimensions, height_for_width, width_for_height};
use crate::registry::ImageRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub format: TargetFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Selection {
    pub fn new(format: TargetFormat) -> Self {
        Self {
            format,
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width.filter(|w| *w > 0);
        self.height = height.filter(|h| *h > 0);
        self
    }

    /// Output size for one record.
    ///
    /// - both global dimensions set → exactly that
    /// - one set → the other follows the natural aspect ratio when `aspect_lock`,
    ///   otherwise it comes from the record
    /// - none set → the record's current size
    ///
    /// A record dimension of 0 means "unset" and falls back to the natural size.
    pub fn resolve(&self, record: &ImageRecord, aspect_lock: bool) -> Dimensions {
        let current = Dimensions {
            width: nonzero_or(record.width, record.natural.width),
            height: nonzero_or(record.height, record.natural.height),
        };
        match (self.width, self.height) {
            (Some(width), Some(height)) => Dimensions { width, height },
            (Some(width), None) => Dimensions {
                width,
                height: if aspect_lock {
                    height_for_width(record.natural, width)
                } else {
                    current.height
                },
            },
            (None, Some(height)) => Dimensions {
                width: if aspect_lock {
                    width_for_height(record.natural, height)
                } else {
                    current.width
                },
                height,
            },
            (None, None) => current,
        }
    }
}

fn nonzero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 { fallback } else { value }
}
