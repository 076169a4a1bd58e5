//! Shared test utilities for the recast test suite.
//!
//! Provides synthetic image bytes, mock-backed registry builders, an in-memory
//! [`FileSink`], and a zip reader for asserting on archive contents.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! // Two records with ids "0" and "1", named 0.png and 1.png
//! let registry = registry_with(&["100x100", "200x50"]);
//!
//! let sink = MemorySink::default();
//! // ... export into sink ...
//! let entries = zip_entries(&sink.files()[0].1);
//! ```

use crate::imaging::backend::tests::MockBackend;
use crate::registry::{Registry, SourceImage};
use crate::sink::{FileSink, SinkError};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Mutex;

// =========================================================================
// Synthetic images
// =========================================================================

/// A gradient PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// A PNG with a varying alpha channel.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, 64, (y % 256) as u8, ((x * 7) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

// =========================================================================
// Mock-backed registries
// =========================================================================

/// A PNG-declared source whose bytes are a mock size string like `"100x100"`.
pub fn mock_source(name: &str, content: &str) -> SourceImage {
    SourceImage::new(name, "image/png", content.as_bytes().to_vec())
}

/// Registry with one record per mock size, named `0.png`, `1.png`, ...
pub fn registry_with(sizes: &[&str]) -> Registry {
    let backend = MockBackend::new();
    let mut registry = Registry::new();
    let files = sizes
        .iter()
        .enumerate()
        .map(|(i, size)| mock_source(&format!("{i}.png"), size))
        .collect();
    let outcome = registry.add(&backend, files);
    assert!(
        outcome.rejected.is_empty(),
        "mock sizes rejected: {:?}",
        outcome.rejected
    );
    registry
}

// =========================================================================
// Sinks and archives
// =========================================================================

/// Collects saved files in memory, in save order.
#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl FileSink for MemorySink {
    fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
        self.saved
            .lock()
            .unwrap()
            .push((name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(name))
    }
}

/// File entries of a zip archive as `(name, contents)`, skipping directories.
pub fn zip_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        if file.is_dir() {
            continue;
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        entries.push((file.name().to_string(), contents));
    }
    entries
}
